use anyhow::{Context, Result};
use chronomancer_core::Reconfiguration;
use owo_colors::OwoColorize;

use crate::cli::ReconfigureCommand;
use crate::parser::parse_optional_date;
use crate::store::SequenceFile;

pub fn reconfigure_sequence(store: &SequenceFile, command: ReconfigureCommand) -> Result<()> {
    let mut sequence = store.load()?;

    let stop = parse_optional_date(command.stop.as_deref())?;
    let restart = parse_optional_date(command.restart.as_deref())?;

    let mut changes = Reconfiguration::new();
    if let Some(interval) = command.every.map(|every| every.duration()).or(command.interval) {
        changes = changes.interval(interval);
    }
    if let Some(count) = command.count {
        changes = changes.occurrences(Some(count));
    } else if command.forever {
        changes = changes.occurrences(None);
    }

    let historical_before = sequence.historical().len();
    sequence
        .reconfigure(stop, restart, changes)
        .context("Failed to reconfigure sequence")?;
    store.save(&sequence)?;

    let active = sequence.active();
    if sequence.historical().len() > historical_before {
        println!(
            "{} Split sequence, new active recurrence starts {}",
            "✓".green(),
            active.start().to_string().cyan()
        );
    } else {
        println!("{} Updated active recurrence in place", "✓".green());
    }
    println!(
        "  every {}, {}",
        active.interval().to_string().yellow(),
        match active.occurrences() {
            Some(count) => format!("{} occurrences remaining", count),
            None => "repeats forever".to_string(),
        }
    );

    Ok(())
}
