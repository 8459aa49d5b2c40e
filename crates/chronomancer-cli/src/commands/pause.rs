use anyhow::Result;
use chrono::{DateTime, Utc};
use chronomancer_core::{Recurrence, Sequence, Window};
use owo_colors::OwoColorize;

use crate::cli::PauseCommand;
use crate::commands::apply_interval;
use crate::parser::parse_date;
use crate::store::SequenceFile;

pub fn pause_sequence(store: &SequenceFile, command: PauseCommand) -> Result<()> {
    let mut sequence = store.load()?;

    match (command.from.as_deref(), command.to.as_deref()) {
        (Some(from), Some(to)) => {
            let window = Window::new(parse_date(from)?, parse_date(to)?)?;
            pause_window(&mut sequence, window)
        }
        _ => pause_recurrence(&mut sequence, &command)?,
    }

    store.save(&sequence)
}

fn pause_window(sequence: &mut Sequence, window: Window) {
    let skipped = first_from(sequence, window.first()).filter(|first| *first <= window.last());
    sequence.pause(window);

    println!(
        "{} Paused from {} to {}",
        "✓".green(),
        window.first().to_string().cyan(),
        window.last().to_string().cyan()
    );
    report_skipped(skipped);
}

fn pause_recurrence(sequence: &mut Sequence, command: &PauseCommand) -> Result<()> {
    let mut builder = apply_interval(Recurrence::builder(), &command.interval);
    if let Some(start) = command.start.as_deref() {
        builder = builder.starting(parse_date(start)?);
    }
    if let Some(count) = command.count {
        builder = builder.total(count);
    }
    if let Some(until) = command.until.as_deref() {
        builder = builder.until(parse_date(until)?);
    }
    let pause = builder.build()?;

    // only a bounded pause has a bounded search
    let skipped = pause.last_occurrence().and_then(|last| {
        let mut occurrence = first_from(sequence, pause.start());
        while let Some(at) = occurrence.filter(|at| *at <= last) {
            if pause.contains(at) {
                return Some(at);
            }
            occurrence = sequence.next_after(at);
        }
        None
    });

    sequence.pause(pause.clone());

    println!(
        "{} Paused from {} every {}",
        "✓".green(),
        pause.start().to_string().cyan(),
        pause.interval().to_string().yellow()
    );
    if pause.is_finite() {
        report_skipped(skipped);
    }
    Ok(())
}

/// First unpaused occurrence at or after `time`.
fn first_from(sequence: &Sequence, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if sequence.contains(time) {
        Some(time)
    } else {
        sequence.next_after(time)
    }
}

fn report_skipped(skipped: Option<DateTime<Utc>>) {
    match skipped {
        Some(first) => println!("  first skipped occurrence: {}", first),
        None => println!("  {}", "no occurrence falls on this pause".dimmed()),
    }
}
