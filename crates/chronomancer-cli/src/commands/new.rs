use anyhow::{bail, Result};
use chronomancer_core::{Recurrence, SequenceBuilder};
use owo_colors::OwoColorize;

use crate::cli::NewCommand;
use crate::commands::apply_interval;
use crate::parser::parse_date;
use crate::store::SequenceFile;

pub fn new_sequence(store: &SequenceFile, command: NewCommand) -> Result<()> {
    if store.exists() && !command.force {
        bail!(
            "'{}' already holds a sequence, pass --force to replace it",
            store.path().display()
        );
    }

    let mut builder = SequenceBuilder::from(apply_interval(Recurrence::builder(), &command.interval));
    if let Some(start) = command.start.as_deref() {
        builder = builder.starting(parse_date(start)?);
    }
    if let Some(count) = command.count {
        builder = builder.total(count);
    }
    if command.forever {
        builder = builder.forever();
    }
    if let Some(until) = command.until.as_deref() {
        builder = builder.until(parse_date(until)?);
    }

    let sequence = builder.build()?;
    store.save(&sequence)?;

    let active = sequence.active();
    println!(
        "{} Created sequence starting {} every {}",
        "✓".green(),
        active.start().to_string().cyan(),
        active.interval().to_string().yellow()
    );
    match active.occurrences() {
        Some(count) => println!("  {} occurrences", count),
        None => println!("  repeats forever"),
    }

    Ok(())
}
