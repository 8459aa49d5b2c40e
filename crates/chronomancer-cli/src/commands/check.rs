use anyhow::Result;
use owo_colors::OwoColorize;

use crate::cli::CheckCommand;
use crate::config::Config;
use crate::parser::parse_date;
use crate::store::SequenceFile;

pub fn check_date(store: &SequenceFile, command: CheckCommand, config: &Config) -> Result<()> {
    let sequence = store.load()?;
    let date = parse_date(&command.date)?;
    let format = config.preview.date_format.as_str();

    if sequence.contains(date) {
        println!("{} {} is an occurrence", "✓".green(), date.format(format));
    } else {
        println!("{} {} is not an occurrence", "✗".red(), date.format(format));
    }

    match sequence.next_after(date) {
        Some(next) => println!("Next occurrence: {}", next.format(format).cyan()),
        None => println!("{}", "No further occurrences".dimmed()),
    }

    Ok(())
}
