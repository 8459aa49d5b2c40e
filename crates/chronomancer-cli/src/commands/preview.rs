use anyhow::Result;

use crate::cli::PreviewCommand;
use crate::config::Config;
use crate::parser::parse_optional_date;
use crate::store::SequenceFile;
use crate::views::table::{display_occurrences, ViewOccurrence};

pub fn preview_sequence(store: &SequenceFile, command: PreviewCommand, config: &Config) -> Result<()> {
    let sequence = store.load()?;
    let count = command.count.unwrap_or(config.preview.default_count);
    let after = parse_optional_date(command.after.as_deref())?;

    let occurrences: Vec<ViewOccurrence> = sequence
        .numbered_after(after)
        .take(count)
        .map(|(index, at)| ViewOccurrence {
            number: index as usize + 1,
            at,
        })
        .collect();

    display_occurrences(&occurrences, &config.preview.date_format);
    Ok(())
}
