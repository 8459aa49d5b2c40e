use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::Config;
use crate::store::SequenceFile;
use crate::views::table::{display_pauses, display_recurrences, SegmentKind, ViewPause, ViewRecurrence};

pub fn sequence_info(store: &SequenceFile, config: &Config) -> Result<()> {
    let sequence = store.load()?;
    let format = config.preview.date_format.as_str();

    println!("{}", "Timeline".blue().bold());
    let segments: Vec<ViewRecurrence> = sequence
        .historical()
        .iter()
        .map(|recurrence| ViewRecurrence::from_recurrence(recurrence, SegmentKind::Historical))
        .chain(std::iter::once(ViewRecurrence::from_recurrence(
            sequence.active(),
            SegmentKind::Active,
        )))
        .collect();
    display_recurrences(&segments, format);

    match sequence.total_occurrences() {
        Some(total) => println!(
            "Total occurrences: {} ({} before the active recurrence)",
            total.yellow(),
            sequence.current_active_occurrence_index()
        ),
        None => println!("Total occurrences: {}", "unbounded".yellow()),
    }

    if !sequence.exceptions().is_empty() {
        println!();
        println!("{}", "Pauses".blue().bold());
        let pauses: Vec<ViewPause> = sequence
            .exceptions()
            .iter()
            .map(ViewPause::from_exception)
            .collect();
        display_pauses(&pauses, format);
    }

    Ok(())
}
