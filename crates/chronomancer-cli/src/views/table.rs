use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use chronomancer_core::{CalendarDuration, Exception, Recurrence};
use comfy_table::{Attribute, Cell, Color, Row, Table};

#[derive(Debug, Clone)]
pub struct ViewOccurrence {
    /// 1-based slot number within the timeline; paused slots keep theirs
    pub number: usize,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Historical,
    Active,
}

#[derive(Debug, Clone)]
pub struct ViewRecurrence {
    pub kind: SegmentKind,
    pub start: DateTime<Utc>,
    pub interval: CalendarDuration,
    pub occurrences: Option<u32>,
    pub last: Option<DateTime<Utc>>,
}

impl ViewRecurrence {
    pub fn from_recurrence(recurrence: &Recurrence, kind: SegmentKind) -> Self {
        Self {
            kind,
            start: recurrence.start(),
            interval: recurrence.interval(),
            occurrences: recurrence.occurrences(),
            last: recurrence.last_occurrence(),
        }
    }
}

/// A pause as shown by `info`: a recurrence, or a window with no interval.
#[derive(Debug, Clone)]
pub struct ViewPause {
    pub from: DateTime<Utc>,
    pub interval: Option<CalendarDuration>,
    pub occurrences: Option<u32>,
    pub until: Option<DateTime<Utc>>,
}

impl ViewPause {
    pub fn from_exception(exception: &Exception) -> Self {
        match exception {
            Exception::Recurrence(recurrence) => Self {
                from: recurrence.start(),
                interval: Some(recurrence.interval()),
                occurrences: recurrence.occurrences(),
                until: recurrence.last_occurrence(),
            },
            Exception::Window(window) => Self {
                from: window.first(),
                interval: None,
                occurrences: None,
                until: Some(window.last()),
            },
        }
    }
}

fn describe_interval(interval: CalendarDuration) -> String {
    interval
        .decompose()
        .into_iter()
        .map(|(unit, count)| format!("{} {}", count, unit))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_occurrences(occurrences: &[ViewOccurrence], date_format: &str) {
    if occurrences.is_empty() {
        println!("No occurrences found.");
        return;
    }

    let now = Utc::now();
    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Relative"]);

    for occurrence in occurrences {
        let mut row = Row::new();
        row.add_cell(Cell::new(occurrence.number));

        let date_cell = Cell::new(occurrence.at.format(date_format));
        let relative_cell = Cell::new(occurrence.at.humanize());
        if occurrence.at < now {
            row.add_cell(date_cell.fg(Color::DarkGrey));
            row.add_cell(relative_cell.fg(Color::DarkGrey));
        } else {
            row.add_cell(date_cell);
            row.add_cell(relative_cell);
        }
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_recurrences(recurrences: &[ViewRecurrence], date_format: &str) {
    if recurrences.is_empty() {
        println!("No recurrences found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Segment", "Start", "Interval", "Occurrences", "Last"]);

    for recurrence in recurrences {
        let mut row = Row::new();
        match recurrence.kind {
            SegmentKind::Active => {
                row.add_cell(
                    Cell::new("active")
                        .fg(Color::Green)
                        .add_attribute(Attribute::Bold),
                );
            }
            SegmentKind::Historical => {
                row.add_cell(Cell::new("historical").fg(Color::DarkGrey));
            }
        }

        row.add_cell(Cell::new(recurrence.start.format(date_format)));
        row.add_cell(Cell::new(describe_interval(recurrence.interval)));
        row.add_cell(Cell::new(
            recurrence
                .occurrences
                .map_or_else(|| "∞".to_string(), |count| count.to_string()),
        ));
        row.add_cell(Cell::new(recurrence.last.map_or_else(
            || "Never".to_string(),
            |last| last.format(date_format).to_string(),
        )));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_pauses(pauses: &[ViewPause], date_format: &str) {
    let mut table = Table::new();
    table.set_header(vec!["From", "Every", "Occurrences", "Until"]);

    for pause in pauses {
        let mut row = Row::new();
        row.add_cell(Cell::new(pause.from.format(date_format)));
        match pause.interval {
            Some(interval) => {
                row.add_cell(Cell::new(describe_interval(interval)));
                row.add_cell(Cell::new(
                    pause
                        .occurrences
                        .map_or_else(|| "∞".to_string(), |count| count.to_string()),
                ));
            }
            None => {
                row.add_cell(Cell::new("whole window").fg(Color::Yellow));
                row.add_cell(Cell::new("-"));
            }
        }
        row.add_cell(Cell::new(pause.until.map_or_else(
            || "Never".to_string(),
            |until| until.format(date_format).to_string(),
        )));
        table.add_row(row);
    }

    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_interval() {
        let interval = CalendarDuration::months(1) + CalendarDuration::days(2);
        assert_eq!(describe_interval(interval), "1 months 2 days");
        assert_eq!(describe_interval(CalendarDuration::weeks(2)), "2 weeks");
    }

    #[test]
    fn test_window_pause_has_no_interval() {
        use chrono::TimeZone;
        use chronomancer_core::Window;

        let first = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2025, 7, 31, 0, 0, 0).unwrap();
        let pause = ViewPause::from_exception(&Window::new(first, last).unwrap().into());

        assert_eq!(pause.from, first);
        assert!(pause.interval.is_none());
        assert_eq!(pause.until, Some(last));
    }
}
