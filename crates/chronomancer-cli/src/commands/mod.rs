use chronomancer_core::RecurrenceBuilder;

use crate::cli::{IntervalArgs, IntervalShortcut};

pub mod check;
pub mod info;
pub mod new;
pub mod pause;
pub mod preview;
pub mod reconfigure;

/// Forwards every interval option given on the command line, so the
/// builder can report conflicting ones.
pub fn apply_interval(mut builder: RecurrenceBuilder, args: &IntervalArgs) -> RecurrenceBuilder {
    if let Some(every) = args.every {
        builder = match every {
            IntervalShortcut::Daily => builder.daily(),
            IntervalShortcut::Weekly => builder.weekly(),
            IntervalShortcut::Monthly => builder.monthly(),
            IntervalShortcut::Yearly => builder.yearly(),
        };
    }
    if let Some(interval) = args.interval {
        builder = builder.every(interval);
    }
    builder
}
