use chronomancer_core::CalendarDuration;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Build, preview and reconfigure calendar-aware recurring schedules
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Sequence file to operate on
    #[arg(
        short,
        long,
        global = true,
        env = "CHRONOMANCER_FILE",
        default_value = "sequence.json"
    )]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new sequence file
    New(NewCommand),
    /// Show upcoming occurrences
    Preview(PreviewCommand),
    /// Skip occurrences that fall on a pause recurrence or inside a window
    Pause(PauseCommand),
    /// Change the interval or count, optionally from a point in time
    Reconfigure(ReconfigureCommand),
    /// Check whether a date is an occurrence
    Check(CheckCommand),
    /// Show the timeline and pauses
    Info,
}

/// Named intervals
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalShortcut {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl std::fmt::Display for IntervalShortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntervalShortcut::Daily => write!(f, "daily"),
            IntervalShortcut::Weekly => write!(f, "weekly"),
            IntervalShortcut::Monthly => write!(f, "monthly"),
            IntervalShortcut::Yearly => write!(f, "yearly"),
        }
    }
}

impl IntervalShortcut {
    pub fn duration(&self) -> CalendarDuration {
        match self {
            IntervalShortcut::Daily => CalendarDuration::days(1),
            IntervalShortcut::Weekly => CalendarDuration::weeks(1),
            IntervalShortcut::Monthly => CalendarDuration::months(1),
            IntervalShortcut::Yearly => CalendarDuration::years(1),
        }
    }
}

/// Interval options shared by `new` and `pause`. Conflicts are reported by
/// the recurrence builder together with any other invalid option.
#[derive(Args, Debug, Clone)]
pub struct IntervalArgs {
    /// Named interval
    #[arg(long, value_enum)]
    pub every: Option<IntervalShortcut>,
    /// ISO-8601 interval (e.g., 'P1M', 'P2W', 'PT36H')
    #[arg(long)]
    pub interval: Option<CalendarDuration>,
}

#[derive(Parser, Debug, Clone)]
pub struct NewCommand {
    #[command(flatten)]
    pub interval: IntervalArgs,
    /// First occurrence (e.g., '2025-01-01', 'next monday'), defaults to now
    #[arg(long)]
    pub start: Option<String>,
    /// Total number of occurrences
    #[arg(long, allow_negative_numbers = true)]
    pub count: Option<i64>,
    /// Repeat without end
    #[arg(long)]
    pub forever: bool,
    /// Last date an occurrence may fall on
    #[arg(long)]
    pub until: Option<String>,
    /// Overwrite an existing sequence file
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// Number of occurrences to show, defaults to the configured count
    #[arg(long, short)]
    pub count: Option<usize>,
    /// Only show occurrences strictly after this date
    #[arg(long)]
    pub after: Option<String>,
}

/// Pauses either as a recurrence (`--start` with an interval), skipping the
/// occurrences it lines up with, or as a window (`--from`/`--to`), skipping
/// everything in between.
#[derive(Parser, Debug, Clone)]
pub struct PauseCommand {
    /// First occurrence of the pause recurrence, defaults to now
    #[arg(long)]
    pub start: Option<String>,
    #[command(flatten)]
    pub interval: IntervalArgs,
    /// Number of occurrences in the pause recurrence
    #[arg(long, allow_negative_numbers = true)]
    pub count: Option<i64>,
    /// Last date of the pause recurrence
    #[arg(long)]
    pub until: Option<String>,
    /// Start of a pause window (inclusive)
    #[arg(
        long,
        requires = "to",
        conflicts_with_all = ["start", "every", "interval", "count", "until"]
    )]
    pub from: Option<String>,
    /// End of a pause window (inclusive, e.g., '2025-07-31T23:59:59Z')
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ReconfigureCommand {
    /// End the active recurrence here; omit to change it in place
    #[arg(long)]
    pub stop: Option<String>,
    /// Start of the new active recurrence, defaults to --stop
    #[arg(long, requires = "stop")]
    pub restart: Option<String>,
    /// New named interval
    #[arg(long, value_enum, conflicts_with = "interval")]
    pub every: Option<IntervalShortcut>,
    /// New ISO-8601 interval
    #[arg(long)]
    pub interval: Option<CalendarDuration>,
    /// New total number of occurrences
    #[arg(long, conflicts_with = "forever")]
    pub count: Option<u32>,
    /// Repeat without end from now on
    #[arg(long)]
    pub forever: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckCommand {
    /// Date to check (e.g., '2025-04-15', '2025-04-15T09:00:00Z', 'next friday')
    pub date: String,
}
