//! Validated, chainable construction of recurrences and sequences.
//!
//! Setters only record what was asked for. Every rule is evaluated in
//! [`RecurrenceBuilder::build`], which reports all violations at once.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::duration::CalendarDuration;
use crate::error::CoreError;
use crate::recurrence::Recurrence;
use crate::sequence::Sequence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderOption {
    Starting,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Every,
    Total,
    Forever,
    Until,
}

impl fmt::Display for BuilderOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuilderOption::Starting => "starting",
            BuilderOption::Daily => "daily",
            BuilderOption::Weekly => "weekly",
            BuilderOption::Monthly => "monthly",
            BuilderOption::Yearly => "yearly",
            BuilderOption::Every => "every",
            BuilderOption::Total => "total",
            BuilderOption::Forever => "forever",
            BuilderOption::Until => "until",
        };
        f.write_str(name)
    }
}

/// Options that set the same thing; at most one of each group may be used.
const CONFLICT_GROUPS: [&[BuilderOption]; 2] = [
    &[
        BuilderOption::Daily,
        BuilderOption::Weekly,
        BuilderOption::Monthly,
        BuilderOption::Yearly,
        BuilderOption::Every,
    ],
    &[BuilderOption::Total, BuilderOption::Forever, BuilderOption::Until],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Count {
    Total(i64),
    Forever,
    Until(DateTime<Utc>),
}

/// Builder for [`Recurrence`].
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use chronomancer_core::Recurrence;
///
/// let recurrence = Recurrence::builder()
///     .starting(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
///     .monthly()
///     .total(12)
///     .build()
///     .unwrap();
/// assert_eq!(recurrence.occurrences(), Some(12));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecurrenceBuilder {
    calls: Vec<BuilderOption>,
    start: Option<DateTime<Utc>>,
    interval: Option<CalendarDuration>,
    count: Option<Count>,
}

impl RecurrenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(mut self, option: BuilderOption) -> Self {
        self.calls.push(option);
        self
    }

    fn with_interval(self, option: BuilderOption, interval: CalendarDuration) -> Self {
        let mut builder = self.record(option);
        builder.interval = Some(interval);
        builder
    }

    fn with_count(self, option: BuilderOption, count: Count) -> Self {
        let mut builder = self.record(option);
        builder.count = Some(count);
        builder
    }

    /// First occurrence. Defaults to the time of `build()`.
    pub fn starting(self, start: DateTime<Utc>) -> Self {
        let mut builder = self.record(BuilderOption::Starting);
        builder.start = Some(start);
        builder
    }

    pub fn daily(self) -> Self {
        self.with_interval(BuilderOption::Daily, CalendarDuration::days(1))
    }

    pub fn weekly(self) -> Self {
        self.with_interval(BuilderOption::Weekly, CalendarDuration::weeks(1))
    }

    pub fn monthly(self) -> Self {
        self.with_interval(BuilderOption::Monthly, CalendarDuration::months(1))
    }

    pub fn yearly(self) -> Self {
        self.with_interval(BuilderOption::Yearly, CalendarDuration::years(1))
    }

    pub fn every(self, interval: CalendarDuration) -> Self {
        self.with_interval(BuilderOption::Every, interval)
    }

    /// Exact number of occurrences. Checked for range at build time.
    pub fn total(self, occurrences: i64) -> Self {
        self.with_count(BuilderOption::Total, Count::Total(occurrences))
    }

    pub fn forever(self) -> Self {
        self.with_count(BuilderOption::Forever, Count::Forever)
    }

    /// Ends with the last occurrence at or before `end`.
    pub fn until(self, end: DateTime<Utc>) -> Self {
        self.with_count(BuilderOption::Until, Count::Until(end))
    }

    /// The interval chosen so far, if any.
    pub fn interval(&self) -> Option<CalendarDuration> {
        self.interval
    }

    fn violations(&self, start: DateTime<Utc>) -> Vec<String> {
        let mut violations = Vec::new();

        if self.interval.is_none() {
            violations.push("missing required option: interval".to_string());
        }

        let mut seen: Vec<BuilderOption> = Vec::new();
        for option in &self.calls {
            if seen.contains(option) {
                let message = format!("{} can only be called once", option);
                if !violations.contains(&message) {
                    violations.push(message);
                }
            } else {
                seen.push(*option);
            }
        }

        for group in CONFLICT_GROUPS {
            let used: Vec<BuilderOption> = seen
                .iter()
                .copied()
                .filter(|option| group.contains(option))
                .collect();
            if let Some((first, rest)) = used.split_first() {
                for other in rest {
                    violations.push(format!("{} and {} are mutually exclusive", first, other));
                }
            }
        }

        if self.interval.is_some_and(|interval| interval.is_zero()) {
            violations.push("interval must be non-zero".to_string());
        }

        match self.count {
            Some(Count::Total(n)) if n < 0 => {
                violations.push(format!("occurrences must not be negative, got {}", n));
            }
            Some(Count::Total(n)) if u32::try_from(n).is_err() => {
                violations.push(format!("occurrences must be at most {}, got {}", u32::MAX, n));
            }
            Some(Count::Until(end)) if end < start => {
                violations.push(format!("until {} is before the start {}", end, start));
            }
            _ => {}
        }

        violations
    }

    /// Validates every recorded option and builds the recurrence.
    ///
    /// # Returns
    /// * `Ok(Recurrence)` - When all options are consistent
    /// * `Err(CoreError::Validation)` - Listing every violation found
    pub fn build(&self) -> Result<Recurrence, CoreError> {
        let start = self.start.unwrap_or_else(Utc::now);

        let violations = self.violations(start);
        let interval = match self.interval {
            Some(interval) if violations.is_empty() => interval,
            _ => {
                tracing::debug!(count = violations.len(), "rejecting recurrence builder");
                return Err(CoreError::Validation(violations));
            }
        };

        let unbounded = Recurrence::new(start, interval, None)?;
        let occurrences = match self.count {
            Some(Count::Total(n)) => Some(u32::try_from(n).map_err(|_| {
                CoreError::InvalidArgument(format!("occurrence count {} is out of range", n))
            })?),
            Some(Count::Until(end)) => {
                let last = unbounded.floor_slot_index(end).ok_or_else(|| {
                    CoreError::InvalidArgument(format!("no occurrence falls on or before {}", end))
                })?;
                Some(last.saturating_add(1))
            }
            Some(Count::Forever) | None => None,
        };

        Recurrence::new(start, interval, occurrences)
    }
}

/// Builder for a [`Sequence`] whose first active recurrence is described by
/// the same options as [`RecurrenceBuilder`].
#[derive(Debug, Clone, Default)]
pub struct SequenceBuilder {
    recurrence_builder: RecurrenceBuilder,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn forward(self, step: impl FnOnce(RecurrenceBuilder) -> RecurrenceBuilder) -> Self {
        Self {
            recurrence_builder: step(self.recurrence_builder),
        }
    }

    pub fn recurrence_builder(&self) -> &RecurrenceBuilder {
        &self.recurrence_builder
    }

    pub fn starting(self, start: DateTime<Utc>) -> Self {
        self.forward(|builder| builder.starting(start))
    }

    pub fn daily(self) -> Self {
        self.forward(RecurrenceBuilder::daily)
    }

    pub fn weekly(self) -> Self {
        self.forward(RecurrenceBuilder::weekly)
    }

    pub fn monthly(self) -> Self {
        self.forward(RecurrenceBuilder::monthly)
    }

    pub fn yearly(self) -> Self {
        self.forward(RecurrenceBuilder::yearly)
    }

    pub fn every(self, interval: CalendarDuration) -> Self {
        self.forward(|builder| builder.every(interval))
    }

    pub fn total(self, occurrences: i64) -> Self {
        self.forward(|builder| builder.total(occurrences))
    }

    pub fn forever(self) -> Self {
        self.forward(RecurrenceBuilder::forever)
    }

    pub fn until(self, end: DateTime<Utc>) -> Self {
        self.forward(|builder| builder.until(end))
    }

    pub fn interval(&self) -> Option<CalendarDuration> {
        self.recurrence_builder.interval()
    }

    pub fn build(&self) -> Result<Sequence, CoreError> {
        Ok(Sequence::new(self.recurrence_builder.build()?))
    }
}

/// Continues a recurrence construction as the initial recurrence of a sequence.
impl From<RecurrenceBuilder> for SequenceBuilder {
    fn from(recurrence_builder: RecurrenceBuilder) -> Self {
        Self { recurrence_builder }
    }
}
