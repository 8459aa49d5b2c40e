use chrono::{DateTime, Months, TimeDelta, Utc};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

use crate::error::CoreError;

/// Nominal length of a month (1/12 of a Gregorian year).
pub const SECONDS_PER_MONTH: i64 = 2_629_746;
/// Nominal length of a Gregorian year (365.2425 days).
pub const SECONDS_PER_YEAR: i64 = 31_556_952;
pub const SECONDS_PER_WEEK: i64 = 604_800;
pub const SECONDS_PER_DAY: i64 = 86_400;
pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_MINUTE: i64 = 60;

/// The units a [`CalendarDuration`] is made of, from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DurationUnit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 7] = [
        DurationUnit::Years,
        DurationUnit::Months,
        DurationUnit::Weeks,
        DurationUnit::Days,
        DurationUnit::Hours,
        DurationUnit::Minutes,
        DurationUnit::Seconds,
    ];

    /// Length in seconds for fixed-length units, `None` for months and years.
    pub fn fixed_seconds(&self) -> Option<i64> {
        match self {
            DurationUnit::Years | DurationUnit::Months => None,
            DurationUnit::Weeks => Some(SECONDS_PER_WEEK),
            DurationUnit::Days => Some(SECONDS_PER_DAY),
            DurationUnit::Hours => Some(SECONDS_PER_HOUR),
            DurationUnit::Minutes => Some(SECONDS_PER_MINUTE),
            DurationUnit::Seconds => Some(1),
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationUnit::Years => write!(f, "years"),
            DurationUnit::Months => write!(f, "months"),
            DurationUnit::Weeks => write!(f, "weeks"),
            DurationUnit::Days => write!(f, "days"),
            DurationUnit::Hours => write!(f, "hours"),
            DurationUnit::Minutes => write!(f, "minutes"),
            DurationUnit::Seconds => write!(f, "seconds"),
        }
    }
}

/// A duration that mixes fixed-length parts (weeks down to seconds) with
/// calendar-relative parts (months and years).
///
/// Adding "1 month" to Jan 31 lands on the last day of February, so the real
/// length of a `CalendarDuration` depends on where it is applied. Serialized
/// as ISO-8601 duration text, e.g. `P1M` or `P4M8D`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, SerializeDisplay, DeserializeFromStr,
)]
pub struct CalendarDuration {
    years: u32,
    months: u32,
    weeks: u32,
    days: u32,
    hours: u32,
    minutes: u32,
    seconds: u32,
}

impl CalendarDuration {
    pub const ZERO: CalendarDuration = CalendarDuration {
        years: 0,
        months: 0,
        weeks: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub const fn years(n: u32) -> Self {
        Self { years: n, ..Self::ZERO }
    }

    pub const fn months(n: u32) -> Self {
        Self { months: n, ..Self::ZERO }
    }

    pub const fn weeks(n: u32) -> Self {
        Self { weeks: n, ..Self::ZERO }
    }

    pub const fn days(n: u32) -> Self {
        Self { days: n, ..Self::ZERO }
    }

    pub const fn hours(n: u32) -> Self {
        Self { hours: n, ..Self::ZERO }
    }

    pub const fn minutes(n: u32) -> Self {
        Self { minutes: n, ..Self::ZERO }
    }

    pub const fn seconds(n: u32) -> Self {
        Self { seconds: n, ..Self::ZERO }
    }

    /// Builds a duration holding `count` of a single unit.
    pub fn of(unit: DurationUnit, count: u32) -> Self {
        Self::ZERO.with_component(unit, count)
    }

    /// Count stored for `unit`.
    pub fn component(&self, unit: DurationUnit) -> u32 {
        match unit {
            DurationUnit::Years => self.years,
            DurationUnit::Months => self.months,
            DurationUnit::Weeks => self.weeks,
            DurationUnit::Days => self.days,
            DurationUnit::Hours => self.hours,
            DurationUnit::Minutes => self.minutes,
            DurationUnit::Seconds => self.seconds,
        }
    }

    fn with_component(mut self, unit: DurationUnit, count: u32) -> Self {
        match unit {
            DurationUnit::Years => self.years = count,
            DurationUnit::Months => self.months = count,
            DurationUnit::Weeks => self.weeks = count,
            DurationUnit::Days => self.days = count,
            DurationUnit::Hours => self.hours = count,
            DurationUnit::Minutes => self.minutes = count,
            DurationUnit::Seconds => self.seconds = count,
        }
        self
    }

    /// Non-zero parts in order, coarsest unit first.
    pub fn decompose(&self) -> Vec<(DurationUnit, u32)> {
        DurationUnit::ALL
            .iter()
            .map(|&unit| (unit, self.component(unit)))
            .filter(|&(_, count)| count > 0)
            .collect()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// True when the duration has no month or year part, i.e. its real
    /// length never depends on the anchor date.
    pub fn is_fixed(&self) -> bool {
        self.years == 0 && self.months == 0
    }

    /// Years and months folded into a single month count.
    pub fn calendar_months(&self) -> u64 {
        u64::from(self.years) * 12 + u64::from(self.months)
    }

    /// Length of the fixed part (weeks down to seconds) in seconds.
    pub fn fixed_seconds(&self) -> i64 {
        i64::from(self.weeks) * SECONDS_PER_WEEK
            + i64::from(self.days) * SECONDS_PER_DAY
            + i64::from(self.hours) * SECONDS_PER_HOUR
            + i64::from(self.minutes) * SECONDS_PER_MINUTE
            + i64::from(self.seconds)
    }

    /// Nominal length in seconds, using average month and year lengths.
    /// Only good for estimates; use [`CalendarDuration::add_to`] for exact results.
    pub fn representative_seconds(&self) -> i64 {
        i64::from(self.years) * SECONDS_PER_YEAR
            + i64::from(self.months) * SECONDS_PER_MONTH
            + self.fixed_seconds()
    }

    /// Applies the duration to `time`.
    ///
    /// The calendar part goes first, clamping the day to the end of the
    /// target month, then the fixed part. Returns `None` when the result
    /// falls outside the representable range.
    pub fn add_to(&self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut result = time;

        let months = self.calendar_months();
        if months > 0 {
            let months = u32::try_from(months).ok()?;
            result = result.checked_add_months(Months::new(months))?;
        }

        let fixed = self.fixed_seconds();
        if fixed > 0 {
            result = result.checked_add_signed(TimeDelta::try_seconds(fixed)?)?;
        }

        Some(result)
    }
}

impl Add for CalendarDuration {
    type Output = CalendarDuration;

    fn add(self, rhs: CalendarDuration) -> CalendarDuration {
        DurationUnit::ALL.iter().fold(self, |acc, &unit| {
            let sum = acc.component(unit).saturating_add(rhs.component(unit));
            acc.with_component(unit, sum)
        })
    }
}

impl Mul<u32> for CalendarDuration {
    type Output = CalendarDuration;

    fn mul(self, rhs: u32) -> CalendarDuration {
        DurationUnit::ALL.iter().fold(self, |acc, &unit| {
            acc.with_component(unit, acc.component(unit).saturating_mul(rhs))
        })
    }
}

impl fmt::Display for CalendarDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "PT0S");
        }

        write!(f, "P")?;
        for (count, designator) in [
            (self.years, 'Y'),
            (self.months, 'M'),
            (self.weeks, 'W'),
            (self.days, 'D'),
        ] {
            if count > 0 {
                write!(f, "{}{}", count, designator)?;
            }
        }

        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            for (count, designator) in [
                (self.hours, 'H'),
                (self.minutes, 'M'),
                (self.seconds, 'S'),
            ] {
                if count > 0 {
                    write!(f, "{}{}", count, designator)?;
                }
            }
        }

        Ok(())
    }
}

const DATE_DESIGNATORS: [(char, DurationUnit); 4] = [
    ('Y', DurationUnit::Years),
    ('M', DurationUnit::Months),
    ('W', DurationUnit::Weeks),
    ('D', DurationUnit::Days),
];

const TIME_DESIGNATORS: [(char, DurationUnit); 3] = [
    ('H', DurationUnit::Hours),
    ('M', DurationUnit::Minutes),
    ('S', DurationUnit::Seconds),
];

/// Parses `<digits><designator>` pairs, requiring designators in table order.
fn parse_components(
    part: &str,
    designators: &[(char, DurationUnit)],
) -> Option<Vec<(DurationUnit, u32)>> {
    let mut components = Vec::new();
    let mut digits = String::new();
    let mut next_allowed = 0;

    for c in part.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        if digits.is_empty() {
            return None;
        }
        let position = designators[next_allowed..]
            .iter()
            .position(|(designator, _)| *designator == c)?
            + next_allowed;
        components.push((designators[position].1, digits.parse().ok()?));
        digits.clear();
        next_allowed = position + 1;
    }

    if !digits.is_empty() {
        return None;
    }
    Some(components)
}

impl FromStr for CalendarDuration {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidDuration(format!("'{}' is not an ISO-8601 duration", s));

        let body = s.trim().strip_prefix('P').ok_or_else(invalid)?;
        let (date_part, time_part) = match body.split_once('T') {
            Some((_, "")) => return Err(invalid()),
            Some((date, time)) => (date, time),
            None => (body, ""),
        };
        if date_part.is_empty() && time_part.is_empty() {
            return Err(invalid());
        }

        let mut components = parse_components(date_part, &DATE_DESIGNATORS).ok_or_else(invalid)?;
        components.extend(parse_components(time_part, &TIME_DESIGNATORS).ok_or_else(invalid)?);

        Ok(components
            .into_iter()
            .fold(Self::ZERO, |acc, (unit, count)| acc.with_component(unit, count)))
    }
}
