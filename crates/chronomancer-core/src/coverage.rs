//! Coverage: does one recurrence produce every occurrence of another?
//!
//! For finite recurrences this is a bounded membership walk. Infinite ones
//! are decided by checking the first relevant occurrence plus interval
//! divisibility, and divisibility has to hold for every length a month
//! (28-31 days) or year (365-366 days) can take.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::duration::{CalendarDuration, DurationUnit, SECONDS_PER_DAY};
use crate::recurrence::Recurrence;

const MONTH_LENGTHS_IN_DAYS: [i64; 4] = [28, 29, 30, 31];
const YEAR_LENGTHS_IN_DAYS: [i64; 2] = [365, 366];

/// Returns true iff every occurrence of `a` at or after `from` (from the
/// first occurrence when `from` is `None`) is also an occurrence of `b`.
pub fn covers_from(a: &Recurrence, b: &Recurrence, from: Option<DateTime<Utc>>) -> bool {
    if b.interval().representative_seconds() > a.interval().representative_seconds() {
        return false;
    }
    if a.is_infinite() && b.is_finite() {
        return false;
    }

    let mut remaining = match from {
        Some(from) => a.all_from(from),
        None => a.all(),
    };

    if a.is_finite() {
        return remaining.all(|occurrence| b.contains(occurrence));
    }

    match remaining.next() {
        Some(first) => covers_tail(b, first, a.interval()),
        // nothing left to cover
        None => true,
    }
}

/// True iff `b` contains `first` and every later step of `interval` from it.
///
/// Holds when `b` is unbounded, has no exceptions of its own, contains
/// `first` and evenly divides `interval`.
pub(crate) fn covers_tail(b: &Recurrence, first: DateTime<Utc>, interval: CalendarDuration) -> bool {
    b.is_infinite()
        && b.exceptions().is_empty()
        && b.interval().representative_seconds() <= interval.representative_seconds()
        && evenly_divides(b.interval(), interval)
        && b.contains(first)
}

/// Every real length, in seconds, that `interval` can span.
///
/// Each month contributes one of 28-31 days and each year 365 or 366 days.
/// The cartesian product is folded into a set of distinct totals as it is
/// built, so `n` months yield `3n + 1` values rather than `4^n` combinations.
pub fn realized_lengths(interval: CalendarDuration) -> BTreeSet<i64> {
    let mut lengths = BTreeSet::from([interval.fixed_seconds()]);

    for _ in 0..interval.component(DurationUnit::Months) {
        lengths = widen(&lengths, &MONTH_LENGTHS_IN_DAYS);
    }
    for _ in 0..interval.component(DurationUnit::Years) {
        lengths = widen(&lengths, &YEAR_LENGTHS_IN_DAYS);
    }

    lengths
}

fn widen(lengths: &BTreeSet<i64>, days: &[i64]) -> BTreeSet<i64> {
    lengths
        .iter()
        .flat_map(|base| days.iter().map(move |d| base + d * SECONDS_PER_DAY))
        .collect()
}

/// True iff `finer` divides `coarser` with zero remainder under every
/// possible calendar realization of both.
pub fn evenly_divides(finer: CalendarDuration, coarser: CalendarDuration) -> bool {
    if finer == coarser {
        return true;
    }

    let finer_lengths = realized_lengths(finer);
    let coarser_lengths = realized_lengths(coarser);

    finer_lengths
        .iter()
        .all(|&f| f > 0 && coarser_lengths.iter().all(|&c| c % f == 0))
}
