use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::ops::{Deref, DerefMut};

use crate::builder::RecurrenceBuilder;
use crate::coverage;
use crate::duration::CalendarDuration;
use crate::error::CoreError;
use crate::exception::{excluded_by, Exception};

/// Recurrence: a start time stepped forward by a calendar-aware interval.
///
/// Responsibilities:
/// 1. Random access to the nth occurrence via repeated calendar stepping
/// 2. Lazy, possibly infinite enumeration in ascending order
/// 3. Exact membership and "next occurrence after" queries
/// 4. Filtering occurrences through a list of exceptions
///
/// The occurrence at index `n` is `interval` applied `n` times to `start`.
/// From Jan 31 a monthly recurrence therefore runs Feb 29, Mar 29, ... and
/// never jumps back to the 31st.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecurrenceRecord", into = "RecurrenceRecord")]
pub struct Recurrence {
    start: DateTime<Utc>,
    interval: CalendarDuration,
    /// `None` for an unbounded recurrence
    occurrences: Option<u32>,
    /// Transient filter, never serialized
    exceptions: Vec<Exception>,
}

/// Persisted shape of a [`Recurrence`]; exceptions are not part of it.
#[derive(Serialize, Deserialize)]
struct RecurrenceRecord {
    start: DateTime<Utc>,
    interval: CalendarDuration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    occurrences: Option<u32>,
}

impl TryFrom<RecurrenceRecord> for Recurrence {
    type Error = CoreError;

    fn try_from(record: RecurrenceRecord) -> Result<Self, Self::Error> {
        Recurrence::new(record.start, record.interval, record.occurrences)
    }
}

impl From<Recurrence> for RecurrenceRecord {
    fn from(recurrence: Recurrence) -> Self {
        Self {
            start: recurrence.start,
            interval: recurrence.interval,
            occurrences: recurrence.occurrences,
        }
    }
}

impl Recurrence {
    /// Creates a recurrence from an already validated construction request.
    ///
    /// # Arguments
    /// * `start` - First occurrence
    /// * `interval` - Step between occurrences, must be non-zero
    /// * `occurrences` - Total number of occurrences, `None` for unbounded
    pub fn new(
        start: DateTime<Utc>,
        interval: CalendarDuration,
        occurrences: Option<u32>,
    ) -> Result<Self, CoreError> {
        if interval.is_zero() {
            return Err(CoreError::InvalidArgument(
                "recurrence interval must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            start,
            interval,
            occurrences,
            exceptions: Vec::new(),
        })
    }

    /// Starts a validated construction, see [`RecurrenceBuilder`].
    pub fn builder() -> RecurrenceBuilder {
        RecurrenceBuilder::new()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn interval(&self) -> CalendarDuration {
        self.interval
    }

    pub fn occurrences(&self) -> Option<u32> {
        self.occurrences
    }

    pub fn exceptions(&self) -> &[Exception] {
        &self.exceptions
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.occurrences.is_none()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        !self.is_infinite()
    }

    // Only a Sequence reconfiguring its own timeline changes these.
    pub(crate) fn set_interval(&mut self, interval: CalendarDuration) {
        self.interval = interval;
    }

    pub(crate) fn set_occurrences(&mut self, occurrences: Option<u32>) {
        self.occurrences = occurrences;
    }

    #[inline]
    fn step(&self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.interval.add_to(time)
    }

    #[inline]
    fn in_range(&self, index: u32) -> bool {
        self.occurrences.map_or(true, |count| index < count)
    }

    /// Timestamp of slot `index`, ignoring the occurrence count and exceptions.
    ///
    /// Fixed-length intervals are multiplied out directly; anything with a
    /// month or year part is stepped one interval at a time.
    fn slot(&self, index: u32) -> Option<DateTime<Utc>> {
        if self.interval.is_fixed() {
            let offset = self.interval.fixed_seconds().checked_mul(i64::from(index))?;
            return self.start.checked_add_signed(TimeDelta::try_seconds(offset)?);
        }

        (0..index).try_fold(self.start, |time, _| self.step(time))
    }

    /// Largest slot index whose timestamp is `<= time`, with that timestamp.
    ///
    /// The nominal interval length only proposes a candidate index; exact
    /// calendar stepping then moves it down past any overshoot and up past
    /// any undershoot.
    fn floor_slot(&self, time: DateTime<Utc>) -> Option<(u32, DateTime<Utc>)> {
        if time < self.start {
            return None;
        }

        let elapsed = (time - self.start).num_milliseconds() as f64 / 1000.0;
        let candidate = (elapsed / self.interval.representative_seconds() as f64).ceil();
        let mut index = if candidate >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            candidate as u32
        };

        let mut at = self.slot(index)?;
        while at > time {
            index = index.checked_sub(1)?;
            at = self.slot(index)?;
        }

        while let Some(next) = self.step(at).filter(|next| *next <= time) {
            index = index.checked_add(1)?;
            at = next;
        }

        Some((index, at))
    }

    /// Largest slot index whose timestamp is `<= time`.
    pub(crate) fn floor_slot_index(&self, time: DateTime<Utc>) -> Option<u32> {
        self.floor_slot(time).map(|(index, _)| index)
    }

    /// Smallest slot index whose timestamp is `>= time`.
    pub(crate) fn ceil_slot_index(&self, time: DateTime<Utc>) -> Option<u32> {
        if time <= self.start {
            return Some(0);
        }

        let (index, at) = self.floor_slot(time)?;
        if at == time {
            Some(index)
        } else {
            index.checked_add(1)
        }
    }

    /// Smallest slot index whose timestamp is strictly after `time`.
    pub(crate) fn slot_index_after(&self, time: DateTime<Utc>) -> Option<u32> {
        if time < self.start {
            return Some(0);
        }

        let (index, _) = self.floor_slot(time)?;
        index.checked_add(1)
    }

    /// True when `time` is exactly an in-range slot, regardless of exceptions.
    pub(crate) fn is_slot(&self, time: DateTime<Utc>) -> bool {
        match self.floor_slot(time) {
            Some((index, at)) => at == time && self.in_range(index),
            None => false,
        }
    }

    /// Returns the nth occurrence (0-indexed).
    ///
    /// `None` when `n` is past the occurrence count, when the occurrence is
    /// covered by an exception, or when stepping leaves the representable range.
    pub fn at(&self, n: u32) -> Option<DateTime<Utc>> {
        if !self.in_range(n) {
            return None;
        }

        self.slot(n).filter(|time| !self.is_excluded(*time))
    }

    /// The first `n` non-excepted occurrences.
    pub fn first(&self, n: usize) -> Vec<DateTime<Utc>> {
        self.all().take(n).collect()
    }

    /// The last `min(n, occurrences)` occurrence slots in ascending order,
    /// leaving out slots covered by an exception.
    pub fn last(&self, n: usize) -> Result<Vec<DateTime<Utc>>, CoreError> {
        let count = self.occurrences.ok_or_else(|| {
            CoreError::UnboundedOperation(
                "cannot get the last occurrences of an infinite recurrence".to_string(),
            )
        })?;

        let taken = u32::try_from(n).unwrap_or(u32::MAX).min(count);
        Ok(Occurrences::starting_at(self, &self.exceptions, count - taken).collect())
    }

    /// Final slot of a finite recurrence, ignoring exceptions.
    pub fn last_occurrence(&self) -> Option<DateTime<Utc>> {
        let count = self.occurrences?;
        self.slot(count.checked_sub(1)?)
    }

    /// Lazily yields every non-excepted occurrence in ascending order.
    ///
    /// Infinite when the recurrence is unbounded; bound it with `take`,
    /// `take_while` or similar. Each call starts over from the beginning.
    pub fn all(&self) -> Occurrences<'_> {
        Occurrences::starting_at(self, &self.exceptions, 0)
    }

    /// Like [`Recurrence::all`], filtered through `exceptions` instead of the
    /// recurrence's own exception list.
    pub fn all_excluding<'a>(&'a self, exceptions: &'a [Exception]) -> Occurrences<'a> {
        Occurrences::starting_at(self, exceptions, 0)
    }

    /// Non-excepted occurrences at or after `from`.
    pub fn all_from(&self, from: DateTime<Utc>) -> Occurrences<'_> {
        match self.ceil_slot_index(from) {
            Some(index) => Occurrences::starting_at(self, &self.exceptions, index),
            None => Occurrences::exhausted(self, &self.exceptions),
        }
    }

    /// Collects every occurrence. Fails for unbounded recurrences.
    pub fn to_vec(&self) -> Result<Vec<DateTime<Utc>>, CoreError> {
        if self.is_infinite() {
            return Err(CoreError::UnboundedOperation(
                "cannot convert an infinite recurrence to a list".to_string(),
            ));
        }

        Ok(self.all().collect())
    }

    pub fn is_excluded(&self, time: DateTime<Utc>) -> bool {
        excluded_by(&self.exceptions, time)
    }

    /// True iff `time` lines up exactly with an in-range occurrence that is
    /// not covered by an exception.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.is_slot(time) && !self.is_excluded(time)
    }

    /// Smallest non-excepted occurrence strictly after `time`.
    pub fn next_after(&self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let index = self.slot_index_after(time)?;
        Occurrences::starting_at(self, &self.exceptions, index).next()
    }

    /// True iff every occurrence of `other` at or after `from` is also an
    /// occurrence of `self`. See [`coverage::covers_from`].
    pub fn covers_from(&self, other: &Recurrence, from: Option<DateTime<Utc>>) -> bool {
        coverage::covers_from(other, self, from)
    }

    /// Installs `exceptions` for the duration of `body`.
    ///
    /// The previous exception list comes back however `body` exits,
    /// including by panic.
    pub fn with_exceptions<T>(
        &mut self,
        exceptions: Vec<Exception>,
        body: impl FnOnce(&mut Recurrence) -> T,
    ) -> T {
        let mut scope = self.scoped_exceptions(exceptions);
        body(&mut *scope)
    }

    /// Installs `exceptions` until the returned guard is dropped.
    pub fn scoped_exceptions(&mut self, exceptions: Vec<Exception>) -> ExceptionScope<'_> {
        let previous = std::mem::replace(&mut self.exceptions, exceptions);
        ExceptionScope {
            recurrence: self,
            previous,
        }
    }
}

impl<'a> IntoIterator for &'a Recurrence {
    type Item = DateTime<Utc>;
    type IntoIter = Occurrences<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.all()
    }
}

/// Guard returned by [`Recurrence::scoped_exceptions`]; restores the prior
/// exception list on drop.
pub struct ExceptionScope<'a> {
    recurrence: &'a mut Recurrence,
    previous: Vec<Exception>,
}

impl Deref for ExceptionScope<'_> {
    type Target = Recurrence;

    fn deref(&self) -> &Recurrence {
        &*self.recurrence
    }
}

impl DerefMut for ExceptionScope<'_> {
    fn deref_mut(&mut self) -> &mut Recurrence {
        &mut *self.recurrence
    }
}

impl Drop for ExceptionScope<'_> {
    fn drop(&mut self) {
        self.recurrence.exceptions = std::mem::take(&mut self.previous);
    }
}

/// Cursor over the occurrences of a [`Recurrence`].
///
/// Carries the index and timestamp of the next slot, so each `next()` costs
/// one calendar step plus the exception checks. The cursor ends early once
/// an unbounded exception removes every remaining slot, so bounding an
/// infinite recurrence with `take_while` still terminates.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    recurrence: &'a Recurrence,
    exceptions: &'a [Exception],
    index: u32,
    cursor: Option<DateTime<Utc>>,
}

impl<'a> Occurrences<'a> {
    pub(crate) fn starting_at(
        recurrence: &'a Recurrence,
        exceptions: &'a [Exception],
        index: u32,
    ) -> Self {
        let cursor = if recurrence.in_range(index) {
            recurrence.slot(index)
        } else {
            None
        };

        Self {
            recurrence,
            exceptions,
            index,
            cursor,
        }
    }

    fn exhausted(recurrence: &'a Recurrence, exceptions: &'a [Exception]) -> Self {
        Self {
            recurrence,
            exceptions,
            index: 0,
            cursor: None,
        }
    }

    /// Index of the next slot this cursor will look at.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if !self.recurrence.in_range(self.index) {
                self.cursor = None;
            }
            let current = self.cursor?;

            let Some(exception) = self
                .exceptions
                .iter()
                .find(|exception| exception.covers(current))
            else {
                self.cursor = self.recurrence.step(current);
                self.index = self.index.saturating_add(1);
                return Some(current);
            };

            if exception.covers_rest(current, self.recurrence.interval) {
                self.cursor = None;
                return None;
            }

            self.cursor = self.recurrence.step(current);
            self.index = self.index.saturating_add(1);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.cursor, self.recurrence.occurrences) {
            (None, _) => (0, Some(0)),
            (Some(_), Some(count)) => (0, Some(count.saturating_sub(self.index) as usize)),
            (Some(_), None) => (0, None),
        }
    }
}

impl FusedIterator for Occurrences<'_> {}
