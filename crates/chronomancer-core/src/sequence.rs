use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

use crate::builder::SequenceBuilder;
use crate::duration::CalendarDuration;
use crate::error::CoreError;
use crate::exception::{excluded_by, Exception};
use crate::recurrence::{Occurrences, Recurrence};

/// Changes applied by [`Sequence::reconfigure`].
///
/// `occurrences` is doubly optional: the outer `Option` says whether the
/// count changes at all, the inner one is the new count (`None` = forever).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconfiguration {
    pub interval: Option<CalendarDuration>,
    pub occurrences: Option<Option<u32>>,
}

impl Reconfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval(mut self, interval: CalendarDuration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn occurrences(mut self, occurrences: Option<u32>) -> Self {
        self.occurrences = Some(occurrences);
        self
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.interval.is_some_and(|interval| interval.is_zero()) {
            return Err(CoreError::InvalidArgument(
                "recurrence interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sequence: a recurring schedule and the history of how it was reconfigured.
///
/// Holds one active recurrence, the historical recurrences it replaced
/// (each truncated where the next one took over) and a list of pauses
/// shared by all of them. Enumeration walks the timeline in start
/// order, so the historical and active recurrences read as one schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    active: Recurrence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    historical: Vec<Recurrence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    exceptions: Vec<Exception>,
}

impl Sequence {
    pub fn new(initial: Recurrence) -> Self {
        Self {
            active: initial,
            historical: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    /// Starts a validated construction, see [`SequenceBuilder`].
    pub fn builder() -> SequenceBuilder {
        SequenceBuilder::new()
    }

    pub fn active(&self) -> &Recurrence {
        &self.active
    }

    pub fn historical(&self) -> &[Recurrence] {
        &self.historical
    }

    pub fn exceptions(&self) -> &[Exception] {
        &self.exceptions
    }

    /// Historical recurrences followed by the active one, ordered by start.
    pub fn timeline(&self) -> Vec<&Recurrence> {
        let mut recurrences: Vec<&Recurrence> = self
            .historical
            .iter()
            .chain(std::iter::once(&self.active))
            .collect();
        recurrences.sort_by_key(|recurrence| recurrence.start());
        recurrences
    }

    /// Skips every occurrence that `exception` covers from now on: the
    /// aligned occurrences of a recurrence, or everything inside a window.
    pub fn pause(&mut self, exception: impl Into<Exception>) -> &mut Self {
        let exception = exception.into();
        tracing::debug!(?exception, "pausing sequence");
        self.exceptions.push(exception);
        self
    }

    /// Reconfigures the schedule, optionally splitting the timeline.
    ///
    /// # Arguments
    /// * `stop` - Where the active recurrence should end; `None` applies
    ///   `changes` to the active recurrence in place
    /// * `restart` - Start of the new active recurrence, defaults to `stop`
    /// * `changes` - New interval and/or occurrence count
    ///
    /// # Behavior
    /// - `stop` must lie after the active start and, for finite recurrences,
    ///   before its last occurrence
    /// - The active recurrence keeps the occurrences before `stop` and moves
    ///   to the historical list
    /// - The new active recurrence carries the remaining occurrence count
    /// - Every check runs before anything is modified
    pub fn reconfigure(
        &mut self,
        stop: Option<DateTime<Utc>>,
        restart: Option<DateTime<Utc>>,
        changes: Reconfiguration,
    ) -> Result<&mut Self, CoreError> {
        changes.validate()?;

        let Some(stop) = stop else {
            self.reconfigure_active(changes);
            return Ok(self);
        };

        let start = self.active.start();
        if stop <= start {
            return Err(CoreError::InvalidReconfiguration(format!(
                "reconfiguring around {} would break the sequence, a sequence must have \
                 non-overlapping recurrences",
                stop
            )));
        }

        if self.active.is_finite() {
            match self.active.last_occurrence() {
                Some(last) if stop < last => {}
                last => {
                    let end = last.map_or_else(|| "its end".to_string(), |last| last.to_string());
                    return Err(CoreError::InvalidReconfiguration(format!(
                        "stop must be between {} and {}, omit stop to change the active \
                         recurrence in place or pick an earlier one",
                        start, end
                    )));
                }
            }
        }

        let restart = restart.unwrap_or(stop);
        if restart < stop {
            return Err(CoreError::InvalidReconfiguration(format!(
                "restart {} must not precede stop {}",
                restart, stop
            )));
        }

        let around = self.active.ceil_slot_index(stop).ok_or_else(|| {
            CoreError::InvalidReconfiguration(format!("no occurrence can be located around {}", stop))
        })?;

        if around == self.current_active_occurrence_index() {
            self.reconfigure_active(changes);
            return Ok(self);
        }

        let interval = changes.interval.unwrap_or(self.active.interval());
        let occurrences = match changes.occurrences.unwrap_or(self.active.occurrences()) {
            Some(total) => Some(total.checked_sub(around).ok_or_else(|| {
                CoreError::InvalidReconfiguration(format!(
                    "{} occurrences cannot cover the {} already scheduled before {}",
                    total, around, stop
                ))
            })?),
            None => None,
        };
        let next = Recurrence::new(restart, interval, occurrences)?;

        tracing::debug!(
            %stop,
            %restart,
            kept = around,
            %interval,
            remaining = ?occurrences,
            "splitting sequence"
        );

        let mut retired = std::mem::replace(&mut self.active, next);
        retired.set_occurrences(Some(around));
        self.historical.push(retired);

        Ok(self)
    }

    fn reconfigure_active(&mut self, changes: Reconfiguration) {
        tracing::debug!(?changes, "reconfiguring active recurrence in place");

        if let Some(interval) = changes.interval {
            self.active.set_interval(interval);
        }
        if let Some(occurrences) = changes.occurrences {
            self.active.set_occurrences(occurrences);
        }
    }

    /// Lazily yields every occurrence of the timeline in ascending order,
    /// skipping paused ones. Infinite iff the active recurrence is.
    pub fn each(&self) -> SequenceOccurrences<'_> {
        SequenceOccurrences {
            recurrences: self.timeline().into_iter(),
            exceptions: &self.exceptions,
            current: None,
        }
    }

    /// Unpaused occurrences strictly after `after` (all of them when `None`),
    /// each paired with its 0-based slot number across the timeline.
    ///
    /// Every recurrence seeks straight to its first slot after `after`, and
    /// paused slots keep their numbers.
    pub fn numbered_after(
        &self,
        after: Option<DateTime<Utc>>,
    ) -> impl Iterator<Item = (u32, DateTime<Utc>)> + '_ {
        let mut offset = 0u32;
        self.timeline().into_iter().flat_map(move |recurrence| {
            let base = offset;
            offset = offset.saturating_add(recurrence.occurrences().unwrap_or(u32::MAX));

            let first = match after {
                Some(after) => recurrence.slot_index_after(after),
                None => Some(0),
            };
            let mut occurrences =
                first.map(|index| Occurrences::starting_at(recurrence, &self.exceptions, index));

            std::iter::from_fn(move || {
                let occurrences = occurrences.as_mut()?;
                let at = occurrences.next()?;
                Some((base.saturating_add(occurrences.index().saturating_sub(1)), at))
            })
        })
    }

    /// True iff `time` is an occurrence of the timeline and not paused.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        !excluded_by(&self.exceptions, time)
            && self.timeline().iter().any(|recurrence| recurrence.is_slot(time))
    }

    /// First unpaused occurrence strictly after `time`.
    pub fn next_after(&self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.timeline()
            .into_iter()
            .filter_map(|recurrence| {
                let index = recurrence.slot_index_after(time)?;
                Occurrences::starting_at(recurrence, &self.exceptions, index).next()
            })
            .min()
    }

    /// Occurrences across the whole timeline, `None` when unbounded.
    pub fn total_occurrences(&self) -> Option<u32> {
        self.active
            .occurrences()
            .map(|active| self.current_active_occurrence_index().saturating_add(active))
    }

    /// Occurrences consumed by historical recurrences.
    pub fn current_active_occurrence_index(&self) -> u32 {
        self.historical
            .iter()
            .filter_map(Recurrence::occurrences)
            .fold(0, u32::saturating_add)
    }

    /// Encodes the sequence as JSON, leaving out empty lists.
    pub fn dump(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a sequence produced by [`Sequence::dump`]. Blank input yields `None`.
    pub fn load(input: &str) -> Result<Option<Self>, CoreError> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(input)?))
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = DateTime<Utc>;
    type IntoIter = SequenceOccurrences<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.each()
    }
}

/// Iterator returned by [`Sequence::each`].
///
/// Each recurrence is filtered through the sequence's pauses as a borrowed
/// snapshot; nothing on the recurrences themselves is touched.
#[derive(Debug)]
pub struct SequenceOccurrences<'a> {
    recurrences: std::vec::IntoIter<&'a Recurrence>,
    exceptions: &'a [Exception],
    current: Option<Occurrences<'a>>,
}

impl Iterator for SequenceOccurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(occurrence) = self.current.as_mut().and_then(|current| current.next()) {
                return Some(occurrence);
            }
            self.current = Some(self.recurrences.next()?.all_excluding(self.exceptions));
        }
    }
}

impl FusedIterator for SequenceOccurrences<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::Window;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn monthly(start: DateTime<Utc>, occurrences: Option<u32>) -> Recurrence {
        Recurrence::new(start, CalendarDuration::months(1), occurrences).unwrap()
    }

    fn daily(start: DateTime<Utc>, occurrences: Option<u32>) -> Recurrence {
        Recurrence::new(start, CalendarDuration::days(1), occurrences).unwrap()
    }

    fn billing_year() -> Sequence {
        Sequence::new(monthly(utc(2025, 1, 1), Some(12)))
    }

    mod enumeration_tests {
        use super::*;

        #[test]
        fn test_each_matches_active_recurrence() {
            let sequence = billing_year();
            let dates: Vec<_> = sequence.each().collect();
            assert_eq!(dates, sequence.active().to_vec().unwrap());
        }

        #[test]
        fn test_pause_skips_covered_occurrences() {
            let mut sequence = billing_year();
            sequence.pause(daily(utc(2025, 3, 1), Some(31)));

            let dates: Vec<_> = sequence.each().collect();
            assert_eq!(dates.len(), 11);
            assert!(!dates.contains(&utc(2025, 3, 1)));
            assert!(!sequence.contains(utc(2025, 3, 1)));
            assert!(sequence.contains(utc(2025, 4, 1)));
            assert!(sequence.active().exceptions().is_empty());
        }

        #[test]
        fn test_window_pause_skips_unaligned_occurrences() {
            let mut sequence = Sequence::new(
                Recurrence::new(
                    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
                    CalendarDuration::months(1),
                    Some(12),
                )
                .unwrap(),
            );

            // a daily pause at midnight never lines up with 09:00
            sequence.pause(daily(utc(2025, 7, 1), Some(31)));
            assert_eq!(sequence.each().count(), 12);

            sequence.pause(Window::new(utc(2025, 7, 1), utc(2025, 7, 31)).unwrap());
            let july = Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap();
            assert_eq!(sequence.each().count(), 11);
            assert!(!sequence.contains(july));
            assert_eq!(
                sequence.next_after(utc(2025, 6, 2)),
                Some(Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap())
            );
        }

        #[test]
        fn test_unbounded_pause_ends_bounded_enumeration() {
            let mut sequence = Sequence::new(
                Recurrence::new(utc(2025, 1, 1), CalendarDuration::hours(1), None).unwrap(),
            );
            sequence.pause(Recurrence::new(utc(2025, 6, 1), CalendarDuration::hours(1), None).unwrap());

            let dates: Vec<_> = sequence
                .each()
                .take_while(|date| *date < utc(2026, 1, 1))
                .collect();
            assert_eq!(dates.len(), 151 * 24);
            assert_eq!(sequence.next_after(utc(2025, 7, 1)), None);
            assert!(!sequence.contains(utc(2025, 7, 1)));
        }

        #[test]
        fn test_unbounded_pause_ends_each_recurrence_in_turn() {
            let mut sequence = Sequence::new(monthly(utc(2025, 1, 1), None));
            sequence
                .reconfigure(Some(utc(2025, 4, 15)), None, Reconfiguration::new())
                .unwrap()
                .pause(daily(utc(2025, 3, 1), None));

            let dates: Vec<_> = sequence.each().collect();
            assert_eq!(dates, vec![utc(2025, 1, 1), utc(2025, 2, 1)]);
            assert_eq!(sequence.next_after(utc(2025, 2, 1)), None);
        }

        #[test]
        fn test_numbered_after_seeks_and_keeps_slot_numbers() {
            let mut sequence = billing_year();
            sequence
                .reconfigure(Some(utc(2025, 4, 15)), None, Reconfiguration::new())
                .unwrap()
                .pause(daily(utc(2025, 6, 15), Some(1)));

            let all: Vec<_> = sequence.numbered_after(None).collect();
            assert_eq!(all.len(), 11);
            assert_eq!(all[0], (0, utc(2025, 1, 1)));
            assert_eq!(all[4], (4, utc(2025, 4, 15)));
            assert_eq!(all[5], (5, utc(2025, 5, 15)));
            assert_eq!(all[6], (7, utc(2025, 7, 15)));

            let after: Vec<_> = sequence.numbered_after(Some(utc(2025, 10, 20))).collect();
            assert_eq!(after, vec![(11, utc(2025, 11, 15))]);
        }

        #[test]
        fn test_numbered_after_on_fine_infinite_schedule() {
            let sequence = Sequence::new(
                Recurrence::new(utc(2000, 1, 1), CalendarDuration::minutes(1), None).unwrap(),
            );
            let next: Vec<_> = sequence.numbered_after(Some(utc(2000, 1, 2))).take(2).collect();
            assert_eq!(
                next,
                vec![
                    (1441, Utc.with_ymd_and_hms(2000, 1, 2, 0, 1, 0).unwrap()),
                    (1442, Utc.with_ymd_and_hms(2000, 1, 2, 0, 2, 0).unwrap()),
                ]
            );
        }

        #[test]
        fn test_infinite_sequence_is_lazy() {
            let sequence = Sequence::new(monthly(utc(2025, 1, 1), None));
            let dates: Vec<_> = (&sequence)
                .into_iter()
                .take_while(|date| *date < utc(2026, 1, 1))
                .collect();
            assert_eq!(dates.len(), 12);
            assert_eq!(sequence.total_occurrences(), None);
        }
    }

    mod reconfigure_tests {
        use super::*;

        #[test]
        fn test_in_place_without_stop() {
            let mut sequence = billing_year();
            sequence
                .reconfigure(None, None, Reconfiguration::new().interval(CalendarDuration::weeks(2)))
                .unwrap();

            assert!(sequence.historical().is_empty());
            assert_eq!(sequence.active().interval(), CalendarDuration::weeks(2));
            assert_eq!(sequence.active().occurrences(), Some(12));
        }

        #[test]
        fn test_in_place_count_change() {
            let mut sequence = billing_year();
            sequence
                .reconfigure(None, None, Reconfiguration::new().occurrences(None))
                .unwrap();
            assert!(sequence.active().is_infinite());
        }

        #[test]
        fn test_split_keeps_schedule_contiguous() {
            let mut sequence = billing_year();
            sequence
                .reconfigure(Some(utc(2025, 4, 15)), None, Reconfiguration::new())
                .unwrap();

            assert_eq!(sequence.historical().len(), 1);
            assert_eq!(sequence.historical()[0].occurrences(), Some(4));
            assert_eq!(sequence.active().start(), utc(2025, 4, 15));
            assert_eq!(sequence.active().occurrences(), Some(8));
            assert_eq!(sequence.current_active_occurrence_index(), 4);
            assert_eq!(sequence.total_occurrences(), Some(12));

            let dates: Vec<_> = sequence.each().collect();
            assert_eq!(dates.len(), 12);
            assert_eq!(&dates[..4], &[utc(2025, 1, 1), utc(2025, 2, 1), utc(2025, 3, 1), utc(2025, 4, 1)]);
            assert_eq!(dates[4], utc(2025, 4, 15));
            assert_eq!(dates[11], utc(2025, 11, 15));
        }

        #[test]
        fn test_split_with_restart_and_new_interval() {
            let mut sequence = Sequence::new(monthly(utc(2025, 1, 1), None));
            sequence
                .reconfigure(
                    Some(utc(2025, 3, 1)),
                    Some(utc(2025, 6, 1)),
                    Reconfiguration::new().interval(CalendarDuration::weeks(1)),
                )
                .unwrap();

            assert_eq!(sequence.historical()[0].occurrences(), Some(2));
            assert!(sequence.active().is_infinite());

            let dates: Vec<_> = sequence.each().take(4).collect();
            assert_eq!(dates, vec![utc(2025, 1, 1), utc(2025, 2, 1), utc(2025, 6, 1), utc(2025, 6, 8)]);
            assert_eq!(sequence.next_after(utc(2025, 2, 1)), Some(utc(2025, 6, 1)));
        }

        #[test]
        fn test_stop_on_existing_boundary_changes_in_place() {
            let mut sequence = billing_year();
            sequence
                .reconfigure(Some(utc(2025, 4, 15)), None, Reconfiguration::new())
                .unwrap();

            // Jul 20 rounds up to index 4 of the new active, which equals the
            // four occurrences already consumed by history
            sequence
                .reconfigure(
                    Some(utc(2025, 7, 20)),
                    None,
                    Reconfiguration::new().interval(CalendarDuration::weeks(1)),
                )
                .unwrap();

            assert_eq!(sequence.historical().len(), 1);
            assert_eq!(sequence.active().interval(), CalendarDuration::weeks(1));
            assert_eq!(sequence.active().start(), utc(2025, 4, 15));
        }

        #[test]
        fn test_stop_before_start_is_rejected() {
            let mut sequence = billing_year();
            let before = sequence.clone();

            let result = sequence.reconfigure(Some(utc(2025, 1, 1)), None, Reconfiguration::new());
            assert!(matches!(result, Err(CoreError::InvalidReconfiguration(_))));
            assert_eq!(sequence, before);
        }

        #[test]
        fn test_stop_after_last_is_rejected() {
            let mut sequence = billing_year();
            let before = sequence.clone();

            for stop in [utc(2025, 12, 1), utc(2026, 3, 1)] {
                let result = sequence.reconfigure(Some(stop), None, Reconfiguration::new());
                assert!(matches!(result, Err(CoreError::InvalidReconfiguration(_))));
            }
            assert_eq!(sequence, before);
        }

        #[test]
        fn test_restart_before_stop_is_rejected() {
            let mut sequence = billing_year();
            let result = sequence.reconfigure(
                Some(utc(2025, 6, 1)),
                Some(utc(2025, 5, 1)),
                Reconfiguration::new(),
            );
            assert!(matches!(result, Err(CoreError::InvalidReconfiguration(_))));
            assert!(sequence.historical().is_empty());
        }

        #[test]
        fn test_count_below_consumed_is_rejected() {
            let mut sequence = billing_year();
            let before = sequence.clone();

            let result = sequence.reconfigure(
                Some(utc(2025, 6, 15)),
                None,
                Reconfiguration::new().occurrences(Some(3)),
            );
            assert!(matches!(result, Err(CoreError::InvalidReconfiguration(_))));
            assert_eq!(sequence, before);
        }

        #[test]
        fn test_zero_interval_is_rejected() {
            let mut sequence = billing_year();
            let result = sequence.reconfigure(
                None,
                None,
                Reconfiguration::new().interval(CalendarDuration::ZERO),
            );
            assert!(matches!(result, Err(CoreError::InvalidArgument(_))));
            assert_eq!(sequence.active().interval(), CalendarDuration::months(1));
        }

        #[test]
        fn test_reconfigure_chains() {
            let mut sequence = Sequence::new(monthly(utc(2025, 1, 1), None));
            sequence
                .reconfigure(Some(utc(2025, 3, 1)), None, Reconfiguration::new())
                .unwrap()
                .pause(daily(utc(2025, 4, 1), Some(1)));

            assert_eq!(sequence.exceptions().len(), 1);
            assert_eq!(sequence.next_after(utc(2025, 3, 1)), Some(utc(2025, 5, 1)));
        }
    }

    mod persistence_tests {
        use super::*;

        #[test]
        fn test_dump_omits_empty_lists() {
            let json = billing_year().dump().unwrap();
            assert_eq!(
                json,
                r#"{"active":{"start":"2025-01-01T00:00:00Z","interval":"P1M","occurrences":12}}"#
            );
        }

        #[test]
        fn test_load_restores_timeline() {
            let mut sequence = billing_year();
            sequence
                .reconfigure(Some(utc(2025, 4, 15)), None, Reconfiguration::new())
                .unwrap()
                .pause(daily(utc(2025, 6, 15), Some(1)));

            let loaded = Sequence::load(&sequence.dump().unwrap()).unwrap().unwrap();
            assert_eq!(loaded, sequence);
            assert_eq!(loaded.each().collect::<Vec<_>>(), sequence.each().collect::<Vec<_>>());
        }

        #[test]
        fn test_window_pause_survives_dump() {
            let mut sequence = billing_year();
            sequence
                .pause(daily(utc(2025, 3, 1), Some(1)))
                .pause(Window::new(utc(2025, 7, 1), utc(2025, 8, 31)).unwrap());

            let json = sequence.dump().unwrap();
            assert!(json.contains(r#"{"first":"2025-07-01T00:00:00Z","last":"2025-08-31T00:00:00Z"}"#));

            let loaded = Sequence::load(&json).unwrap().unwrap();
            assert_eq!(loaded, sequence);
            assert_eq!(loaded.each().count(), 9);
        }

        #[test]
        fn test_load_blank_is_none() {
            assert!(Sequence::load("").unwrap().is_none());
            assert!(Sequence::load("  \n").unwrap().is_none());
        }

        #[test]
        fn test_load_malformed_fails() {
            assert!(matches!(Sequence::load("{"), Err(CoreError::Serialization(_))));
        }
    }
}
