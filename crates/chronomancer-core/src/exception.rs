//! Exceptions: what a pause removes from a schedule.
//!
//! A recurrence exception removes the occurrences it lines up with exactly.
//! A window removes every occurrence inside an inclusive span of time,
//! aligned or not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coverage;
use crate::duration::CalendarDuration;
use crate::error::CoreError;
use crate::recurrence::Recurrence;

/// Inclusive `[first, last]` span of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowRecord")]
pub struct Window {
    first: DateTime<Utc>,
    last: DateTime<Utc>,
}

#[derive(Deserialize)]
struct WindowRecord {
    first: DateTime<Utc>,
    last: DateTime<Utc>,
}

impl TryFrom<WindowRecord> for Window {
    type Error = CoreError;

    fn try_from(record: WindowRecord) -> Result<Self, Self::Error> {
        Window::new(record.first, record.last)
    }
}

impl Window {
    pub fn new(first: DateTime<Utc>, last: DateTime<Utc>) -> Result<Self, CoreError> {
        if last < first {
            return Err(CoreError::InvalidArgument(format!(
                "window end {} precedes its start {}",
                last, first
            )));
        }
        Ok(Self { first, last })
    }

    pub fn first(&self) -> DateTime<Utc> {
        self.first
    }

    pub fn last(&self) -> DateTime<Utc> {
        self.last
    }

    #[inline]
    pub fn covers(&self, time: DateTime<Utc>) -> bool {
        self.first <= time && time <= self.last
    }
}

/// A single entry of an exception list.
///
/// Serialized untagged: a recurrence keeps its usual
/// `{start, interval, occurrences}` shape and a window is `{first, last}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Exception {
    Recurrence(Recurrence),
    Window(Window),
}

impl Exception {
    /// True iff `time` is removed by this exception.
    pub fn covers(&self, time: DateTime<Utc>) -> bool {
        match self {
            Exception::Recurrence(recurrence) => recurrence.contains(time),
            Exception::Window(window) => window.covers(time),
        }
    }

    /// True iff `from` and every later step of `interval` from it are
    /// removed. Only an unbounded recurrence can remove an unbounded tail.
    pub(crate) fn covers_rest(&self, from: DateTime<Utc>, interval: CalendarDuration) -> bool {
        match self {
            Exception::Recurrence(recurrence) => coverage::covers_tail(recurrence, from, interval),
            Exception::Window(_) => false,
        }
    }

    pub fn as_recurrence(&self) -> Option<&Recurrence> {
        match self {
            Exception::Recurrence(recurrence) => Some(recurrence),
            Exception::Window(_) => None,
        }
    }

    pub fn as_window(&self) -> Option<&Window> {
        match self {
            Exception::Window(window) => Some(window),
            Exception::Recurrence(_) => None,
        }
    }
}

impl From<Recurrence> for Exception {
    fn from(recurrence: Recurrence) -> Self {
        Exception::Recurrence(recurrence)
    }
}

impl From<Window> for Exception {
    fn from(window: Window) -> Self {
        Exception::Window(window)
    }
}

/// Returns whether any of `exceptions` removes `time`.
#[inline]
pub(crate) fn excluded_by(exceptions: &[Exception], time: DateTime<Utc>) -> bool {
    exceptions.iter().any(|exception| exception.covers(time))
}
