//! # Chronomancer Core Library
//!
//! Calendar-aware recurring schedules: generate, query and reconfigure
//! timestamps that repeat on a fixed or calendar interval.
//!
//! ## Features
//!
//! - **Calendar Intervals**: Months and years step by the calendar, clamping
//!   to the end of shorter months instead of drifting
//! - **Lazy Enumeration**: Infinite recurrences are plain iterators
//! - **Exceptions**: Pauses that remove aligned occurrences or every
//!   occurrence inside a window of time
//! - **Coverage Checks**: Decide whether one recurrence produces every
//!   occurrence of another, including across variable month lengths
//! - **Reconfigurable Timelines**: Split a schedule at a point in time and
//!   keep its history intact
//!
//! ## Core Modules
//!
//! - [`duration`]: Calendar-aware durations and their ISO-8601 form
//! - [`recurrence`]: The occurrence generator
//! - [`exception`]: Recurrence and window exceptions
//! - [`coverage`]: Interval divisibility and coverage
//! - [`sequence`]: Timelines of recurrences with shared exceptions
//! - [`builder`]: Validated construction of recurrences and sequences
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use chronomancer_core::{Reconfiguration, Sequence};
//!
//! fn main() -> Result<(), chronomancer_core::CoreError> {
//!     let mut sequence = Sequence::builder()
//!         .starting(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
//!         .monthly()
//!         .total(12)
//!         .build()?;
//!
//!     // move the rest of the year to the 15th
//!     let stop = Utc.with_ymd_and_hms(2025, 4, 15, 0, 0, 0).unwrap();
//!     sequence.reconfigure(Some(stop), None, Reconfiguration::new())?;
//!
//!     assert_eq!(sequence.each().count(), 12);
//!     assert_eq!(sequence.total_occurrences(), Some(12));
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod coverage;
pub mod duration;
pub mod error;
pub mod exception;
pub mod recurrence;
pub mod sequence;

pub use builder::{RecurrenceBuilder, SequenceBuilder};
pub use duration::{CalendarDuration, DurationUnit};
pub use error::CoreError;
pub use exception::{Exception, Window};
pub use recurrence::{ExceptionScope, Occurrences, Recurrence};
pub use sequence::{Reconfiguration, Sequence, SequenceOccurrences};
