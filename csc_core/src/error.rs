//! Error taxonomy of the extraction pipeline.
//!
//! A [`FormatError`] is never caught internally: source text that violates
//! the assumed grammar aborts the whole run, since a silently skipped block
//! means a missing calendar entry. Sync failures are the opposite — they are
//! recorded per block and never abort the batch.

use thiserror::Error;

/// A token normalizer could not parse its input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The day/time string lacks the expected `"<days> <time range>"` shape.
    #[error("cannot split day/time text {0:?}")]
    DayTime(String),
    /// A time range side is not a valid 12-hour clock time.
    #[error("cannot parse 12-hour time {0:?}")]
    Time(String),
    /// The time range does not end after it starts.
    #[error("start time {start} is not before end time {end}")]
    TimeOrder { start: String, end: String },
    /// The date range is not two `DD/MM/YYYY` dates joined by `" - "`.
    #[error("cannot parse date range {0:?}")]
    DateRange(String),
    /// A weekday code is not one of MO, TU, WE, TH, FR, SA, SU.
    #[error("unknown weekday code {0:?}")]
    DayCode(String),
}

/// The calendar service rejected or failed a single event submission.
#[derive(Debug, Error)]
#[error("calendar rejected {summary:?}: {reason}")]
pub struct SyncError {
    /// Summary of the event that was being submitted.
    pub summary: String,
    /// Transport error or response body returned by the service.
    pub reason: String,
}
