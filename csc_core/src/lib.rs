//! This crate extracts a student's course schedule from a saved course-cart
//! page and pushes the meeting blocks as recurring events to Google Calendar.
//! It can also write a plain iCalendar file for offline import.
//!
//! The pipeline is batch-oriented: one run parses one document snapshot,
//! optionally reconciles user edits from a snapshot file, derives the first
//! real occurrence date for every block and only then talks to the calendar.

pub use ical;

pub mod academic_calendar;
pub mod calendar_client;
pub mod cart_client;
pub mod error;
pub mod ics;
pub mod location;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod recurrence;
