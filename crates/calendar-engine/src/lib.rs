//! # calendar-engine
//!
//! Deterministic computation behind a personal calendar.
//!
//! The engine expands recurring events into concrete dates, detects
//! overlapping events, validates start/end times, and decides when lead-time
//! notifications fire. Everything is a pure function of explicit inputs
//! except the persistence collaborator and the notification tick loop.
//!
//! ## Modules
//!
//! - [`model`] — Events, repeat rules, occurrences, notifications
//! - [`temporal`] — Date/time parsing, month arithmetic, view windows
//! - [`validation`] — Start/end time validation
//! - [`recurrence`] — Repeat rule → lazy sequence of occurrence dates
//! - [`overlap`] — Same-day half-open interval overlap detection
//! - [`notification`] — Lead-time notification scheduler and tick loop
//! - [`form`] — In-progress event draft
//! - [`collection`] — Canonical event list
//! - [`store`] — Persistence collaborator interface
//! - [`submit`] — Propose/confirm save protocol
//! - [`search`] — Search within the visible week or month
//! - [`ical`] — RFC 5545 RRULE export and import
//! - [`config`] — TOML configuration
//! - [`error`] — Error types

pub mod collection;
pub mod config;
pub mod error;
pub mod form;
pub mod ical;
pub mod model;
pub mod notification;
pub mod overlap;
pub mod recurrence;
pub mod search;
pub mod store;
pub mod submit;
pub mod temporal;
pub mod validation;

pub use collection::EventCollection;
pub use config::CalendarConfig;
pub use error::{CalendarError, ValidationError};
pub use form::EventFormState;
pub use ical::{expand_rrule_dates, to_rrule};
pub use model::{
    Candidate, Event, EventForm, Notification, Occurrence, OccurrenceKey, RepeatInfo,
    RepeatInterval, RepeatType, Scheduled,
};
pub use notification::{
    run_notification_loop, Clock, ManualClock, NotificationCenter, NotificationScheduler,
    SystemClock,
};
pub use overlap::find_overlaps;
pub use recurrence::{expand, interval_options, materialize, IntervalOption, Occurrences};
pub use search::{search_events, CalendarView};
pub use store::{EventStore, InMemoryEventStore};
pub use submit::{
    confirm_save, delete_event, propose_save, reload, submit, Proposal, SubmitOutcome,
};
pub use temporal::{DateWindow, WeekStartDay};
pub use validation::{validate_time_range, TimeErrors};
