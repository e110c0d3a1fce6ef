//! Event data model.
//!
//! Dates serialise as `YYYY-MM-DD`, wall-clock times as `HH:MM`, and field
//! names are camelCase so persisted event lists round-trip with the
//! calendar front end unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::temporal::hhmm;

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RepeatType {
    /// Whether this frequency offers an [`RepeatInterval`] choice.
    pub fn has_interval(self) -> bool {
        matches!(self, RepeatType::Monthly | RepeatType::Yearly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepeatType::None => "none",
            RepeatType::Daily => "daily",
            RepeatType::Weekly => "weekly",
            RepeatType::Monthly => "monthly",
            RepeatType::Yearly => "yearly",
        }
    }
}

impl fmt::Display for RepeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatType {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(RepeatType::None),
            "daily" => Ok(RepeatType::Daily),
            "weekly" => Ok(RepeatType::Weekly),
            "monthly" => Ok(RepeatType::Monthly),
            "yearly" => Ok(RepeatType::Yearly),
            other => Err(CalendarError::InvalidRule(format!(
                "unknown repeat type '{other}'"
            ))),
        }
    }
}

/// Which day of the target month a monthly/yearly recurrence lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatInterval {
    /// Last calendar day of the month. Only offered for month-end anchors.
    SameMonthLastDay,
    /// Same day-of-month; months lacking that day are skipped.
    #[default]
    SameDate,
    /// Same weekday, same "nth in month"; months lacking it are skipped.
    SameMonthNthWeekday,
}

impl RepeatInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            RepeatInterval::SameMonthLastDay => "same_month_last_day",
            RepeatInterval::SameDate => "same_date",
            RepeatInterval::SameMonthNthWeekday => "same_month_nth_weekday",
        }
    }
}

impl fmt::Display for RepeatInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatInterval {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "same_month_last_day" => Ok(RepeatInterval::SameMonthLastDay),
            "same_date" => Ok(RepeatInterval::SameDate),
            "same_month_nth_weekday" => Ok(RepeatInterval::SameMonthNthWeekday),
            other => Err(CalendarError::InvalidRule(format!(
                "unknown repeat interval '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatInfo {
    #[serde(rename = "type")]
    pub repeat_type: RepeatType,
    #[serde(default)]
    pub interval: RepeatInterval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl RepeatInfo {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(repeat_type: RepeatType, interval: RepeatInterval) -> Self {
        Self {
            repeat_type,
            interval,
            end_date: None,
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat_type != RepeatType::None
    }
}

/// An event as submitted from the draft, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventForm {
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub repeat: RepeatInfo,
    /// Lead time in minutes.
    pub notification_time: u32,
}

/// A persisted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(flatten)]
    pub form: EventForm,
}

impl Event {
    pub fn new(id: impl Into<String>, form: EventForm) -> Self {
        Self {
            id: id.into(),
            form,
        }
    }

    pub fn title(&self) -> &str {
        &self.form.title
    }
}

/// One concrete dated instance of an [`Event`]. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub event: &'a Event,
    pub date: NaiveDate,
}

impl<'a> Occurrence<'a> {
    pub fn source_event_id(&self) -> &'a str {
        &self.event.id
    }

    pub fn key(&self) -> OccurrenceKey {
        OccurrenceKey {
            event_id: self.event.id.clone(),
            date: self.date,
        }
    }

    /// Materialise as a pseudo-event carrying the source id and this date.
    pub fn to_event(&self) -> Event {
        let mut event = self.event.clone();
        event.form.date = self.date;
        event
    }
}

/// Identity of one occurrence: source event id plus occurrence date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccurrenceKey {
    pub event_id: String,
    pub date: NaiveDate,
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.event_id, self.date)
    }
}

/// An in-app notice that an occurrence is about to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
}

/// Anything occupying a time range on a single calendar day.
pub trait Scheduled {
    /// Persisted id, if any. Drafts for new events have none.
    fn id(&self) -> Option<&str>;
    fn date(&self) -> NaiveDate;
    fn start_time(&self) -> NaiveTime;
    fn end_time(&self) -> NaiveTime;
}

impl Scheduled for EventForm {
    fn id(&self) -> Option<&str> {
        None
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn start_time(&self) -> NaiveTime {
        self.start_time
    }
    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
}

impl Scheduled for Event {
    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }
    fn date(&self) -> NaiveDate {
        self.form.date
    }
    fn start_time(&self) -> NaiveTime {
        self.form.start_time
    }
    fn end_time(&self) -> NaiveTime {
        self.form.end_time
    }
}

impl Scheduled for Occurrence<'_> {
    fn id(&self) -> Option<&str> {
        Some(&self.event.id)
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn start_time(&self) -> NaiveTime {
        self.event.form.start_time
    }
    fn end_time(&self) -> NaiveTime {
        self.event.form.end_time
    }
}

/// An edit candidate: draft fields plus the id of the event being edited.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub form: &'a EventForm,
    pub editing_id: Option<&'a str>,
}

impl Scheduled for Candidate<'_> {
    fn id(&self) -> Option<&str> {
        self.editing_id
    }
    fn date(&self) -> NaiveDate {
        self.form.date
    }
    fn start_time(&self) -> NaiveTime {
        self.form.start_time
    }
    fn end_time(&self) -> NaiveTime {
        self.form.end_time
    }
}
