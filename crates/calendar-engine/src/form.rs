//! The in-progress event draft.
//!
//! Fields hold raw input text exactly as the form widgets report it; parsing
//! happens once, in [`EventFormState::to_form`], when the draft is submitted.
//! Time-field setters re-run [`validate_time_range`] so inline errors track
//! every keystroke.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::model::{Event, EventForm, RepeatInfo, RepeatInterval, RepeatType};
use crate::recurrence::{interval_options, IntervalOption};
use crate::temporal::{parse_date, parse_time};
use crate::validation::validate_time_range;

pub const CATEGORIES: [&str; 4] = ["업무", "개인", "가족", "기타"];

pub const DEFAULT_NOTIFICATION_MINUTES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFormState {
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub is_repeating: bool,
    pub repeat_type: RepeatType,
    pub repeat_interval: RepeatInterval,
    pub repeat_end_date: String,
    pub notification_time: u32,
    pub editing_event: Option<Event>,
    pub start_time_error: Option<&'static str>,
    pub end_time_error: Option<&'static str>,
    default_notification_time: u32,
}

impl Default for EventFormState {
    fn default() -> Self {
        Self::with_default_notification(DEFAULT_NOTIFICATION_MINUTES)
    }
}

impl EventFormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty draft whose lead time starts at `minutes` (also after reset).
    pub fn with_default_notification(minutes: u32) -> Self {
        Self {
            title: String::new(),
            date: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            description: String::new(),
            location: String::new(),
            category: String::new(),
            is_repeating: false,
            repeat_type: RepeatType::None,
            repeat_interval: RepeatInterval::SameDate,
            repeat_end_date: String::new(),
            notification_time: minutes,
            editing_event: None,
            start_time_error: None,
            end_time_error: None,
            default_notification_time: minutes,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
        self.normalize_interval();
    }

    /// Start-time field change; revalidates against the current end time.
    pub fn set_start_time(&mut self, start_time: impl Into<String>) {
        self.start_time = start_time.into();
        self.validate_times();
    }

    /// End-time field change; revalidates against the current start time.
    pub fn set_end_time(&mut self, end_time: impl Into<String>) {
        self.end_time = end_time.into();
        self.validate_times();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    pub fn set_is_repeating(&mut self, is_repeating: bool) {
        self.is_repeating = is_repeating;
    }

    pub fn set_repeat_type(&mut self, repeat_type: RepeatType) {
        self.repeat_type = repeat_type;
        self.normalize_interval();
    }

    pub fn set_repeat_interval(&mut self, interval: RepeatInterval) {
        self.repeat_interval = interval;
    }

    pub fn set_repeat_end_date(&mut self, date: impl Into<String>) {
        self.repeat_end_date = date.into();
    }

    pub fn set_notification_time(&mut self, minutes: u32) {
        self.notification_time = minutes;
    }

    /// Recompute both inline time errors (also used on blur).
    pub fn validate_times(&mut self) {
        let errors = validate_time_range(&self.start_time, &self.end_time);
        self.start_time_error = errors.start_time_error;
        self.end_time_error = errors.end_time_error;
    }

    /// Restore every field to its initial value.
    pub fn reset(&mut self) {
        *self = Self::with_default_notification(self.default_notification_time);
    }

    /// Populate the draft from `event` and mark it as being edited.
    pub fn edit_event(&mut self, event: &Event) {
        let form = &event.form;
        self.title = form.title.clone();
        self.date = form.date.to_string();
        self.start_time = form.start_time.format("%H:%M").to_string();
        self.end_time = form.end_time.format("%H:%M").to_string();
        self.description = form.description.clone();
        self.location = form.location.clone();
        self.category = form.category.clone();
        self.is_repeating = form.repeat.is_repeating();
        self.repeat_type = form.repeat.repeat_type;
        self.repeat_interval = form.repeat.interval;
        self.repeat_end_date = form
            .repeat
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_default();
        self.notification_time = form.notification_time;
        self.editing_event = Some(event.clone());
        self.validate_times();
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_event.as_ref().map(|e| e.id.as_str())
    }

    fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date).ok()
    }

    /// Interval choices for the current date and repeat type.
    pub fn interval_options(&self) -> Vec<IntervalOption> {
        interval_options(self.parsed_date(), self.repeat_type)
    }

    /// Keep the selected interval among the offered ones.
    fn normalize_interval(&mut self) {
        let options = self.interval_options();
        if !options.is_empty() && !options.iter().any(|o| o.value == self.repeat_interval) {
            self.repeat_interval = RepeatInterval::SameDate;
        }
    }

    /// Build the submission payload, or the reason it is not ready.
    pub fn to_form(&self) -> Result<EventForm, ValidationError> {
        if self.title.trim().is_empty()
            || self.date.trim().is_empty()
            || self.start_time.trim().is_empty()
            || self.end_time.trim().is_empty()
        {
            return Err(ValidationError::MissingRequiredFields);
        }

        let date = parse_date(&self.date).map_err(|_| ValidationError::InvalidDate)?;
        let start_time =
            parse_time(&self.start_time).map_err(|_| ValidationError::InvalidTimeRange)?;
        let end_time = parse_time(&self.end_time).map_err(|_| ValidationError::InvalidTimeRange)?;
        if self.start_time_error.is_some()
            || self.end_time_error.is_some()
            || start_time >= end_time
        {
            return Err(ValidationError::InvalidTimeRange);
        }

        let repeat_type = if self.is_repeating {
            self.repeat_type
        } else {
            RepeatType::None
        };
        let end_date = match self.repeat_end_date.trim() {
            "" => None,
            raw if repeat_type != RepeatType::None => {
                let end = parse_date(raw).map_err(|_| ValidationError::InvalidRepeatEndDate)?;
                if end < date {
                    return Err(ValidationError::InvalidRepeatEndDate);
                }
                Some(end)
            }
            _ => None,
        };

        Ok(EventForm {
            title: self.title.clone(),
            date,
            start_time,
            end_time,
            description: self.description.clone(),
            location: self.location.clone(),
            category: self.category.clone(),
            repeat: RepeatInfo {
                repeat_type,
                interval: self.repeat_interval,
                end_date,
            },
            notification_time: self.notification_time,
        })
    }
}
