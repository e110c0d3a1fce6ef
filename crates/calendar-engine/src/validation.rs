//! Start/end time validation for the event draft.
//!
//! Runs on every keystroke in either time field, so it takes raw field text
//! and never fails: unparseable or empty input simply produces no ordering
//! error (the submit-time required-field check catches those).

use serde::Serialize;

use crate::temporal::parse_time;

pub const START_TIME_ERROR: &str = "시작 시간은 종료 시간보다 빨라야 합니다.";
pub const END_TIME_ERROR: &str = "종료 시간은 시작 시간보다 늦어야 합니다.";

/// Per-field inline messages; `None` means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeErrors {
    pub start_time_error: Option<&'static str>,
    pub end_time_error: Option<&'static str>,
}

impl TimeErrors {
    pub fn is_valid(&self) -> bool {
        self.start_time_error.is_none() && self.end_time_error.is_none()
    }
}

/// Validate a start/end pair of `HH:MM` strings.
///
/// When both are present and `start >= end`, both fields carry an error.
///
/// # Examples
///
/// ```
/// use calendar_engine::validation::validate_time_range;
///
/// assert!(validate_time_range("09:00", "10:00").is_valid());
/// assert!(!validate_time_range("10:00", "10:00").is_valid());
/// assert!(validate_time_range("", "10:00").is_valid());
/// ```
pub fn validate_time_range(start_time: &str, end_time: &str) -> TimeErrors {
    let (Ok(start), Ok(end)) = (parse_time(start_time), parse_time(end_time)) else {
        return TimeErrors::default();
    };

    if start >= end {
        TimeErrors {
            start_time_error: Some(START_TIME_ERROR),
            end_time_error: Some(END_TIME_ERROR),
        }
    } else {
        TimeErrors::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_start_after_end_flags_both_fields() {
        let errors = validate_time_range("10:00", "09:00");
        assert_eq!(errors.start_time_error, Some(START_TIME_ERROR));
        assert_eq!(errors.end_time_error, Some(END_TIME_ERROR));
    }

    #[test]
    fn test_equal_times_are_invalid() {
        assert!(!validate_time_range("14:30", "14:30").is_valid());
    }

    #[test]
    fn test_missing_field_produces_no_error() {
        assert_eq!(validate_time_range("", ""), TimeErrors::default());
        assert_eq!(validate_time_range("10:00", ""), TimeErrors::default());
    }

    #[test]
    fn test_partial_input_produces_no_error() {
        assert!(validate_time_range("1", "09:00").is_valid());
    }

    fn hhmm() -> impl Strategy<Value = (u32, u32)> {
        (0u32..24, 0u32..60)
    }

    proptest! {
        #[test]
        fn prop_errors_iff_start_not_before_end((sh, sm) in hhmm(), (eh, em) in hhmm()) {
            let start = format!("{sh:02}:{sm:02}");
            let end = format!("{eh:02}:{em:02}");
            let errors = validate_time_range(&start, &end);
            if (sh, sm) >= (eh, em) {
                prop_assert!(errors.start_time_error.is_some());
                prop_assert!(errors.end_time_error.is_some());
            } else {
                prop_assert!(errors.is_valid());
            }
        }
    }
}
