//! Error types for calendar-engine operations.

use thiserror::Error;

/// User-correctable input problems that block submission of a draft.
///
/// The display strings are the inline messages shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("필수 정보를 모두 입력해주세요.")]
    MissingRequiredFields,

    #[error("날짜를 확인해주세요.")]
    InvalidDate,

    #[error("시간 설정을 확인해주세요.")]
    InvalidTimeRange,

    #[error("반복 종료일을 확인해주세요.")]
    InvalidRepeatEndDate,
}

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
