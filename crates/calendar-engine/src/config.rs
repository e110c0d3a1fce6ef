//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! timezone = "Asia/Seoul"
//! tick_interval_ms = 1000
//! default_notification_minutes = 10
//! week_start = "sunday"
//! ```
//!
//! Every key is optional; missing keys take the defaults above.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};
use crate::form::{EventFormState, DEFAULT_NOTIFICATION_MINUTES};
use crate::notification::NotificationScheduler;
use crate::temporal::{parse_timezone, WeekStartDay};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// IANA zone in which event wall-clock times are interpreted.
    pub timezone: String,
    pub tick_interval_ms: u64,
    pub default_notification_minutes: u32,
    pub week_start: WeekStartDay,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Seoul".to_string(),
            tick_interval_ms: 1000,
            default_notification_minutes: DEFAULT_NOTIFICATION_MINUTES,
            week_start: WeekStartDay::default(),
        }
    }
}

impl FromStr for CalendarConfig {
    type Err = CalendarError;

    fn from_str(content: &str) -> Result<Self> {
        let config: CalendarConfig =
            toml::from_str(content).map_err(|e| CalendarError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl CalendarConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CalendarError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loading calendar config");
        content.parse()
    }

    pub fn validate(&self) -> Result<()> {
        parse_timezone(&self.timezone)?;
        if self.tick_interval_ms == 0 {
            return Err(CalendarError::Config(
                "tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz> {
        parse_timezone(&self.timezone)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn scheduler(&self) -> Result<NotificationScheduler> {
        Ok(NotificationScheduler::new(self.tz()?))
    }

    pub fn new_draft(&self) -> EventFormState {
        EventFormState::with_default_notification(self.default_notification_minutes)
    }
}
