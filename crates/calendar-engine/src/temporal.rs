//! Calendar-day and wall-clock primitives shared by the other modules.
//!
//! Events carry a calendar day (`YYYY-MM-DD`) and wall-clock times (`HH:MM`)
//! with no timezone attached. Functions here parse those representations,
//! do month arithmetic (last day, nth weekday), build the week/month display
//! windows, and resolve a local date + time to an absolute instant in a
//! configured IANA timezone.
//!
//! Nothing here reads the system clock. Callers pass "now" explicitly.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

// ── Configurable week start ─────────────────────────────────────────────────

/// Which day begins a week for week views and week-scoped search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartDay {
    /// ISO 8601 (Monday = day 0 of the week).
    Monday,
    /// Sunday-first grid, the calendar view's default.
    #[default]
    Sunday,
}

/// How many days `weekday` is from the week-start day.
fn days_from_week_start(weekday: Weekday, week_start: WeekStartDay) -> i64 {
    match week_start {
        WeekStartDay::Monday => weekday.num_days_from_monday() as i64,
        WeekStartDay::Sunday => weekday.num_days_from_sunday() as i64,
    }
}

// ── Date windows ────────────────────────────────────────────────────────────

/// An inclusive range of calendar days `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A window covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when `start > end`; such a window contains nothing.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// The seven-day window containing `date`, beginning on `week_start`.
pub fn week_window(date: NaiveDate, week_start: WeekStartDay) -> DateWindow {
    let start = date - Duration::days(days_from_week_start(date.weekday(), week_start));
    DateWindow::new(start, start + Duration::days(6))
}

/// The window from the first to the last day of `date`'s month.
pub fn month_window(date: NaiveDate) -> DateWindow {
    let start = date.with_day(1).unwrap_or(date);
    let end = last_day_of_month(date.year(), date.month()).unwrap_or(date);
    DateWindow::new(start, end)
}

// ── Month arithmetic ────────────────────────────────────────────────────────

/// The last calendar day of `month` in `year`, or `None` for an invalid month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().is_none_or(|next| next.month() != date.month())
}

/// Which occurrence of its weekday `date` is within its month (1-based,
/// `ceil(day / 7)`), so the 29th–31st are always the 5th.
pub fn weekday_ordinal(date: NaiveDate) -> u32 {
    date.day().div_ceil(7)
}

/// Find the Nth weekday in a month. Returns `None` when the month has no Nth
/// such weekday (e.g. a 5th Friday in a four-Friday month).
pub fn find_nth_weekday_in_month(
    year: i32,
    month: u32,
    weekday: Weekday,
    ordinal: u32,
) -> Option<NaiveDate> {
    if ordinal == 0 {
        return None;
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let diff = (weekday.num_days_from_monday() as i64
        - first.weekday().num_days_from_monday() as i64
        + 7)
        % 7;
    let target = first + Duration::days(diff) + Duration::weeks(ordinal as i64 - 1);
    (target.month() == month).then_some(target)
}

/// Shift a `(year, month)` pair forward by `months`.
pub(crate) fn add_months(year: i32, month: u32, months: u32) -> (i32, u32) {
    let zero_based = month as i64 - 1 + months as i64;
    let year = year as i64 + zero_based.div_euclid(12);
    (year as i32, (zero_based.rem_euclid(12) + 1) as u32)
}

// ── Parsing ─────────────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_date(s: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| CalendarError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse an `HH:MM` wall-clock time (24-hour).
pub fn parse_time(s: &str) -> Result<NaiveTime, CalendarError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| CalendarError::InvalidTime(format!("'{}': {}", s, e)))
}

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz, CalendarError> {
    s.parse::<Tz>()
        .map_err(|_| CalendarError::InvalidTimezone(format!("'{}'", s)))
}

/// Resolve a local date + wall-clock time in `tz` to a UTC instant.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant;
/// nonexistent ones (DST spring-forward gap) yield `None`.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Serde adapter storing a `NaiveTime` as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_last_day_of_month_handles_leap_years() {
        assert_eq!(last_day_of_month(2024, 2), Some(d("2024-02-29")));
        assert_eq!(last_day_of_month(2023, 2), Some(d("2023-02-28")));
        assert_eq!(last_day_of_month(2024, 12), Some(d("2024-12-31")));
        assert_eq!(last_day_of_month(2024, 13), None);
    }

    #[test]
    fn test_is_last_day_of_month() {
        assert!(is_last_day_of_month(d("2024-01-31")));
        assert!(is_last_day_of_month(d("2024-02-29")));
        assert!(!is_last_day_of_month(d("2024-02-28")));
        assert!(is_last_day_of_month(d("2023-02-28")));
    }

    #[test]
    fn test_weekday_ordinal() {
        assert_eq!(weekday_ordinal(d("2024-03-01")), 1);
        assert_eq!(weekday_ordinal(d("2024-03-07")), 1);
        assert_eq!(weekday_ordinal(d("2024-03-08")), 2);
        assert_eq!(weekday_ordinal(d("2024-03-29")), 5);
    }

    #[test]
    fn test_find_nth_weekday_in_month() {
        // March 2024 has five Fridays (1, 8, 15, 22, 29); April has four.
        assert_eq!(
            find_nth_weekday_in_month(2024, 3, Weekday::Fri, 5),
            Some(d("2024-03-29"))
        );
        assert_eq!(find_nth_weekday_in_month(2024, 4, Weekday::Fri, 5), None);
        assert_eq!(
            find_nth_weekday_in_month(2024, 10, Weekday::Tue, 3),
            Some(d("2024-10-15"))
        );
        assert_eq!(find_nth_weekday_in_month(2024, 10, Weekday::Tue, 0), None);
    }

    #[test]
    fn test_add_months_wraps_year() {
        assert_eq!(add_months(2024, 11, 3), (2025, 2));
        assert_eq!(add_months(2024, 1, 0), (2024, 1));
        assert_eq!(add_months(2024, 12, 12), (2025, 12));
    }

    #[test]
    fn test_week_window_sunday_start() {
        // 2024-10-16 is a Wednesday.
        let w = week_window(d("2024-10-16"), WeekStartDay::Sunday);
        assert_eq!(w.start, d("2024-10-13"));
        assert_eq!(w.end, d("2024-10-19"));
    }

    #[test]
    fn test_week_window_monday_start() {
        let w = week_window(d("2024-10-13"), WeekStartDay::Monday);
        assert_eq!(w.start, d("2024-10-07"));
        assert_eq!(w.end, d("2024-10-13"));
    }

    #[test]
    fn test_month_window() {
        let w = month_window(d("2024-02-14"));
        assert_eq!(w, DateWindow::new(d("2024-02-01"), d("2024-02-29")));
        assert!(w.contains(d("2024-02-29")));
        assert!(!w.contains(d("2024-03-01")));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert!(matches!(parse_time("9h"), Err(CalendarError::InvalidTime(_))));
        assert!(matches!(parse_time("24:00"), Err(CalendarError::InvalidTime(_))));
    }

    #[test]
    fn test_parse_date_rejects_invalid_day() {
        assert!(matches!(
            parse_date("2024-02-30"),
            Err(CalendarError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("Asia/Seoul").is_ok());
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(CalendarError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_local_instant_in_seoul() {
        let tz = parse_timezone("Asia/Seoul").unwrap();
        let instant = local_instant(d("2024-10-15"), parse_time("09:00").unwrap(), &tz).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-10-15T00:00:00+00:00");
    }

    #[test]
    fn test_local_instant_in_dst_gap_is_none() {
        let tz = parse_timezone("America/New_York").unwrap();
        // 2026-03-08 02:30 does not exist in New York.
        assert!(local_instant(d("2026-03-08"), parse_time("02:30").unwrap(), &tz).is_none());
    }
}
