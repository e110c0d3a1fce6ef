//! iCalendar (RFC 5545) interop for recurrence rules.
//!
//! [`to_rrule`] renders a [`RepeatInfo`] anchored at a date as a
//! `DTSTART`/`RRULE` block that external calendar clients understand, and
//! checks it with the `rrule` crate before returning it.
//! [`expand_rrule_dates`] goes the other way for imported rules.
//!
//! Dates are encoded as midnight UTC; only the calendar day is meaningful.

use chrono::{Datelike, NaiveDate, TimeZone, Weekday};
use rrule::{RRuleSet, Tz};

use crate::error::{CalendarError, Result};
use crate::model::{RepeatInfo, RepeatInterval, RepeatType};
use crate::temporal::{is_last_day_of_month, weekday_ordinal, DateWindow};

/// Upper bound on instances pulled from an imported rule in one call.
const MAX_IMPORTED_INSTANCES: u16 = 5000;

fn ical_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// The `RRULE` value (without the `RRULE:` prefix) for `repeat` from `anchor`.
fn rule_body(anchor: NaiveDate, repeat: &RepeatInfo) -> Option<String> {
    let by_day_in_month = || match repeat.interval {
        RepeatInterval::SameDate => format!("BYMONTHDAY={}", anchor.day()),
        RepeatInterval::SameMonthLastDay => "BYMONTHDAY=-1".to_string(),
        RepeatInterval::SameMonthNthWeekday => format!(
            "BYDAY={}{}",
            weekday_ordinal(anchor),
            ical_weekday(anchor.weekday())
        ),
    };

    let mut body = match repeat.repeat_type {
        RepeatType::None => return None,
        RepeatType::Daily => "FREQ=DAILY".to_string(),
        RepeatType::Weekly => "FREQ=WEEKLY".to_string(),
        RepeatType::Monthly => format!("FREQ=MONTHLY;{}", by_day_in_month()),
        RepeatType::Yearly => format!(
            "FREQ=YEARLY;BYMONTH={};{}",
            anchor.month(),
            by_day_in_month()
        ),
    };

    if let Some(end) = repeat.end_date {
        body.push_str(&format!(";UNTIL={}T235959Z", end.format("%Y%m%d")));
    }
    Some(body)
}

/// Render `repeat` anchored at `anchor` as an RFC 5545 block.
///
/// Returns `Ok(None)` for non-repeating events.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidRule`] when the rule cannot be expressed
/// (a last-day rule on a non-month-end anchor) or fails RFC 5545 validation.
///
/// # Examples
///
/// ```
/// use calendar_engine::ical::to_rrule;
/// use calendar_engine::model::{RepeatInfo, RepeatInterval, RepeatType};
/// use calendar_engine::temporal::parse_date;
///
/// let anchor = parse_date("2024-03-29").unwrap();
/// let repeat = RepeatInfo::new(RepeatType::Monthly, RepeatInterval::SameMonthNthWeekday);
/// let block = to_rrule(anchor, &repeat).unwrap().unwrap();
/// assert_eq!(block, "DTSTART:20240329T000000Z\nRRULE:FREQ=MONTHLY;BYDAY=5FR");
/// ```
pub fn to_rrule(anchor: NaiveDate, repeat: &RepeatInfo) -> Result<Option<String>> {
    if repeat.repeat_type.has_interval()
        && repeat.interval == RepeatInterval::SameMonthLastDay
        && !is_last_day_of_month(anchor)
    {
        return Err(CalendarError::InvalidRule(format!(
            "last-day rule needs a month-end anchor, got {anchor}"
        )));
    }

    let Some(body) = rule_body(anchor, repeat) else {
        return Ok(None);
    };
    let block = format!("DTSTART:{}T000000Z\nRRULE:{}", anchor.format("%Y%m%d"), body);
    parse_rule_set(&block)?;
    Ok(Some(block))
}

fn parse_rule_set(block: &str) -> Result<RRuleSet> {
    block
        .parse::<RRuleSet>()
        .map_err(|e| CalendarError::InvalidRule(format!("'{}': {}", block, e)))
}

/// Expand an imported `DTSTART`/`RRULE` block to the calendar days it covers
/// within `window`.
pub fn expand_rrule_dates(block: &str, window: DateWindow) -> Result<Vec<NaiveDate>> {
    let set = parse_rule_set(block)?;
    let start = window
        .start
        .pred_opt()
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .and_then(|naive| Tz::UTC.from_local_datetime(&naive).single())
        .ok_or_else(|| CalendarError::InvalidDate(window.start.to_string()))?;
    let end = window
        .end
        .and_hms_opt(23, 59, 59)
        .and_then(|naive| Tz::UTC.from_local_datetime(&naive).single())
        .ok_or_else(|| CalendarError::InvalidDate(window.end.to_string()))?;

    let result = set.after(start).before(end).all(MAX_IMPORTED_INSTANCES);
    let mut dates: Vec<NaiveDate> = result.dates.iter().map(|dt| dt.date_naive()).collect();
    dates.retain(|d| window.contains(*d));
    dates.dedup();
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::expand;
    use crate::temporal::parse_date;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_none_has_no_rule() {
        assert_eq!(to_rrule(d("2024-10-15"), &RepeatInfo::none()).unwrap(), None);
    }

    #[test]
    fn test_daily_with_end_date() {
        let repeat =
            RepeatInfo::new(RepeatType::Daily, RepeatInterval::SameDate).until(d("2024-10-20"));
        assert_eq!(
            to_rrule(d("2024-10-15"), &repeat).unwrap().unwrap(),
            "DTSTART:20241015T000000Z\nRRULE:FREQ=DAILY;UNTIL=20241020T235959Z"
        );
    }

    #[test]
    fn test_yearly_last_day() {
        let repeat = RepeatInfo::new(RepeatType::Yearly, RepeatInterval::SameMonthLastDay);
        assert_eq!(
            to_rrule(d("2024-02-29"), &repeat).unwrap().unwrap(),
            "DTSTART:20240229T000000Z\nRRULE:FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=-1"
        );
    }

    #[test]
    fn test_last_day_rule_on_mid_month_anchor_is_rejected() {
        let repeat = RepeatInfo::new(RepeatType::Monthly, RepeatInterval::SameMonthLastDay);
        assert!(matches!(
            to_rrule(d("2024-02-20"), &repeat),
            Err(CalendarError::InvalidRule(_))
        ));
    }

    #[test]
    fn test_garbage_block_is_rejected() {
        let window = DateWindow::new(d("2024-01-01"), d("2024-12-31"));
        assert!(matches!(
            expand_rrule_dates("RRULE:FREQ=SOMETIMES", window),
            Err(CalendarError::InvalidRule(_))
        ));
    }

    #[test]
    fn test_exported_rules_expand_like_native_expansion() {
        let window = DateWindow::new(d("2024-01-01"), d("2025-12-31"));
        let cases = [
            ("2024-01-31", RepeatInfo::new(RepeatType::Monthly, RepeatInterval::SameDate)),
            (
                "2024-03-29",
                RepeatInfo::new(RepeatType::Monthly, RepeatInterval::SameMonthNthWeekday),
            ),
            (
                "2024-01-31",
                RepeatInfo::new(RepeatType::Monthly, RepeatInterval::SameMonthLastDay),
            ),
            (
                "2024-10-15",
                RepeatInfo::new(RepeatType::Weekly, RepeatInterval::SameDate)
                    .until(d("2024-12-31")),
            ),
        ];

        for (anchor, repeat) in cases {
            let anchor = d(anchor);
            let block = to_rrule(anchor, &repeat).unwrap().unwrap();
            let imported = expand_rrule_dates(&block, window).unwrap();
            let native: Vec<NaiveDate> = expand(anchor, &repeat, window).collect();
            assert_eq!(imported, native, "mismatch for {block}");
        }
    }
}
