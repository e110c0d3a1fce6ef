//! Recurrence expansion: anchor date + [`RepeatInfo`] → concrete dates.
//!
//! Expansion is lazy and always bounded. [`expand`] returns an
//! [`Occurrences`] iterator that stops at the earlier of the window end and
//! the rule's `end_date` (both inclusive). Cloning the iterator restarts it
//! from the same position.
//!
//! Month-relative rules never clamp: a `same_date` rule anchored on the 31st
//! produces nothing in 30-day months, and a "5th Friday" rule produces
//! nothing in months with four Fridays.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::model::{Event, Occurrence, RepeatInfo, RepeatInterval, RepeatType};
use crate::temporal::{
    add_months, find_nth_weekday_in_month, is_last_day_of_month, last_day_of_month,
    weekday_ordinal, DateWindow,
};

/// Lazy, finite sequence of occurrence dates in ascending order.
#[derive(Debug, Clone)]
pub struct Occurrences {
    anchor: NaiveDate,
    repeat_type: RepeatType,
    interval: RepeatInterval,
    window_start: NaiveDate,
    limit: NaiveDate,
    period: u32,
    done: bool,
}

/// Expand `repeat` from `anchor` over `window`.
///
/// # Examples
///
/// ```
/// use calendar_engine::model::{RepeatInfo, RepeatInterval, RepeatType};
/// use calendar_engine::recurrence::expand;
/// use calendar_engine::temporal::{parse_date, DateWindow};
///
/// let anchor = parse_date("2024-01-31").unwrap();
/// let repeat = RepeatInfo::new(RepeatType::Monthly, RepeatInterval::SameDate);
/// let window = DateWindow::new(anchor, parse_date("2024-05-31").unwrap());
/// let dates: Vec<String> = expand(anchor, &repeat, window).map(|d| d.to_string()).collect();
/// assert_eq!(dates, ["2024-01-31", "2024-03-31", "2024-05-31"]);
/// ```
pub fn expand(anchor: NaiveDate, repeat: &RepeatInfo, window: DateWindow) -> Occurrences {
    let limit = match repeat.end_date {
        Some(end) if repeat.is_repeating() && end < window.end => end,
        _ => window.end,
    };

    // A last-day rule is only meaningful from a month-end anchor.
    let unusable = repeat.repeat_type.has_interval()
        && repeat.interval == RepeatInterval::SameMonthLastDay
        && !is_last_day_of_month(anchor);

    debug!(
        anchor = %anchor,
        repeat_type = %repeat.repeat_type,
        interval = %repeat.interval,
        window_start = %window.start,
        limit = %limit,
        "expanding recurrence"
    );

    Occurrences {
        anchor,
        repeat_type: repeat.repeat_type,
        interval: repeat.interval,
        window_start: window.start,
        limit,
        period: first_period(anchor, repeat.repeat_type, window.start),
        done: window.is_empty() || unusable,
    }
}

/// Skip whole periods that end before the window opens.
fn first_period(anchor: NaiveDate, repeat_type: RepeatType, window_start: NaiveDate) -> u32 {
    let gap = match repeat_type {
        RepeatType::None => 0,
        RepeatType::Daily => (window_start - anchor).num_days(),
        RepeatType::Weekly => {
            let days = (window_start - anchor).num_days();
            (days + 6).div_euclid(7)
        }
        RepeatType::Monthly => {
            (window_start.year() as i64 - anchor.year() as i64) * 12
                + (window_start.month() as i64 - anchor.month() as i64)
        }
        RepeatType::Yearly => window_start.year() as i64 - anchor.year() as i64,
    };
    gap.clamp(0, u32::MAX as i64) as u32
}

impl Occurrences {
    /// The candidate date for `period`, plus the earliest date that period
    /// could cover. `None` for the bound means the calendar ran out.
    fn candidate(&self, period: u32) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self.repeat_type {
            RepeatType::None => (Some(self.anchor), Some(self.anchor)),
            RepeatType::Daily => {
                let date = self.anchor.checked_add_signed(Duration::days(period as i64));
                (date, date)
            }
            RepeatType::Weekly => {
                let date = self
                    .anchor
                    .checked_add_signed(Duration::weeks(period as i64));
                (date, date)
            }
            RepeatType::Monthly => {
                let (year, month) = add_months(self.anchor.year(), self.anchor.month(), period);
                self.in_month(year, month)
            }
            RepeatType::Yearly => {
                let year = self.anchor.year().checked_add_unsigned(period);
                match year {
                    Some(year) => self.in_month(year, self.anchor.month()),
                    None => (None, None),
                }
            }
        }
    }

    fn in_month(&self, year: i32, month: u32) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let first = NaiveDate::from_ymd_opt(year, month, 1);
        let date = match self.interval {
            RepeatInterval::SameDate => NaiveDate::from_ymd_opt(year, month, self.anchor.day()),
            RepeatInterval::SameMonthLastDay => last_day_of_month(year, month),
            RepeatInterval::SameMonthNthWeekday => find_nth_weekday_in_month(
                year,
                month,
                self.anchor.weekday(),
                weekday_ordinal(self.anchor),
            ),
        };
        (date, first)
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while !self.done {
            let (date, bound) = self.candidate(self.period);

            match bound {
                Some(bound) if bound <= self.limit => {}
                _ => {
                    self.done = true;
                    return None;
                }
            }

            if self.repeat_type == RepeatType::None {
                self.done = true;
            } else {
                match self.period.checked_add(1) {
                    Some(next) => self.period = next,
                    None => self.done = true,
                }
            }

            if let Some(date) = date {
                if date >= self.window_start && date >= self.anchor && date <= self.limit {
                    return Some(date);
                }
            }
        }
        None
    }
}

/// Occurrences of a single event over `window`.
pub fn occurrences_of(event: &Event, window: DateWindow) -> impl Iterator<Item = Occurrence<'_>> {
    expand(event.form.date, &event.form.repeat, window).map(move |date| Occurrence { event, date })
}

/// All occurrences of `events` within `window`, ordered by date then start time.
pub fn materialize(events: &[Event], window: DateWindow) -> Vec<Occurrence<'_>> {
    let mut occurrences: Vec<Occurrence<'_>> = events
        .iter()
        .flat_map(|event| occurrences_of(event, window))
        .collect();
    occurrences.sort_by_key(|o| (o.date, o.event.form.start_time));
    occurrences
}

// ── Interval options ────────────────────────────────────────────────────────

/// One selectable recurrence interval with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalOption {
    pub label: String,
    pub value: RepeatInterval,
}

fn korean_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "일",
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
    }
}

/// The interval choices to offer for `date` and `repeat_type`.
///
/// Empty unless the type is monthly or yearly and a date is set. The
/// last-day option comes first and only for month-end dates.
pub fn interval_options(date: Option<NaiveDate>, repeat_type: RepeatType) -> Vec<IntervalOption> {
    let Some(date) = date else {
        return Vec::new();
    };
    if !repeat_type.has_interval() {
        return Vec::new();
    }

    let month = date.month();
    let mut options = Vec::with_capacity(3);
    if is_last_day_of_month(date) {
        options.push(IntervalOption {
            label: format!("{month}월의 마지막 날"),
            value: RepeatInterval::SameMonthLastDay,
        });
    }
    options.push(IntervalOption {
        label: format!("{month}월 {}일", date.day()),
        value: RepeatInterval::SameDate,
    });
    options.push(IntervalOption {
        label: format!(
            "{month}월 {}번째 {}요일",
            weekday_ordinal(date),
            korean_weekday(date.weekday())
        ),
        value: RepeatInterval::SameMonthNthWeekday,
    });
    options
}

// ── Tests ───────────────────────────────────────────────────────────────────
