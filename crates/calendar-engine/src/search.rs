//! Event search scoped to the visible calendar page.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::Event;
use crate::recurrence::expand;
use crate::temporal::{month_window, week_window, DateWindow, WeekStartDay};

/// Which calendar page is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Week,
    #[default]
    Month,
}

/// The date window shown by `view` around `current_date`.
pub fn view_window(
    view: CalendarView,
    current_date: NaiveDate,
    week_start: WeekStartDay,
) -> DateWindow {
    match view {
        CalendarView::Week => week_window(current_date, week_start),
        CalendarView::Month => month_window(current_date),
    }
}

fn matches_term(event: &Event, needle: &str) -> bool {
    let form = &event.form;
    [&form.title, &form.description, &form.location]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Events visible in the current view whose title, description or location
/// contains `term` (case-insensitive). An empty term matches everything
/// visible. A recurring event is visible if any occurrence falls in view.
pub fn search_events<'a>(
    events: &'a [Event],
    term: &str,
    view: CalendarView,
    current_date: NaiveDate,
    week_start: WeekStartDay,
) -> Vec<&'a Event> {
    let window = view_window(view, current_date, week_start);
    let needle = term.trim().to_lowercase();

    events
        .iter()
        .filter(|event| needle.is_empty() || matches_term(event, &needle))
        .filter(|event| {
            expand(event.form.date, &event.form.repeat, window)
                .next()
                .is_some()
        })
        .collect()
}
