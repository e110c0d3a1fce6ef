use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calendar_engine::model::{Candidate, EventForm, RepeatInfo};
use calendar_engine::notification::{Clock, SystemClock, NOTIFICATION_OPTIONS};
use calendar_engine::search::view_window;
use calendar_engine::temporal::{parse_time, DateWindow};
use calendar_engine::{
    expand, find_overlaps, interval_options, materialize, search_events, to_rrule,
    validate_time_range, CalendarConfig, CalendarView, Event, RepeatInterval, RepeatType,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "calendar",
    version,
    about = "Recurrence expansion, overlap checks and notifications for calendar events"
)]
struct Cli {
    /// TOML config file (timezone, week start, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the dates a repeat rule produces within a window
    Expand {
        #[command(flatten)]
        rule: RuleArgs,
        /// First day of the window (defaults to the anchor date)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day of the window
        #[arg(long)]
        to: NaiveDate,
    },
    /// Show the interval choices offered for a date and repeat type
    Options {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long = "type")]
        repeat_type: RepeatType,
    },
    /// Check a start/end time pair
    Validate {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// List events from a file that overlap a proposed time slot
    Overlaps {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, value_parser = parse_hhmm)]
        start: NaiveTime,
        #[arg(long, value_parser = parse_hhmm)]
        end: NaiveTime,
        /// Id of the event being edited, excluded from the comparison
        #[arg(long)]
        editing_id: Option<String>,
    },
    /// Materialise every occurrence of the events in a window
    Occurrences {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Evaluate one notification tick
    Notify {
        #[arg(long)]
        events: PathBuf,
        /// Evaluation instant (RFC 3339); defaults to the system clock
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Search events visible in a week or month view
    Search {
        #[arg(long)]
        events: PathBuf,
        #[arg(long, default_value = "")]
        term: String,
        #[arg(long, default_value = "month", value_parser = parse_view)]
        view: CalendarView,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Render a repeat rule as an iCalendar RRULE block
    Rrule {
        #[command(flatten)]
        rule: RuleArgs,
    },
    /// List the selectable notification lead times
    LeadTimes,
}

#[derive(Args)]
struct RuleArgs {
    /// Anchor date
    #[arg(long)]
    date: NaiveDate,
    #[arg(long = "type")]
    repeat_type: RepeatType,
    #[arg(long, default_value = "same_date")]
    interval: RepeatInterval,
    /// Inclusive repeat end date
    #[arg(long)]
    until: Option<NaiveDate>,
}

impl RuleArgs {
    fn repeat(&self) -> RepeatInfo {
        RepeatInfo {
            repeat_type: self.repeat_type,
            interval: self.interval,
            end_date: self.until,
        }
    }
}

fn parse_hhmm(s: &str) -> Result<NaiveTime, String> {
    parse_time(s).map_err(|e| e.to_string())
}

fn parse_view(s: &str) -> Result<CalendarView, String> {
    match s.to_lowercase().as_str() {
        "week" => Ok(CalendarView::Week),
        "month" => Ok(CalendarView::Month),
        other => Err(format!("unknown view '{other}', expected 'week' or 'month'")),
    }
}

fn load_config(path: Option<&Path>) -> Result<CalendarConfig> {
    match path {
        Some(path) => CalendarConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(CalendarConfig::default()),
    }
}

fn load_events(path: &Path) -> Result<Vec<Event>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse events from {}", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(
        timezone = %config.timezone,
        week_start = ?config.week_start,
        "configuration loaded"
    );

    match cli.command {
        Command::Expand { rule, from, to } => {
            let window = DateWindow::new(from.unwrap_or(rule.date), to);
            let dates: Vec<NaiveDate> = expand(rule.date, &rule.repeat(), window).collect();
            print_json(&dates)
        }
        Command::Options { date, repeat_type } => {
            print_json(&interval_options(Some(date), repeat_type))
        }
        Command::Validate { start, end } => {
            let errors = validate_time_range(&start, &end);
            print_json(&errors)?;
            if !errors.is_valid() {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Overlaps {
            events,
            date,
            start,
            end,
            editing_id,
        } => {
            let events = load_events(&events)?;
            let form = EventForm {
                title: String::new(),
                date,
                start_time: start,
                end_time: end,
                description: String::new(),
                location: String::new(),
                category: String::new(),
                repeat: RepeatInfo::none(),
                notification_time: config.default_notification_minutes,
            };
            let candidate = Candidate {
                form: &form,
                editing_id: editing_id.as_deref(),
            };
            print_json(&find_overlaps(&candidate, &events))
        }
        Command::Occurrences { events, from, to } => {
            let events = load_events(&events)?;
            let occurrences: Vec<Event> = materialize(&events, DateWindow::new(from, to))
                .iter()
                .map(|o| o.to_event())
                .collect();
            print_json(&occurrences)
        }
        Command::Notify { events, now } => {
            let events = load_events(&events)?;
            let now = now.unwrap_or_else(|| SystemClock.now());
            let mut scheduler = config.scheduler()?;
            print_json(&scheduler.tick(now, &events))
        }
        Command::Search {
            events,
            term,
            view,
            date,
        } => {
            let events = load_events(&events)?;
            let window = view_window(view, date, config.week_start);
            let found = search_events(&events, &term, view, date, config.week_start);
            print_json(&json!({
                "window": window,
                "events": found,
            }))
        }
        Command::Rrule { rule } => {
            match to_rrule(rule.date, &rule.repeat())? {
                Some(block) => println!("{block}"),
                None => println!("(no recurrence)"),
            }
            Ok(())
        }
        Command::LeadTimes => print_json(&NOTIFICATION_OPTIONS),
    }
}
