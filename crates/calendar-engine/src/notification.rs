//! Lead-time notifications.
//!
//! Each occurrence moves `PENDING -> FIRED` exactly once: it fires on the
//! first tick where `start - lead <= now < start`, and is skipped on every
//! later tick. Fired state is only cleared by [`NotificationScheduler::reset`],
//! which callers invoke when the event set is replaced. Dismissing a
//! notification from the [`NotificationCenter`] does not touch fired state.
//!
//! Wall-clock event times are interpreted in the scheduler's timezone. "Now"
//! always comes from the caller (directly or through a [`Clock`]).

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::collection::EventCollection;
use crate::model::{Event, Notification, Occurrence, OccurrenceKey};
use crate::recurrence::occurrences_of;
use crate::temporal::{local_instant, DateWindow};

// ── Clock ───────────────────────────────────────────────────────────────────

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the OS clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ── Lead-time options ───────────────────────────────────────────────────────

/// A selectable notification lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeadTimeOption {
    pub minutes: u32,
    pub label: &'static str,
}

pub const NOTIFICATION_OPTIONS: [LeadTimeOption; 5] = [
    LeadTimeOption { minutes: 1, label: "1분 전" },
    LeadTimeOption { minutes: 10, label: "10분 전" },
    LeadTimeOption { minutes: 60, label: "1시간 전" },
    LeadTimeOption { minutes: 120, label: "2시간 전" },
    LeadTimeOption { minutes: 1440, label: "1일 전" },
];

pub fn notification_message(lead_minutes: u32, title: &str) -> String {
    format!("{lead_minutes}분 후 {title} 일정이 시작됩니다.")
}

// ── Scheduler ───────────────────────────────────────────────────────────────

/// Tracks which occurrences have fired and decides which fire next.
#[derive(Debug, Clone)]
pub struct NotificationScheduler {
    tz: Tz,
    fired: HashSet<OccurrenceKey>,
    seen_revision: Option<u64>,
}

impl NotificationScheduler {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            fired: HashSet::new(),
            seen_revision: None,
        }
    }

    /// Return every occurrence to `PENDING`.
    pub fn reset(&mut self) {
        self.fired.clear();
    }

    pub fn is_fired(&self, key: &OccurrenceKey) -> bool {
        self.fired.contains(key)
    }

    /// Evaluate one tick at `now` against `events`.
    pub fn tick(&mut self, now: DateTime<Utc>, events: &[Event]) -> Vec<Notification> {
        self.prune(now);
        let mut fired = Vec::new();

        for event in events {
            let lead = Duration::minutes(event.form.notification_time as i64);
            let window = self.candidate_window(now, lead);

            for occurrence in occurrences_of(event, window) {
                if let Some(notification) = self.evaluate(now, lead, occurrence) {
                    fired.push(notification);
                }
            }
        }

        debug!(
            now = %now,
            events = events.len(),
            fired = fired.len(),
            "notification tick"
        );
        fired
    }

    /// Like [`tick`](Self::tick), resetting first if `collection` was replaced
    /// since the previous call.
    pub fn tick_collection(
        &mut self,
        now: DateTime<Utc>,
        collection: &EventCollection,
    ) -> Vec<Notification> {
        if self.seen_revision != Some(collection.revision()) {
            if self.seen_revision.is_some() {
                self.reset();
            }
            self.seen_revision = Some(collection.revision());
        }
        self.tick(now, collection.events())
    }

    /// Local days on which an occurrence could start within `(now, now + lead]`.
    /// Padded by a day on each side for zone offsets.
    fn candidate_window(&self, now: DateTime<Utc>, lead: Duration) -> DateWindow {
        let today = now.with_timezone(&self.tz).date_naive();
        let horizon = (now + lead).with_timezone(&self.tz).date_naive();
        DateWindow::new(
            today.pred_opt().unwrap_or(today),
            horizon.succ_opt().unwrap_or(horizon),
        )
    }

    /// Forget occurrences dated before any day that can still fire.
    fn prune(&mut self, now: DateTime<Utc>) {
        let earliest = self.candidate_window(now, Duration::zero()).start;
        self.fired.retain(|key| key.date >= earliest);
    }

    fn evaluate(
        &mut self,
        now: DateTime<Utc>,
        lead: Duration,
        occurrence: Occurrence<'_>,
    ) -> Option<Notification> {
        let start = local_instant(occurrence.date, occurrence.event.form.start_time, &self.tz)?;
        if now < start - lead || now >= start {
            return None;
        }

        let key = occurrence.key();
        if !self.fired.insert(key.clone()) {
            return None;
        }

        let event = occurrence.event;
        info!(event_id = %event.id, occurrence = %key, "notification fired");
        Some(Notification {
            id: key.to_string(),
            message: notification_message(event.form.notification_time, event.title()),
        })
    }
}

// ── Active notifications ────────────────────────────────────────────────────

/// The notifications currently shown to the user.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    active: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.active.push(notification);
    }

    /// Remove the notification with `id`. Returns whether one was removed.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Extend<Notification> for NotificationCenter {
    fn extend<I: IntoIterator<Item = Notification>>(&mut self, iter: I) {
        self.active.extend(iter);
    }
}

// ── Tick loop ───────────────────────────────────────────────────────────────

/// Tick `scheduler` every `period` until `sink`'s receiver is dropped.
///
/// A new value on `events` means the event set was replaced, so fired state
/// is reset before evaluating it.
pub async fn run_notification_loop<C: Clock>(
    clock: C,
    mut scheduler: NotificationScheduler,
    mut events: watch::Receiver<Vec<Event>>,
    sink: mpsc::UnboundedSender<Notification>,
    period: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if sink.is_closed() {
            debug!("notification receiver dropped, stopping loop");
            return;
        }

        if events.has_changed().unwrap_or(false) {
            scheduler.reset();
        }
        let due = {
            let snapshot = events.borrow_and_update();
            scheduler.tick(clock.now(), &snapshot)
        };

        for notification in due {
            if sink.send(notification).is_err() {
                return;
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
