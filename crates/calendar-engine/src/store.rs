//! Persistence collaborator interface.
//!
//! The engine treats every call as atomic: it either fully succeeds or
//! leaves the stored list untouched.

use std::sync::Mutex;

use uuid::Uuid;

use crate::error::{CalendarError, Result};
use crate::model::{Event, EventForm};

#[allow(async_fn_in_trait)]
pub trait EventStore {
    async fn list(&self) -> Result<Vec<Event>>;
    async fn create(&self, form: EventForm) -> Result<Event>;
    async fn update(&self, id: &str, form: EventForm) -> Result<Event>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Process-local store assigning random v4 ids.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<Event>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }

    /// Load a store from a JSON array of events.
    pub fn from_json(json: &str) -> Result<Self> {
        let events: Vec<Event> = serde_json::from_str(json)
            .map_err(|e| CalendarError::Persistence(format!("invalid event list: {e}")))?;
        Ok(Self::with_events(events))
    }

    /// Snapshot the store as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&*self.lock()?)
            .map_err(|e| CalendarError::Persistence(e.to_string()))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Event>>> {
        self.events
            .lock()
            .map_err(|_| CalendarError::Persistence("event store lock poisoned".to_string()))
    }
}

impl EventStore for InMemoryEventStore {
    async fn list(&self) -> Result<Vec<Event>> {
        Ok(self.lock()?.clone())
    }

    async fn create(&self, form: EventForm) -> Result<Event> {
        let event = Event::new(Uuid::new_v4().to_string(), form);
        self.lock()?.push(event.clone());
        Ok(event)
    }

    async fn update(&self, id: &str, form: EventForm) -> Result<Event> {
        let mut events = self.lock()?;
        let slot = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| CalendarError::NotFound(id.to_string()))?;
        slot.form = form;
        Ok(slot.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut events = self.lock()?;
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Err(CalendarError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RepeatInfo;
    use crate::temporal::{parse_date, parse_time};

    fn form(title: &str) -> EventForm {
        EventForm {
            title: title.to_string(),
            date: parse_date("2024-10-15").unwrap(),
            start_time: parse_time("09:00").unwrap(),
            end_time: parse_time("10:00").unwrap(),
            description: String::new(),
            location: String::new(),
            category: String::new(),
            repeat: RepeatInfo::none(),
            notification_time: 10,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let store = InMemoryEventStore::new();
        let a = store.create(form("a")).await.unwrap();
        let b = store.create(form("b")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_replaces_fields_in_place() {
        let store = InMemoryEventStore::new();
        let created = store.create(form("a")).await.unwrap();
        let updated = store.update(&created.id, form("renamed")).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(store.list().await.unwrap()[0].title(), "renamed");
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = InMemoryEventStore::new();
        assert!(matches!(
            store.update("missing", form("x")).await,
            Err(CalendarError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("missing").await,
            Err(CalendarError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_json_snapshot_round_trips() {
        let store = InMemoryEventStore::with_events(vec![Event::new("1", form("a"))]);
        let json = store.to_json().unwrap();
        let loaded = InMemoryEventStore::from_json(&json).unwrap();
        assert_eq!(loaded.list().await.unwrap(), store.list().await.unwrap());
        assert!(matches!(
            InMemoryEventStore::from_json("{"),
            Err(CalendarError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_event() {
        let store = InMemoryEventStore::with_events(vec![Event::new("1", form("a"))]);
        store.delete("1").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
