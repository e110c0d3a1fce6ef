//! The canonical event list.
//!
//! Single writer: the list is only ever replaced wholesale, after a load
//! or save, and every replacement bumps [`EventCollection::revision`].

use crate::model::{Event, Occurrence};
use crate::recurrence::materialize;
use crate::temporal::DateWindow;

#[derive(Debug, Clone, Default)]
pub struct EventCollection {
    events: Vec<Event>,
    revision: u64,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Replace the whole list with a freshly loaded snapshot.
    pub fn replace(&mut self, events: Vec<Event>) {
        self.events = events;
        self.revision += 1;
    }

    /// Number of replacements so far; changes whenever the list does.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Occurrences of every event inside `window`, for rendering.
    pub fn occurrences(&self, window: DateWindow) -> Vec<Occurrence<'_>> {
        materialize(&self.events, window)
    }
}
