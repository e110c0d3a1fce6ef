//! Two-step save protocol for the event draft.
//!
//! [`propose_save`] validates the draft and checks it against the current
//! collection snapshot. Overlaps are a prompt, not an error: the caller shows
//! them and, if the user proceeds, calls [`confirm_save`]. A clear proposal
//! is saved the same way. [`submit`] chains the two for the common case.
//!
//! A failed save leaves the draft untouched so the user can resubmit. A save
//! whose reload fails still resets the draft, so a retry cannot store the
//! event twice.

use tracing::{info, warn};

use crate::collection::EventCollection;
use crate::error::{Result, ValidationError};
use crate::form::EventFormState;
use crate::model::{Candidate, Event, EventForm};
use crate::overlap::find_overlaps;
use crate::store::EventStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal {
    /// Nothing conflicts; safe to save.
    Clear(EventForm),
    /// The draft overlaps these events; saving needs explicit confirmation.
    Overlapping { form: EventForm, overlaps: Vec<Event> },
}

impl Proposal {
    pub fn overlaps(&self) -> &[Event] {
        match self {
            Proposal::Clear(_) => &[],
            Proposal::Overlapping { overlaps, .. } => overlaps,
        }
    }
}

/// Validate `draft` and find overlaps against `collection`.
pub fn propose_save(
    draft: &EventFormState,
    collection: &EventCollection,
) -> std::result::Result<Proposal, ValidationError> {
    let form = draft.to_form()?;
    let candidate = Candidate {
        form: &form,
        editing_id: draft.editing_id(),
    };
    let overlaps: Vec<Event> = find_overlaps(&candidate, collection.events())
        .into_iter()
        .cloned()
        .collect();

    if overlaps.is_empty() {
        Ok(Proposal::Clear(form))
    } else {
        Ok(Proposal::Overlapping { form, overlaps })
    }
}

/// Persist `draft`, reset it, then reload `collection`.
///
/// Creates a new event unless the draft is editing one, in which case that
/// event is updated. Once the store accepts the write the draft is reset,
/// even if the reload that follows fails.
pub async fn confirm_save<S: EventStore>(
    store: &S,
    draft: &mut EventFormState,
    collection: &mut EventCollection,
) -> Result<Event> {
    let form = draft.to_form()?;

    let saved = match draft.editing_id() {
        Some(id) => store.update(id, form).await,
        None => store.create(form).await,
    };
    let saved = match saved {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "failed to save event");
            return Err(err);
        }
    };
    info!(event_id = %saved.id, title = %saved.title(), "event saved");

    draft.reset();
    reload(store, collection).await?;
    Ok(saved)
}

/// Result of a one-shot [`submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved(Event),
    NeedsConfirmation(Vec<Event>),
}

/// Save immediately when nothing overlaps; otherwise report the overlaps
/// and leave the draft for [`confirm_save`].
pub async fn submit<S: EventStore>(
    store: &S,
    draft: &mut EventFormState,
    collection: &mut EventCollection,
) -> Result<SubmitOutcome> {
    match propose_save(draft, collection)? {
        Proposal::Clear(_) => Ok(SubmitOutcome::Saved(
            confirm_save(store, draft, collection).await?,
        )),
        Proposal::Overlapping { overlaps, .. } => Ok(SubmitOutcome::NeedsConfirmation(overlaps)),
    }
}

/// Replace `collection` with the store's current list.
pub async fn reload<S: EventStore>(store: &S, collection: &mut EventCollection) -> Result<()> {
    let events = store.list().await.inspect_err(|err| {
        warn!(error = %err, "failed to load events");
    })?;
    collection.replace(events);
    Ok(())
}

/// Delete event `id` and reload `collection`.
pub async fn delete_event<S: EventStore>(
    store: &S,
    collection: &mut EventCollection,
    id: &str,
) -> Result<()> {
    if let Err(err) = store.delete(id).await {
        warn!(event_id = %id, error = %err, "failed to delete event");
        return Err(err);
    }
    info!(event_id = %id, "event deleted");
    reload(store, collection).await
}
