// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The persisted event collection.
//!
//! The whole collection lives in one storage slot as a JSON array. Every
//! mutation writes a full snapshot, and the in-memory copy is replaced only
//! after the write succeeded. Consumers sharing a medium converge on the
//! latest snapshot through the medium's change feed.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{CalendarError, CalendarResult};
use crate::event::{Event, EventDraft, EventPatch};
use crate::storage::{Listener, ListenerId, Storage, StorageChange};

/// The default slot holding the event collection.
pub const DEFAULT_STORAGE_KEY: &str = "calendar-events";

const MAX_ID_ATTEMPTS: usize = 16;

/// One consumer's view of the persisted event collection.
#[derive(Debug)]
pub struct EventStore {
    storage: Arc<dyn Storage>,
    key: String,
    snapshot: Arc<RwLock<Snapshot>>,
    listener: ListenerId,
}

/// The parsed content of a slot.
///
/// Records that do not describe a valid event are kept verbatim so that
/// writes carry them along instead of dropping them.
#[derive(Debug, Default)]
struct Snapshot {
    events: Vec<Event>,
    unreadable: Vec<Value>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Record<'a> {
    Event(&'a Event),
    Raw(&'a Value),
}

impl EventStore {
    /// Loads the collection stored under `key` and starts following changes.
    ///
    /// A missing slot is an empty collection. So is a malformed one, which is
    /// logged and left on the medium until the next write replaces it.
    /// Individual records that fail to parse are logged and skipped.
    #[tracing::instrument(skip(storage))]
    pub fn open(storage: Arc<dyn Storage>, key: &str) -> CalendarResult<Self> {
        let snapshot = match storage.get(key)? {
            Some(raw) => parse_snapshot(key, &raw).unwrap_or_default(),
            None => Snapshot::default(),
        };
        tracing::info!(
            count = snapshot.events.len(),
            unreadable = snapshot.unreadable.len(),
            "event store opened"
        );

        let snapshot = Arc::new(RwLock::new(snapshot));
        let listener = storage.subscribe(follow(key.to_string(), Arc::downgrade(&snapshot)));
        Ok(Self {
            storage,
            key: key.to_string(),
            snapshot,
            listener,
        })
    }

    /// The slot this store persists to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// A copy of every stored event, in insertion order.
    pub fn read_all(&self) -> Vec<Event> {
        self.read().events.clone()
    }

    /// The stored event with `id`.
    pub fn get(&self, id: &str) -> Option<Event> {
        self.read().events.iter().find(|e| e.id == id).cloned()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.read().events.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.read().events.is_empty()
    }

    /// Number of stored records that could not be read as events.
    pub fn unreadable_len(&self) -> usize {
        self.read().unreadable.len()
    }

    /// Persists a new event built from `draft` and returns it.
    ///
    /// The draft is stored as given; validation is the caller's concern.
    #[tracing::instrument(skip_all, fields(title = %draft.title))]
    pub fn create(&self, draft: EventDraft) -> CalendarResult<Event> {
        let mut next = self.read_all();
        let id = generate_id(&next)?;
        let event = draft.into_event(id, Utc::now());
        next.push(event.clone());

        self.commit(next)?;
        tracing::debug!(id = %event.id, "event created");
        Ok(event)
    }

    /// Merges `patch` into the event with `id` and refreshes its update time.
    ///
    /// Returns `None` when no such event exists, in which case nothing is written.
    #[tracing::instrument(skip(self, patch))]
    pub fn update(&self, id: &str, patch: &EventPatch) -> CalendarResult<Option<Event>> {
        let mut next = self.read_all();
        let Some(event) = next.iter_mut().find(|e| e.id == id) else {
            tracing::debug!("no event to update");
            return Ok(None);
        };
        patch.apply_to(event);
        event.updated_at = Utc::now().max(event.updated_at);
        let updated = event.clone();

        self.commit(next)?;
        tracing::debug!("event updated");
        Ok(Some(updated))
    }

    /// Removes the event with `id`. Returns whether it existed.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, id: &str) -> CalendarResult<bool> {
        let mut next = self.read_all();
        let before = next.len();
        next.retain(|e| e.id != id);
        if next.len() == before {
            tracing::debug!("no event to delete");
            return Ok(false);
        }

        self.commit(next)?;
        tracing::debug!("event deleted");
        Ok(true)
    }

    /// Removes every event, unreadable records included.
    #[tracing::instrument(skip(self))]
    pub fn clear(&self) -> CalendarResult<()> {
        self.write_snapshot(Snapshot::default())?;
        tracing::info!("all events cleared");
        Ok(())
    }

    /// Writes `events` together with the unreadable records, then adopts them.
    fn commit(&self, events: Vec<Event>) -> CalendarResult<()> {
        let unreadable = self.read().unreadable.clone();
        self.write_snapshot(Snapshot { events, unreadable })
    }

    /// The lock is not held across the write: the medium notifies this
    /// store's own listener synchronously.
    fn write_snapshot(&self, next: Snapshot) -> CalendarResult<()> {
        let records: Vec<Record<'_>> = next
            .events
            .iter()
            .map(Record::Event)
            .chain(next.unreadable.iter().map(Record::Raw))
            .collect();
        let raw = serde_json::to_string(&records)?;
        self.storage.set(&self.key, &raw)?;
        *self.write() = next;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for EventStore {
    fn drop(&mut self) {
        self.storage.unsubscribe(self.listener);
    }
}

/// Builds the listener that adopts snapshots written by other consumers.
fn follow(key: String, snapshot: Weak<RwLock<Snapshot>>) -> Listener {
    Arc::new(move |change: &StorageChange| {
        if change.key != key {
            return;
        }
        let Some(raw) = &change.new_value else {
            return;
        };
        let Some(snapshot) = snapshot.upgrade() else {
            return;
        };
        if let Some(next) = parse_snapshot(&key, raw) {
            tracing::debug!(key = %key, count = next.events.len(), "adopting external snapshot");
            *snapshot.write().unwrap_or_else(PoisonError::into_inner) = next;
        }
    })
}

/// Parses a slot holding a JSON array of event records.
///
/// `None` when the slot is not an array at all. Records that are not valid
/// events are set aside one by one.
fn parse_snapshot(key: &str, raw: &str) -> Option<Snapshot> {
    let records: Vec<Value> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(err) => {
            tracing::error!(key, %err, "failed to parse stored events");
            return None;
        }
    };

    let mut snapshot = Snapshot::default();
    for record in records {
        match Event::deserialize(&record) {
            Ok(event) => snapshot.events.push(event),
            Err(err) => {
                let id = record.get("id").and_then(Value::as_str).unwrap_or("?");
                tracing::warn!(key, id, %err, "skipping unreadable event record");
                snapshot.unreadable.push(record);
            }
        }
    }
    Some(snapshot)
}

/// A time-ordered random id not yet used in `existing`.
fn generate_id(existing: &[Event]) -> CalendarResult<String> {
    unused_id(existing, || Uuid::now_v7().to_string())
}

fn unused_id(existing: &[Event], mut candidate: impl FnMut() -> String) -> CalendarResult<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = candidate();
        if !existing.iter().any(|e| e.id == id) {
            return Ok(id);
        }
        tracing::warn!(%id, "generated id already in use, retrying");
    }
    Err(CalendarError::IdGeneration(format!(
        "no unused id after {MAX_ID_ATTEMPTS} attempts"
    )))
}
