//! Ordered in-memory record store with case-insensitive unique keys.
//!
//! Records live in insertion order. Every record gets a stable [`RecordId`]
//! the UI holds on to as its current selection, and subscribers hear about
//! every successful mutation so derived values like the bill total stay
//! current.

use std::fmt;
use std::mem;

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Records that carry a natural unique key.
pub trait Keyed {
    /// The field that must be unique within a store, compared
    /// case-insensitively.
    fn key(&self) -> &str;
}

/// Store-assigned identity. Ids are never reused within one store, so a stale
/// selection can only ever miss, never hit a different record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

/// What just happened to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Inserted(RecordId),
    Updated(RecordId),
    Deleted(RecordId),
}

/// A borrowed record together with its id.
#[derive(Debug)]
pub struct Entry<'a, T> {
    pub id: RecordId,
    pub record: &'a T,
}

impl<T> Clone for Entry<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Entry<'_, T> {}

type Listener<T> = Box<dyn FnMut(StoreEvent, &RecordStore<T>)>;

pub struct RecordStore<T> {
    entries: Vec<(RecordId, T)>,
    next_id: u64,
    listeners: Vec<Listener<T>>,
}

impl<T> Default for RecordStore<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            listeners: Vec::new(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RecordStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("entries", &self.entries)
            .field("next_id", &self.next_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T: Keyed> RecordStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a callback that runs synchronously after every successful
    /// insert, update or delete. Rejected operations never notify.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(StoreEvent, &RecordStore<T>) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Append a record, rejecting it when its key is already taken.
    pub fn insert(&mut self, record: T) -> StoreResult<RecordId> {
        if let Some(existing) = self.key_owner(record.key(), None) {
            debug!(key = record.key(), ?existing, "insert rejected: duplicate key");
            return Err(StoreError::DuplicateKey {
                key: record.key().to_string(),
            });
        }

        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, record));
        self.notify(StoreEvent::Inserted(id));
        Ok(id)
    }

    /// Replace the fields of an existing record in place. The record keeps
    /// its id and position; only a *different* record sharing the new key
    /// blocks the update.
    pub fn update(&mut self, id: RecordId, record: T) -> StoreResult<()> {
        let position = self.position(id).ok_or(StoreError::NotFound)?;
        if let Some(existing) = self.key_owner(record.key(), Some(id)) {
            debug!(key = record.key(), ?existing, "update rejected: duplicate key");
            return Err(StoreError::DuplicateKey {
                key: record.key().to_string(),
            });
        }

        self.entries[position].1 = record;
        self.notify(StoreEvent::Updated(id));
        Ok(())
    }

    /// Remove a record and hand it back to the caller.
    pub fn delete(&mut self, id: RecordId) -> StoreResult<T> {
        let position = self.position(id).ok_or(StoreError::NotFound)?;
        let (_, record) = self.entries.remove(position);
        self.notify(StoreEvent::Deleted(id));
        Ok(record)
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, record)| record)
    }

    /// Zero-based position of `id` in insertion order.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.entries.iter().position(|(entry_id, _)| *entry_id == id)
    }

    /// Every record in insertion order. The iterator is `Clone`, so callers
    /// can walk it more than once without going back to the store.
    pub fn all(&self) -> impl Iterator<Item = Entry<'_, T>> + Clone + '_ {
        self.entries
            .iter()
            .map(|(id, record)| Entry { id: *id, record })
    }

    /// Records matching `predicate`, lazily and in insertion order.
    pub fn find<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = Entry<'a, T>> + Clone + 'a
    where
        P: Fn(&T) -> bool + Clone + 'a,
    {
        self.all().filter(move |entry| predicate(entry.record))
    }

    fn key_owner(&self, key: &str, ignore: Option<RecordId>) -> Option<RecordId> {
        self.entries
            .iter()
            .filter(|(id, _)| Some(*id) != ignore)
            .find(|(_, record)| keys_match(record.key(), key))
            .map(|(id, _)| *id)
    }

    fn notify(&mut self, event: StoreEvent) {
        let mut listeners = mem::take(&mut self.listeners);
        for listener in listeners.iter_mut() {
            listener(event, self);
        }
        self.listeners = listeners;
    }
}

/// Case-insensitive key comparison shared by every store.
pub fn keys_match(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}
