// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recently used search terms, persisted in their own slot.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::error::CalendarResult;
use crate::storage::{Listener, ListenerId, Storage, StorageChange};

/// The default slot holding the search history.
pub const SEARCH_HISTORY_KEY: &str = "calendar-search-history";

/// Number of terms kept.
pub const MAX_SEARCH_HISTORY: usize = 10;

/// One consumer's view of the search history, newest term first.
#[derive(Debug)]
pub struct SearchHistory {
    storage: Arc<dyn Storage>,
    key: String,
    terms: Arc<RwLock<Vec<String>>>,
    listener: ListenerId,
}

impl SearchHistory {
    /// Loads the history stored under `key`; a missing or malformed slot is empty.
    #[tracing::instrument(skip(storage))]
    pub fn open(storage: Arc<dyn Storage>, key: &str) -> CalendarResult<Self> {
        let terms = storage
            .get(key)?
            .and_then(|raw| parse_terms(key, &raw))
            .unwrap_or_default();
        tracing::debug!(count = terms.len(), "search history opened");

        let terms = Arc::new(RwLock::new(terms));
        let listener = storage.subscribe(follow(key.to_string(), Arc::downgrade(&terms)));
        Ok(Self {
            storage,
            key: key.to_string(),
            terms,
            listener,
        })
    }

    /// The remembered terms, newest first.
    pub fn terms(&self) -> Vec<String> {
        self.terms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Moves `term` to the front, dropping the oldest beyond the limit.
    ///
    /// Blank terms are ignored and nothing is written.
    pub fn add(&self, term: &str) -> CalendarResult<()> {
        if term.trim().is_empty() {
            return Ok(());
        }
        let mut next = vec![term.to_string()];
        next.extend(self.terms().into_iter().filter(|t| t != term));
        next.truncate(MAX_SEARCH_HISTORY);
        self.commit(next)
    }

    /// Forgets every term.
    pub fn clear(&self) -> CalendarResult<()> {
        self.commit(Vec::new())
    }

    fn commit(&self, next: Vec<String>) -> CalendarResult<()> {
        let raw = serde_json::to_string(&next)?;
        self.storage.set(&self.key, &raw)?;
        *self.terms.write().unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }
}

impl Drop for SearchHistory {
    fn drop(&mut self) {
        self.storage.unsubscribe(self.listener);
    }
}

fn follow(key: String, terms: Weak<RwLock<Vec<String>>>) -> Listener {
    Arc::new(move |change: &StorageChange| {
        if change.key != key {
            return;
        }
        let (Some(raw), Some(terms)) = (&change.new_value, terms.upgrade()) else {
            return;
        };
        if let Some(next) = parse_terms(&key, raw) {
            *terms.write().unwrap_or_else(PoisonError::into_inner) = next;
        }
    })
}

fn parse_terms(key: &str, raw: &str) -> Option<Vec<String>> {
    match serde_json::from_str(raw) {
        Ok(terms) => Some(terms),
        Err(err) => {
            tracing::error!(key, %err, "failed to parse search history");
            None
        }
    }
}
