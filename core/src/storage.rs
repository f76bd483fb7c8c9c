// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Textual key-value media backing the event store.
//!
//! A medium holds named slots of text. Every write is announced on the
//! medium's change feed so that any number of consumers sharing it can pick
//! up each other's snapshots. File media opened on the same directory share
//! a feed, and changes made by other processes reach it through a watcher.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{CalendarError, CalendarResult};

/// Handle returned by [`Storage::subscribe`].
pub type ListenerId = u64;

/// Callback invoked for every change on a medium.
pub type Listener = Arc<dyn Fn(&StorageChange) + Send + Sync>;

/// A change to one slot of a medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// The slot that changed.
    pub key: String,

    /// The new content, `None` when the slot was removed.
    pub new_value: Option<String>,
}

/// A textual key-value medium with change notifications.
pub trait Storage: Send + Sync + fmt::Debug {
    /// Reads a slot, `None` if it does not exist.
    fn get(&self, key: &str) -> CalendarResult<Option<String>>;

    /// Replaces the content of a slot and notifies subscribers.
    fn set(&self, key: &str, value: &str) -> CalendarResult<()>;

    /// Removes a slot and notifies subscribers. Missing slots are ignored.
    fn remove(&self, key: &str) -> CalendarResult<()>;

    /// Registers a listener for changes on any slot.
    fn subscribe(&self, listener: Listener) -> ListenerId;

    /// Drops a listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: ListenerId);
}

/// Listener registry shared by every clone of a medium handle.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    inner: Arc<RwLock<FeedInner>>,
}

#[derive(Default)]
struct FeedInner {
    next: ListenerId,
    listeners: Vec<(ListenerId, Listener)>,
}

impl ChangeFeed {
    /// Registers a listener.
    pub fn subscribe(&self, listener: Listener) -> ListenerId {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = inner.next;
        inner.next += 1;
        inner.listeners.push((id, listener));
        id
    }

    /// Drops a listener.
    pub fn unsubscribe(&self, id: ListenerId) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.listeners.retain(|(i, _)| *i != id);
    }

    /// Delivers `change` to every listener.
    pub fn publish(&self, change: &StorageChange) {
        // Listeners run without the registry lock held so they may (un)subscribe.
        let listeners: Vec<Listener> = {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        tracing::trace!(key = %change.key, listeners = listeners.len(), "publishing storage change");
        for listener in listeners {
            listener(change);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("listeners", &self.len())
            .finish()
    }
}

/// An in-process medium. Clones share slots and listeners.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<RwLock<HashMap<String, String>>>,
    feed: ChangeFeed,
}

impl MemoryStorage {
    /// Creates an empty medium.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> CalendarResult<Option<String>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CalendarResult<()> {
        {
            let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
            slots.insert(key.to_string(), value.to_string());
        }
        self.feed.publish(&StorageChange {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> CalendarResult<()> {
        let removed = {
            let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
            slots.remove(key).is_some()
        };
        if removed {
            self.feed.publish(&StorageChange {
                key: key.to_string(),
                new_value: None,
            });
        }
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> ListenerId {
        self.feed.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.feed.unsubscribe(id);
    }
}

/// A medium keeping each slot as `<dir>/<key>.json`.
///
/// Every handle opened on the same directory shares one change feed, and a
/// watcher on the directory announces slots rewritten by other processes.
/// Writes go to a temporary sibling first and are renamed into place, so a
/// slot always holds either the old or the new snapshot.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: Arc<PathBuf>,
    shared: Arc<SharedDir>,
}

/// State shared by every handle on one directory.
struct SharedDir {
    feed: ChangeFeed,
    seen: SeenSlots,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl fmt::Debug for SharedDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDir")
            .field("feed", &self.feed)
            .field(
                "watching",
                &self
                    .watcher
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some(),
            )
            .finish()
    }
}

/// Last content announced per slot, so a watcher event for a write already
/// published is not announced twice. Held while announcing, which keeps
/// announcements in write order; listeners must not write to the medium.
type SeenSlots = Arc<Mutex<HashMap<String, Option<String>>>>;

static OPEN_DIRS: LazyLock<Mutex<HashMap<PathBuf, Weak<SharedDir>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

impl FileStorage {
    /// Opens a medium rooted at `dir`, creating the directory if needed.
    ///
    /// Handles opened on the same directory, however it is spelled, share
    /// their listeners.
    pub fn open(dir: impl AsRef<Path>) -> CalendarResult<Self> {
        let dir = dir.as_ref();
        tracing::info!(dir = %dir.display(), "opening file storage");
        std::fs::create_dir_all(dir).map_err(|e| {
            CalendarError::Storage(format!(
                "Failed to create storage directory {}: {e}",
                dir.display()
            ))
        })?;
        let dir = std::fs::canonicalize(dir).map_err(|e| {
            CalendarError::Storage(format!("Failed to resolve {}: {e}", dir.display()))
        })?;

        let mut open_dirs = OPEN_DIRS.lock().unwrap_or_else(PoisonError::into_inner);
        open_dirs.retain(|_, shared| shared.strong_count() > 0);
        let shared = match open_dirs.get(&dir).and_then(Weak::upgrade) {
            Some(shared) => shared,
            None => {
                let shared = Arc::new(share_dir(&dir));
                open_dirs.insert(dir.clone(), Arc::downgrade(&shared));
                shared
            }
        };

        Ok(Self {
            dir: Arc::new(dir),
            shared,
        })
    }

    /// The directory holding the slots.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file backing `key`.
    pub fn slot_path(&self, key: &str) -> CalendarResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(CalendarError::Storage(format!("Invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn seen(&self) -> MutexGuard<'_, HashMap<String, Option<String>>> {
        self.shared.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> CalendarResult<Option<String>> {
        let path = self.slot_path(key)?;
        read_slot(&path)
            .map_err(|e| CalendarError::Storage(format!("Failed to read {}: {e}", path.display())))
    }

    fn set(&self, key: &str, value: &str) -> CalendarResult<()> {
        let path = self.slot_path(key)?;
        let tmp = path.with_extension("json.tmp");
        let mut seen = self.seen();
        std::fs::write(&tmp, value)
            .and_then(|()| std::fs::rename(&tmp, &path))
            .map_err(|e| {
                let _ = std::fs::remove_file(&tmp);
                CalendarError::Storage(format!("Failed to write {}: {e}", path.display()))
            })?;
        seen.insert(key.to_string(), Some(value.to_string()));

        tracing::debug!(path = %path.display(), bytes = value.len(), "slot written");
        self.shared.feed.publish(&StorageChange {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> CalendarResult<()> {
        let path = self.slot_path(key)?;
        let mut seen = self.seen();
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(CalendarError::Storage(format!(
                    "Failed to remove {}: {e}",
                    path.display()
                )));
            }
        }
        seen.insert(key.to_string(), None);
        self.shared.feed.publish(&StorageChange {
            key: key.to_string(),
            new_value: None,
        });
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> ListenerId {
        self.shared.feed.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.shared.feed.unsubscribe(id);
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !key.starts_with('.')
}

/// Reads a slot file. Bytes that are not UTF-8 are replaced rather than
/// rejected, leaving the decision about the content to the reader.
fn read_slot(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(content) => Ok(Some(content)),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "slot is not valid UTF-8");
                Ok(Some(String::from_utf8_lossy(err.as_bytes()).into_owned()))
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Creates the shared state for `dir` and starts watching it.
///
/// A directory that cannot be watched still shares its feed in-process.
fn share_dir(dir: &Path) -> SharedDir {
    let feed = ChangeFeed::default();
    let seen = SeenSlots::default();
    let watcher = match watch_dir(dir, feed.clone(), Arc::clone(&seen)) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "cannot watch storage directory");
            None
        }
    };
    SharedDir {
        feed,
        seen,
        watcher: Mutex::new(watcher),
    }
}

fn watch_dir(dir: &Path, feed: ChangeFeed, seen: SeenSlots) -> notify::Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) => {
                if event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove() {
                    for path in &event.paths {
                        announce_external_change(path, &feed, &seen);
                    }
                }
            }
            Err(err) => tracing::error!(%err, "storage watch error"),
        }
    })?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    tracing::debug!(dir = %dir.display(), "watching storage directory");
    Ok(watcher)
}

/// Publishes the current content of the slot at `path` unless it was
/// already announced.
fn announce_external_change(path: &Path, feed: &ChangeFeed, seen: &SeenSlots) {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return;
    }
    let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
        return;
    };
    if !is_valid_key(key) {
        return;
    }

    let mut seen = seen.lock().unwrap_or_else(PoisonError::into_inner);
    let content = match read_slot(path) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "cannot read changed slot");
            return;
        }
    };
    if seen.get(key) == Some(&content) {
        return;
    }
    seen.insert(key.to_string(), content.clone());

    tracing::debug!(key, "slot changed outside this process");
    feed.publish(&StorageChange {
        key: key.to_string(),
        new_value: content,
    });
}
