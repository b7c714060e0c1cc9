//! Registry of fallback release callbacks
//!
//! Every wrapped resource registers a callback here when it is created and
//! disarms it when its owner releases it. Whatever is still armed when the
//! process is torn down gets run by `reclaim_all`.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, TryLockError, Weak};

/// Process-wide registry used by resources that do not name their own
static GLOBAL_REGISTRY: Lazy<Arc<ReclamationRegistry>> =
    Lazy::new(|| Arc::new(ReclamationRegistry::default()));

/// A callback waiting to release a resource
struct FallbackEntry {
    description: String,
    callback: Box<dyn FnOnce() + Send>,
}

#[derive(Default)]
struct RegistryInner {
    entries: HashMap<u64, FallbackEntry>,
    next_id: u64,
}

/// Registry for tracking fallback releases that have not run yet
#[derive(Default)]
pub struct ReclamationRegistry {
    inner: Mutex<RegistryInner>,
}

impl ReclamationRegistry {
    /// Create an isolated registry
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The process-wide registry drained by the signal and panic hooks
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Register a fallback callback.
    ///
    /// The callback runs at most once, and only if the returned
    /// `Registration` is still armed when `reclaim_all` is called.
    pub fn register<F>(self: &Arc<Self>, description: impl Into<String>, callback: F) -> Registration
    where
        F: FnOnce() + Send + 'static,
    {
        let description = description.into();
        let id = match self.inner.lock() {
            Ok(mut inner) => {
                let id = inner.next_id;
                inner.next_id += 1;
                inner.entries.insert(
                    id,
                    FallbackEntry {
                        description: description.clone(),
                        callback: Box::new(callback),
                    },
                );
                Some(id)
            }
            Err(e) => {
                log::error!("Failed to lock reclamation registry: {e}");
                None
            }
        };

        Registration {
            registry: Arc::downgrade(self),
            id,
            description,
        }
    }

    /// Remove a registration without running it
    fn unregister(&self, id: u64) -> bool {
        match self.inner.lock() {
            Ok(mut inner) => inner.entries.remove(&id).is_some(),
            Err(e) => {
                log::error!("Failed to lock reclamation registry for unregister: {e}");
                false
            }
        }
    }

    fn contains(&self, id: u64) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.entries.contains_key(&id))
            .unwrap_or(false)
    }

    /// Number of callbacks still armed
    pub fn pending(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.entries.len())
            .unwrap_or(0)
    }

    /// Run every armed callback and return how many ran.
    ///
    /// Callbacks run after the registry lock is released, so a callback may
    /// itself register or unregister.
    pub fn reclaim_all(&self) -> usize {
        let drained = match self.inner.lock() {
            Ok(mut inner) => drain(&mut inner),
            Err(e) => {
                log::error!("Failed to lock reclamation registry for reclaim_all: {e}");
                return 0;
            }
        };
        run(drained)
    }

    /// Like `reclaim_all`, but gives up instead of waiting for the lock.
    ///
    /// Returns `None` when another thread holds the registry. Used from the
    /// panic hook, where the panicking thread may be the one holding it.
    pub fn try_reclaim_all(&self) -> Option<usize> {
        let drained = match self.inner.try_lock() {
            Ok(mut inner) => drain(&mut inner),
            Err(TryLockError::WouldBlock) => return None,
            Err(TryLockError::Poisoned(e)) => {
                log::error!("Reclamation registry poisoned: {e}");
                return None;
            }
        };
        Some(run(drained))
    }
}

fn drain(inner: &mut RegistryInner) -> Vec<FallbackEntry> {
    inner.entries.drain().map(|(_, entry)| entry).collect()
}

fn run(entries: Vec<FallbackEntry>) -> usize {
    let count = entries.len();
    for entry in entries {
        log::debug!("Fallback reclamation: {}", entry.description);
        (entry.callback)();
    }
    count
}

/// Handle to an armed fallback callback.
///
/// Dropping it or calling `disarm` removes the callback without running it.
pub struct Registration {
    registry: Weak<ReclamationRegistry>,
    id: Option<u64>,
    description: String,
}

impl Registration {
    /// Remove the callback without running it. Returns whether it was still armed.
    pub fn disarm(&mut self) -> bool {
        match (self.id.take(), self.registry.upgrade()) {
            (Some(id), Some(registry)) => registry.unregister(id),
            _ => false,
        }
    }

    /// Whether the callback is still waiting in its registry
    pub fn is_armed(&self) -> bool {
        match (self.id, self.registry.upgrade()) {
            (Some(id), Some(registry)) => registry.contains(id),
            _ => false,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}
