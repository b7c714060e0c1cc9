//! Sweep controller for counted entities
//!
//! Entities that are done are retired into a graveyard rather than released
//! on the spot. The controller decides when to sweep it, based on checks that
//! read the counter once and return; nothing here waits for the count to
//! change.

use crate::counter::{LiveCounter, Pressure};
use crate::disposable::Disposable;
use crate::releasable::Releasable;
use reclaim_config::ReclaimConfig;
use reclaim_core::ResourceId;
use reclaim_utils::cleanup::ReclamationRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns a set of tracked entities and sweeps the retired ones
pub struct Population<R: Releasable> {
    counter: Arc<LiveCounter>,
    registry: Arc<ReclamationRegistry>,
    threshold: usize,
    live: HashMap<ResourceId, Disposable<R>>,
    graveyard: Vec<Disposable<R>>,
}

impl<R: Releasable> Population<R> {
    /// Create a population with its own counter
    pub fn new(threshold: usize) -> Self {
        Self::with_counter(Arc::new(LiveCounter::new()), threshold)
    }

    /// Create a population counting into `counter`
    pub fn with_counter(counter: Arc<LiveCounter>, threshold: usize) -> Self {
        Self {
            counter,
            registry: ReclamationRegistry::global(),
            threshold,
            live: HashMap::new(),
            graveyard: Vec::new(),
        }
    }

    /// Create a population counting into the process-wide counter
    pub fn from_config(config: &ReclaimConfig) -> Self {
        Self::with_counter(LiveCounter::global(), config.live_threshold)
    }

    /// Register admitted entities' fallbacks in `registry`
    pub fn with_registry(mut self, registry: Arc<ReclamationRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Wrap and count a new entity
    pub fn admit(&mut self, resource: R) -> ResourceId {
        let entity = Disposable::builder(resource)
            .counter(Arc::clone(&self.counter))
            .pressure_threshold(self.threshold)
            .registry(Arc::clone(&self.registry))
            .build();
        let id = entity.id();
        self.live.insert(id, entity);
        id
    }

    pub fn get(&self, id: ResourceId) -> Option<&Disposable<R>> {
        self.live.get(&id)
    }

    /// Move an entity to the graveyard without releasing it
    pub fn retire(&mut self, id: ResourceId) -> bool {
        match self.live.remove(&id) {
            Some(entity) => {
                self.graveyard.push(entity);
                true
            }
            None => false,
        }
    }

    /// Entities not yet retired
    pub fn population(&self) -> usize {
        self.live.len()
    }

    pub fn graveyard_len(&self) -> usize {
        self.graveyard.len()
    }

    /// Entities whose resource has not been released, retired or not
    pub fn live(&self) -> usize {
        self.counter.live()
    }

    pub fn pressure(&self) -> Pressure {
        self.counter.check_pressure(self.threshold)
    }

    /// Bounded check: too many retired entities, or a fallback asked for a sweep
    pub fn needs_sweep(&self) -> bool {
        self.graveyard.len() > self.threshold || self.counter.sweep_requested()
    }

    /// Release every retired entity through the owner path.
    ///
    /// Returns how many releases this sweep performed; entities already
    /// reclaimed by a fallback are dropped without being counted.
    pub fn sweep(&mut self) -> usize {
        self.counter.take_sweep_request();
        let released = self
            .graveyard
            .drain(..)
            .filter(|entity| entity.release())
            .count();
        if released > 0 {
            tracing::debug!(released, live = self.counter.live(), "swept graveyard");
        }
        released
    }

    /// Retire everything and sweep
    pub fn release_all(&mut self) -> usize {
        let ids: Vec<ResourceId> = self.live.keys().copied().collect();
        for id in ids {
            self.retire(id);
        }
        self.sweep()
    }
}
