//! Generic wrapper that releases its resource exactly once
//!
//! A `Disposable` can be released three ways, all funnelled through
//! `Shared::release`:
//!
//! - explicitly by its owner with `release`,
//! - by going out of scope (`Drop`), which performs the same full cleanup,
//! - by the reclamation registry (`release_fallback`), which may run on any
//!   thread at any time and therefore only closes the raw handle. It never
//!   waits for a use in progress.
//!
//! Whichever wins the flag's compare-and-swap does the work; the rest are
//! no-ops.

use crate::counter::LiveCounter;
use crate::flag::ReleaseFlag;
use crate::releasable::Releasable;
use parking_lot::Mutex;
use reclaim_core::{Error, ReleaseTrigger, ResourceId, ResourceState, Result};
use reclaim_utils::cleanup::{ReclamationRegistry, Registration};
use reclaim_utils::tracing::{
    pressure_detected, release_failed, resource_acquired, resource_released, resource_span,
};
use std::fmt;
use std::sync::Arc;

/// State reachable from both the owner and the registry callback
struct Shared<R> {
    id: ResourceId,
    label: String,
    flag: ReleaseFlag,
    slot: Mutex<Option<R>>,
    counter: Option<Arc<LiveCounter>>,
    pressure_threshold: Option<usize>,
}

impl<R: Releasable> Shared<R> {
    fn release(&self, trigger: ReleaseTrigger) -> bool {
        let _span = resource_span(self.id, &self.label).entered();

        let taken = match trigger {
            ReleaseTrigger::Owner => {
                if !self.flag.try_release() {
                    return false;
                }
                // A use in progress holds the slot; wait for it, then nothing else can reach the resource
                self.slot.lock().take()
            }
            ReleaseTrigger::Fallback => {
                // Never wait here. A held slot means a use is in progress, possibly on this
                // very thread, and its owner or drop is left to release.
                let Some(mut slot) = self.slot.try_lock() else {
                    tracing::debug!(resource_id = %self.id, "slot busy, fallback skipped");
                    return false;
                };
                if !self.flag.try_release() {
                    return false;
                }
                slot.take()
            }
        };

        if let Some(mut resource) = taken {
            if trigger.disposes_owned() {
                if let Err(e) = resource.dispose_owned() {
                    release_failed(self.id, &self.label, "dispose_owned", &e);
                }
            }
            if let Err(e) = resource.close() {
                release_failed(self.id, &self.label, "close", &e);
            }
        }

        if let Some(counter) = &self.counter {
            counter.decrement();
            if trigger == ReleaseTrigger::Fallback {
                self.check_pressure(counter);
            }
        }

        resource_released(self.id, &self.label, trigger);
        true
    }

    fn check_pressure(&self, counter: &LiveCounter) {
        let Some(threshold) = self.pressure_threshold else {
            return;
        };
        if counter.check_pressure(threshold).is_over() {
            pressure_detected(counter.live(), threshold);
            counter.request_sweep();
        }
    }
}

/// Builder for `Disposable`
pub struct DisposableBuilder<R: Releasable> {
    resource: R,
    counter: Option<Arc<LiveCounter>>,
    pressure_threshold: Option<usize>,
    registry: Option<Arc<ReclamationRegistry>>,
}

impl<R: Releasable> DisposableBuilder<R> {
    /// Count this resource in `counter` while it is live
    pub fn counter(mut self, counter: Arc<LiveCounter>) -> Self {
        self.counter = Some(counter);
        self
    }

    /// On fallback release, request a sweep when the counter is above `threshold`
    pub fn pressure_threshold(mut self, threshold: usize) -> Self {
        self.pressure_threshold = Some(threshold);
        self
    }

    /// Register the fallback in `registry` instead of the global one
    pub fn registry(mut self, registry: Arc<ReclamationRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Disposable<R> {
        let id = ResourceId::allocate();
        let label = self.resource.label();

        if let Some(counter) = &self.counter {
            counter.increment();
        }

        let shared = Arc::new(Shared {
            id,
            label: label.clone(),
            flag: ReleaseFlag::new(),
            slot: Mutex::new(Some(self.resource)),
            counter: self.counter,
            pressure_threshold: self.pressure_threshold,
        });

        let registry = self.registry.unwrap_or_else(ReclamationRegistry::global);
        let weak = Arc::downgrade(&shared);
        let registration = registry.register(format!("{label} ({id})"), move || {
            if let Some(shared) = weak.upgrade() {
                shared.release(ReleaseTrigger::Fallback);
            }
        });

        resource_acquired(id, &label);

        Disposable {
            shared,
            registration: Mutex::new(Some(registration)),
        }
    }
}

/// Owns one external resource and guarantees it is released exactly once
pub struct Disposable<R: Releasable> {
    shared: Arc<Shared<R>>,
    registration: Mutex<Option<Registration>>,
}

impl<R: Releasable> Disposable<R> {
    /// Wrap an acquired resource, registering its fallback globally
    pub fn new(resource: R) -> Self {
        Self::builder(resource).build()
    }

    /// Wrap a resource counted in `counter` while it is live
    pub fn tracked(resource: R, counter: Arc<LiveCounter>) -> Self {
        Self::builder(resource).counter(counter).build()
    }

    /// Run a fallible acquisition and wrap its result
    pub fn acquire<F>(acquire: F) -> Result<Self>
    where
        F: FnOnce() -> Result<R>,
    {
        Ok(Self::new(acquire()?))
    }

    pub fn builder(resource: R) -> DisposableBuilder<R> {
        DisposableBuilder {
            resource,
            counter: None,
            pressure_threshold: None,
            registry: None,
        }
    }

    /// Run `f` against the live resource.
    ///
    /// Fails with `UseAfterRelease` once any release path has started.
    ///
    /// `f` runs with the resource slot locked. It must not call `release` on
    /// this same wrapper (or drop it), since the owner path waits for that
    /// slot and the lock is not reentrant. A fallback reaching the wrapper
    /// while `f` runs is skipped rather than waiting.
    pub fn use_resource<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut R) -> Result<T>,
    {
        let mut slot = self.shared.slot.lock();
        match slot.as_mut() {
            Some(resource) if !self.shared.flag.is_released() => f(resource),
            _ => Err(Error::use_after_release(&self.shared.label)),
        }
    }

    /// Owner-triggered release: full cleanup, then the fallback is disarmed.
    ///
    /// Returns whether this call performed the release.
    pub fn release(&self) -> bool {
        let released = self.shared.release(ReleaseTrigger::Owner);
        if let Some(mut registration) = self.registration.lock().take() {
            registration.disarm();
        }
        released
    }

    /// Fallback release: closes the handle only, skipping owned objects.
    ///
    /// Returns false without waiting when a use is in progress; the wrapper
    /// stays live for its owner to release.
    pub fn release_fallback(&self) -> bool {
        self.shared.release(ReleaseTrigger::Fallback)
    }

    pub fn state(&self) -> ResourceState {
        self.shared.flag.state()
    }

    pub fn is_released(&self) -> bool {
        self.shared.flag.is_released()
    }

    pub fn id(&self) -> ResourceId {
        self.shared.id
    }

    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Whether a fallback callback is still armed for this resource
    pub fn fallback_armed(&self) -> bool {
        self.registration
            .lock()
            .as_ref()
            .map(Registration::is_armed)
            .unwrap_or(false)
    }
}

impl<R: Releasable> Drop for Disposable<R> {
    fn drop(&mut self) {
        if self.shared.release(ReleaseTrigger::Owner) {
            tracing::debug!(resource_id = %self.shared.id, "released on drop");
        }
        if let Some(mut registration) = self.registration.get_mut().take() {
            registration.disarm();
        }
    }
}

impl<R: Releasable> fmt::Debug for Disposable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("id", &self.shared.id)
            .field("label", &self.shared.label)
            .field("state", &self.state())
            .finish()
    }
}
