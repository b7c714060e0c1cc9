//! Process-wide count of live entities

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

static GLOBAL_COUNTER: Lazy<Arc<LiveCounter>> = Lazy::new(|| Arc::new(LiveCounter::new()));

/// Outcome of the bounded pressure check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pressure {
    Normal,
    Over { live: usize, threshold: usize },
}

impl Pressure {
    pub fn is_over(&self) -> bool {
        matches!(self, Pressure::Over { .. })
    }
}

/// Count of entities whose resource has not been released yet.
///
/// Only `Disposable` moves the count: up once at construction, down once on
/// the first release. Nothing waits on it; throttling decisions read it
/// through `check_pressure` and hand the work to a sweep.
#[derive(Debug, Default)]
pub struct LiveCounter {
    live: AtomicUsize,
    sweep_requested: AtomicBool,
}

impl LiveCounter {
    pub const fn new() -> Self {
        Self {
            live: AtomicUsize::new(0),
            sweep_requested: AtomicBool::new(false),
        }
    }

    /// The process-wide counter
    pub fn global() -> Arc<LiveCounter> {
        Arc::clone(&GLOBAL_COUNTER)
    }

    /// Returns the new count
    pub(crate) fn increment(&self) -> usize {
        self.live.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns the new count. Never wraps below zero.
    pub(crate) fn decrement(&self) -> usize {
        match self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(previous) => previous - 1,
            Err(_) => {
                tracing::warn!("live counter decremented at zero");
                0
            }
        }
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Single load, never waits
    pub fn check_pressure(&self, threshold: usize) -> Pressure {
        let live = self.live();
        if live > threshold {
            Pressure::Over { live, threshold }
        } else {
            Pressure::Normal
        }
    }

    /// Ask whoever controls the entities to sweep
    pub fn request_sweep(&self) {
        self.sweep_requested.store(true, Ordering::Release);
    }

    pub fn sweep_requested(&self) -> bool {
        self.sweep_requested.load(Ordering::Acquire)
    }

    /// Clear and return the pending sweep request
    pub fn take_sweep_request(&self) -> bool {
        self.sweep_requested.swap(false, Ordering::AcqRel)
    }
}
