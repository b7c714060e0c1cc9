//! One-way `Live -> Released` transition shared by every release path

use reclaim_core::ResourceState;
use std::sync::atomic::{AtomicU8, Ordering};

const LIVE: u8 = 0;
const RELEASED: u8 = 1;

/// Atomic release guard.
///
/// The compare-and-swap in `try_release` is the single source of truth for
/// whether a resource has been released; whichever caller wins it performs
/// the release and every other caller becomes a no-op.
#[derive(Debug)]
pub struct ReleaseFlag {
    state: AtomicU8,
}

impl ReleaseFlag {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(LIVE),
        }
    }

    /// Attempt the `Live -> Released` transition. Returns true for exactly one caller.
    pub fn try_release(&self) -> bool {
        self.state
            .compare_exchange(LIVE, RELEASED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_released(&self) -> bool {
        self.state.load(Ordering::Acquire) == RELEASED
    }

    pub fn state(&self) -> ResourceState {
        if self.is_released() {
            ResourceState::Released
        } else {
            ResourceState::Live
        }
    }
}

impl Default for ReleaseFlag {
    fn default() -> Self {
        Self::new()
    }
}
