//! Vocabulary types describing the lifetime of an owned resource

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier assigned to every wrapped resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Allocate the next identifier
    pub fn allocate() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res-{}", self.0)
    }
}

/// Lifetime state of a wrapped resource. `Released` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    Live,
    Released,
}

impl ResourceState {
    pub fn is_live(&self) -> bool {
        matches!(self, ResourceState::Live)
    }
}

impl Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceState::Live => write!(f, "live"),
            ResourceState::Released => write!(f, "released"),
        }
    }
}

/// Who asked for a release.
///
/// `Owner` releases come from an explicit release or from drop, and run the
/// full cleanup, including any higher-level objects the resource owns.
/// `Fallback` releases come from the process-wide reclamation registry and
/// only close the raw handle, since anything else the resource refers to may
/// already be gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseTrigger {
    Owner,
    Fallback,
}

impl ReleaseTrigger {
    /// Whether owned higher-level objects may be touched
    pub fn disposes_owned(&self) -> bool {
        matches!(self, ReleaseTrigger::Owner)
    }
}

impl Display for ReleaseTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseTrigger::Owner => write!(f, "owner"),
            ReleaseTrigger::Fallback => write!(f, "fallback"),
        }
    }
}
