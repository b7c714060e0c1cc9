//! Shared utilities for reclaim
//!
//! Tracing setup with structured resource events, and the fallback
//! reclamation machinery that backs every wrapped resource.

pub mod cleanup;
pub mod tracing;

pub use cleanup::*;
