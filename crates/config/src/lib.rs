//! Configuration loading for reclaim
//!
//! Settings come from an optional JSON file and are then overridden by
//! `RECLAIM_*` environment variables.

pub mod config;
pub mod loader;

pub use config::*;
pub use loader::*;
