//! Core domain types, errors, and constants for `reclaim`.
//!
//! This crate holds the pieces every other workspace member agrees on: the
//! error taxonomy for acquiring, using and releasing external resources, and
//! the small vocabulary types describing a resource's lifetime.
//!
//! ## Key Components
//!
//! - **`errors`**: the primary `Error` enum and `Result` alias. Acquisition
//!   failures carry the host error code; use-after-release is its own variant
//!   so callers can match on programmer errors.
//! - **`types`**: `ResourceId`, `ResourceState` and `ReleaseTrigger`.
//! - **`constants`**: environment variable names and defaults.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result, ResultExt},
    types::*,
};
