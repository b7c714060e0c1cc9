//! Fallback reclamation.
//!
//! Dropping a guard is the primary way a resource gets released. This module
//! is the safety net behind it: a registry of fallback callbacks that the
//! signal handler (and, in abort-on-panic builds, the panic hook) drains on
//! the way out.
//!
//! ## Key Components
//!
//! - **`registry`**: `ReclamationRegistry` and the `Registration` handle that
//!   disarms its callback when dropped.
//! - **`handler`**: installs the signal and panic hooks that run the global
//!   registry.

pub mod handler;
pub mod registry;

pub use handler::{
    init_reclamation_handler, init_reclamation_handler_with, reclaim_all_resources,
    reclamation_handler_installed,
};
pub use registry::{ReclamationRegistry, Registration};
