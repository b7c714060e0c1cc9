//! Disposable wrappers for exclusively-owned external resources.
//!
//! Every wrapper releases its resource exactly once, however many times and
//! from however many threads release is requested. Release happens when the
//! owner asks for it, when the wrapper goes out of scope, or, as a last
//! resort, when the process-wide reclamation registry runs its fallbacks.
//!
//! ## Key Components
//!
//! - **`Disposable`**: the generic wrapper and its builder.
//! - **`FileWriter`** / **`StreamLogger`**: file-backed resources built on it.
//! - **`LiveCounter`** / **`Population`**: counted entities and the sweep
//!   controller that decides when retired ones are released.

pub mod counter;
pub mod disposable;
pub mod file_writer;
pub mod flag;
pub mod population;
pub mod releasable;
pub mod stream_logger;

pub use counter::{LiveCounter, Pressure};
pub use disposable::{Disposable, DisposableBuilder};
pub use file_writer::{FileHandle, FileWriter};
pub use flag::ReleaseFlag;
pub use population::Population;
pub use releasable::Releasable;
pub use stream_logger::{LogStream, StreamLogger};
