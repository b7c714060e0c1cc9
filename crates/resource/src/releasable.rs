use std::io;

/// An exclusively-owned external resource that can be handed to `Disposable`.
///
/// `close` relinquishes the raw handle and is called at most once.
/// `dispose_owned` cleans up higher-level objects the resource owns (buffers,
/// writers layered over the handle) and is only called on owner-triggered
/// release, before `close`. Fallback releases skip it.
pub trait Releasable: Send + 'static {
    /// Release the underlying handle
    fn close(&mut self) -> io::Result<()>;

    /// Clean up owned higher-level objects
    fn dispose_owned(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Human readable name used in logs and errors
    fn label(&self) -> String;
}
