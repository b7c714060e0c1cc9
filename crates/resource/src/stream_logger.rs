//! Buffered append-only log stream

use crate::disposable::Disposable;
use crate::file_writer::close_file;
use crate::releasable::Releasable;
use reclaim_config::ReclaimConfig;
use reclaim_core::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A buffered writer layered over an open file.
///
/// The buffer is the owned higher-level object: the owner path flushes it,
/// the fallback path detaches the file from it and drops whatever was still
/// buffered.
#[derive(Debug)]
pub struct LogStream {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
}

impl LogStream {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::resource_acquisition(path, "open", e))?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        let path = &self.path;
        self.writer
            .as_mut()
            .ok_or_else(|| Error::use_after_release(path.display().to_string()))
    }

    fn write(&mut self, message: &str) -> Result<()> {
        let path = self.path.clone();
        self.writer()?
            .write_all(message.as_bytes())
            .map_err(|e| Error::file_system(path, "log", e))
    }

    fn flush(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.writer()?
            .flush()
            .map_err(|e| Error::file_system(path, "flush", e))
    }
}

impl Releasable for LogStream {
    fn dispose_owned(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };

        let (file, buffered) = writer.into_parts();
        match buffered {
            Ok(bytes) if !bytes.is_empty() => {
                tracing::debug!(
                    path = %self.path.display(),
                    discarded = bytes.len(),
                    "closing log stream with unflushed bytes"
                );
            }
            Ok(_) => {}
            Err(_) => {
                tracing::debug!(path = %self.path.display(), "writer panicked, buffer discarded");
            }
        }
        close_file(file)
    }

    fn label(&self) -> String {
        format!("log stream {}", self.path.display())
    }
}

/// Appends messages to a log file through a buffer
#[derive(Debug)]
pub struct StreamLogger {
    inner: Disposable<LogStream>,
}

impl StreamLogger {
    /// Open (or create) `path` for appending
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let stream = LogStream::open(path.as_ref())?;
        Ok(Self {
            inner: Disposable::new(stream),
        })
    }

    /// Open the configured `logger_path`
    pub fn open_default(config: &ReclaimConfig) -> Result<Self> {
        Self::open(&config.logger_path)
    }

    /// Buffer `message`. Fails once the logger has been released.
    pub fn log(&self, message: &str) -> Result<()> {
        self.inner.use_resource(|stream| stream.write(message))
    }

    /// Push buffered messages to the file
    pub fn flush(&self) -> Result<()> {
        self.inner.use_resource(|stream| stream.flush())
    }

    /// Flush and close. Returns whether this call performed the release.
    pub fn release(&self) -> bool {
        self.inner.release()
    }

    pub fn is_released(&self) -> bool {
        self.inner.is_released()
    }

    pub fn disposable(&self) -> &Disposable<LogStream> {
        &self.inner
    }
}
