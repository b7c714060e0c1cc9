//! Write-only file whose handle is released exactly once

use crate::disposable::Disposable;
use crate::releasable::Releasable;
use fs2::FileExt;
use reclaim_config::ReclaimConfig;
use reclaim_core::{constants::LINE_ENDING, Error, ResourceState, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Close a file and report the result of the close itself.
///
/// Dropping a `File` discards close errors; on unix the descriptor is handed
/// to `close(2)` directly so a failure can be logged.
pub(crate) fn close_file(file: File) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::io::IntoRawFd;

        let fd = file.into_raw_fd();
        if unsafe { libc::close(fd) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        drop(file);
        Ok(())
    }
}

/// Open handle behind a `FileWriter`
#[derive(Debug)]
pub struct FileHandle {
    file: Option<File>,
    path: PathBuf,
    locked: bool,
}

impl FileHandle {
    /// Create or truncate `path` for writing.
    ///
    /// With `exclusive`, an exclusive lock is taken before truncating, so a
    /// file held by another writer is left untouched and acquisition fails.
    pub fn create(path: &Path, exclusive: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| Error::resource_acquisition(path, "create", e))?;

        if exclusive {
            file.try_lock_exclusive()
                .map_err(|e| Error::resource_acquisition(path, "lock", e))?;
        }

        file.set_len(0)
            .map_err(|e| Error::resource_acquisition(path, "truncate", e))?;

        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
            locked: exclusive,
        })
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| Error::use_after_release(self.path.display().to_string()))?;
        file.write_all(bytes)
            .map_err(|e| Error::file_system(&self.path, "write", e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Releasable for FileHandle {
    fn close(&mut self) -> io::Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        if self.locked {
            if let Err(e) = FileExt::unlock(&file) {
                tracing::debug!(path = %self.path.display(), error = %e, "unlock failed");
            }
        }
        close_file(file)
    }

    fn label(&self) -> String {
        format!("file writer {}", self.path.display())
    }
}

/// Writes text or bytes to a file it creates.
///
/// ```no_run
/// use reclaim_resource::FileWriter;
///
/// # fn main() -> reclaim_core::Result<()> {
/// let writer = FileWriter::create("/tmp/out.txt")?;
/// writer.write("hello")?;
/// writer.write(" world")?;
/// writer.release();
/// assert!(writer.write("more").unwrap_err().is_use_after_release());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileWriter {
    inner: Disposable<FileHandle>,
    path: PathBuf,
}

impl FileWriter {
    /// Create `path` with exclusive access
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with(path, true)
    }

    /// Create `path`, optionally holding an exclusive lock on it
    pub fn create_with(path: impl AsRef<Path>, exclusive: bool) -> Result<Self> {
        let path = path.as_ref();
        let handle = FileHandle::create(path, exclusive)?;
        Ok(Self::from_handle(handle))
    }

    /// Create `path` using the configured access mode
    pub fn from_config(path: impl AsRef<Path>, config: &ReclaimConfig) -> Result<Self> {
        Self::create_with(path, config.exclusive_access)
    }

    /// Wrap an already-acquired handle
    pub fn from_handle(handle: FileHandle) -> Self {
        let path = handle.path().to_path_buf();
        Self {
            inner: Disposable::new(handle),
            path,
        }
    }

    pub fn write(&self, text: &str) -> Result<()> {
        self.write_bytes(text.as_bytes())
    }

    /// Write `text` followed by the platform line terminator
    pub fn write_line(&self, text: &str) -> Result<()> {
        self.write(&format!("{text}{LINE_ENDING}"))
    }

    pub fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.inner.use_resource(|handle| handle.write_all(bytes))
    }

    /// Close the file. Safe to call repeatedly; returns whether this call closed it.
    pub fn release(&self) -> bool {
        self.inner.release()
    }

    pub fn is_released(&self) -> bool {
        self.inner.is_released()
    }

    pub fn state(&self) -> ResourceState {
        self.inner.state()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying wrapper, for callers driving the fallback path
    pub fn disposable(&self) -> &Disposable<FileHandle> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_release_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");

        let writer = FileWriter::create(&path).unwrap();
        writer.write("hello").unwrap();
        writer.write(" world").unwrap();
        assert!(writer.release());

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");

        let err = writer.write("more").unwrap_err();
        assert!(err.is_use_after_release());
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
    }

    #[test]
    fn test_write_line_uses_line_ending() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lines.txt");

        let writer = FileWriter::create(&path).unwrap();
        writer.write_line("first").unwrap();
        writer.write_line("second").unwrap();
        drop(writer);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("first{LINE_ENDING}second{LINE_ENDING}")
        );
    }

    #[test]
    fn test_create_truncates_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("old.txt");
        fs::write(&path, "previous content").unwrap();

        let writer = FileWriter::create(&path).unwrap();
        writer.write("new").unwrap();
        writer.release();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_missing_directory_fails_acquisition() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.txt");

        let err = FileWriter::create(&path).unwrap_err();
        assert!(err.is_resource_acquisition());
        assert!(err.os_code().is_some());
    }

    #[test]
    #[cfg(unix)]
    fn test_exclusive_writer_blocks_second_writer() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locked.txt");

        let first = FileWriter::create(&path).unwrap();
        first.write("kept").unwrap();

        let err = FileWriter::create(&path).unwrap_err();
        assert!(err.is_resource_acquisition());

        // The failed attempt must not have truncated the file
        first.release();
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept");

        // Released, so the path can be acquired again
        let second = FileWriter::create(&path).unwrap();
        second.release();
    }

    #[test]
    fn test_shared_access_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shared.txt");
        let config = ReclaimConfig {
            exclusive_access: false,
            ..Default::default()
        };

        let first = FileWriter::from_config(&path, &config).unwrap();
        let second = FileWriter::from_config(&path, &config).unwrap();
        first.release();
        second.release();
    }

    #[test]
    fn test_fallback_closes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fallback.txt");

        let writer = FileWriter::create(&path).unwrap();
        writer.write("unbuffered").unwrap();
        assert!(writer.disposable().release_fallback());
        assert!(!writer.release());

        assert_eq!(writer.state(), ResourceState::Released);
        assert_eq!(fs::read_to_string(&path).unwrap(), "unbuffered");
    }
}
