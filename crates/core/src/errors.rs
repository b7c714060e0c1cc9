use std::path::PathBuf;

/// Result type alias for reclaim operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for reclaim operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external resource could not be acquired at construction time
    #[error("failed to {operation} '{}': {source}", .path.display())]
    ResourceAcquisition {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// An operation other than release was attempted on a released resource
    #[error("resource '{resource}' has already been released")]
    UseAfterRelease { resource: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// File system operations on a live resource
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

// Conversion implementations
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

// Helper methods for creating errors with context
impl Error {
    /// Create a resource acquisition error from the host failure
    #[must_use]
    pub fn resource_acquisition(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::ResourceAcquisition {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a use-after-release error
    #[must_use]
    pub fn use_after_release(resource: impl Into<String>) -> Self {
        Error::UseAfterRelease {
            resource: resource.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Host error code carried by an acquisition or file system failure
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Error::ResourceAcquisition { source, .. } | Error::FileSystem { source, .. } => {
                source.raw_os_error()
            }
            _ => None,
        }
    }

    pub fn is_use_after_release(&self) -> bool {
        matches!(self, Error::UseAfterRelease { .. })
    }

    pub fn is_resource_acquisition(&self) -> bool {
        matches!(self, Error::ResourceAcquisition { .. })
    }
}

// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a lazy message
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            Error::Configuration {
                message: format!("{}: {}", message.into(), base_error),
            }
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let base_error = e.into();
            Error::Configuration {
                message: format!("{}: {}", f(), base_error),
            }
        })
    }
}
