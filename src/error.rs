/*!
 * Error types for backup uploads
 */

use crate::protocol::s3::S3Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackupError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug, Error)]
pub enum BackupError {
    /// Bucket unreachable, or the virtual sub-bucket under it is absent
    #[error("S3 bucket {bucket} is not accessible: {reason}")]
    Connectivity { bucket: String, reason: String },

    /// Local open/stat failure
    #[error("Couldn't access file {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Transport or server rejection during a direct or multipart upload
    #[error("Couldn't upload file {} to {bucket}: {source}", path.display())]
    Upload {
        path: PathBuf,
        bucket: String,
        #[source]
        source: S3Error,
    },

    /// The caller's cancellation token fired
    #[error("Cancelled while {operation}")]
    Cancelled { operation: String },

    /// Credentials could not be retrieved or exported
    #[error("Credential error: {0}")]
    Credential(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BackupError {
    /// Wrap a listing failure for `bucket`, keeping cancellation distinct
    pub fn connectivity(bucket: &str, source: S3Error) -> Self {
        match source {
            S3Error::Cancelled(operation) => BackupError::Cancelled { operation },
            other => BackupError::Connectivity {
                bucket: bucket.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Wrap an upload failure, keeping cancellation distinct
    pub fn upload(path: impl Into<PathBuf>, bucket: &str, source: S3Error) -> Self {
        match source {
            S3Error::Cancelled(operation) => BackupError::Cancelled { operation },
            other => BackupError::Upload {
                path: path.into(),
                bucket: bucket.to_string(),
                source: other,
            },
        }
    }

    pub fn file_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BackupError::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BackupError::Config(_) | BackupError::Credential(_) => EXIT_FATAL,
            _ => EXIT_PARTIAL,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BackupError::Cancelled { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            BackupError::Connectivity { .. } => ErrorCategory::Connectivity,
            BackupError::FileIo { .. } => ErrorCategory::FileIo,
            BackupError::Upload { .. } => ErrorCategory::Upload,
            BackupError::Cancelled { .. } => ErrorCategory::Cancelled,
            BackupError::Credential(_) => ErrorCategory::Credential,
            BackupError::Config(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Connectivity,
    FileIo,
    Upload,
    Cancelled,
    Credential,
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Connectivity => write!(f, "connectivity"),
            ErrorCategory::FileIo => write!(f, "file-io"),
            ErrorCategory::Upload => write!(f, "upload"),
            ErrorCategory::Cancelled => write!(f, "cancelled"),
            ErrorCategory::Credential => write!(f, "credential"),
            ErrorCategory::Configuration => write!(f, "configuration"),
        }
    }
}
