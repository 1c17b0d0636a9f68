/*!
 * backup-s3 - Upload backup files to S3
 *
 * - Virtual sub-bucket addressing (`bucket/prefix`) resolved to object keys
 * - Single-request uploads below 1 GiB, 1 GiB multipart parts above
 * - Connectivity check before any upload
 * - Fail-fast batches with cooperative cancellation
 * - One-time export of AWS credentials for downstream tooling
 */

pub mod config;
pub mod core;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod uploader;

// Re-export commonly used types
pub use config::{BackupConfig, LogLevel};
pub use self::core::{BucketAddress, UploadDispatcher, UploadReport, UploadStrategy, UploadedObject};
pub use credentials::{CredentialBridge, CredentialSupplier, Credentials, EnvironmentStore};
pub use error::{BackupError, ErrorCategory, Result};
pub use protocol::s3::{S3Client, S3Config, S3Operations};
pub use uploader::BackupUploader;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
