//! Native S3 protocol implementation
//!
//! AWS S3 support using the official AWS SDK for Rust, including
//! S3-compatible services like MinIO reached through a custom endpoint.
//!
//! # Features
//!
//! - Async operations with Tokio runtime
//! - Single-request uploads and streamed multipart uploads for large files
//! - Cancellation of any in-flight call through a `CancellationToken`
//! - Authentication through the SDK provider chain (environment, credentials file, IAM roles)
//! - Custom endpoints with path-style addressing
//!
//! # Example
//!
//! ```ignore
//! use backup_s3::protocol::s3::{S3Client, S3ConfigBuilder, S3Operations};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = S3ConfigBuilder::new()
//!         .region("us-east-1".to_string())
//!         .endpoint("http://localhost:9000")
//!         .build()?;
//!
//!     let client = S3Client::new(config).await?;
//!     let page = client
//!         .list_objects("demo", Some("nightly/"), &CancellationToken::new())
//!         .await?;
//!     println!("{} objects", page.objects.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod multipart;
mod operations;
mod types;

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
mod tests;

pub use client::S3Client;
pub use config::{S3Config, S3ConfigBuilder};
pub use error::{S3Error, S3Result};
pub use multipart::plan_parts;
pub use operations::S3Operations;
pub use types::{PartRange, S3ListResult, S3Object, UploadPartInfo};

/// Connect timeout applied to every request
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Minimum multipart part size required by S3 (5 MiB)
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum multipart part size allowed by S3 (5 GiB)
pub const MAX_PART_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Maximum number of parts in one multipart upload
pub const MAX_PARTS: u64 = 10_000;
