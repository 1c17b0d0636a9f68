/*!
 * Per-file upload dispatch
 *
 * For every file name: build the local path under the base directory,
 * stat it, pick a strategy by size, resolve the object key against the
 * bucket address, then hand the open file to the storage capability.
 */

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::fs::File;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::address::BucketAddress;
use super::connectivity;
use super::strategy::{UploadStrategy, MULTIPART_PART_SIZE};
use crate::error::{BackupError, Result};
use crate::protocol::s3::S3Operations;

/// One file that reached the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub file_name: String,
    pub bucket: String,
    pub key: String,
    pub strategy: UploadStrategy,
    pub size_bytes: u64,
}

/// Outcome of a fully successful batch, in input order
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub uploaded: Vec<UploadedObject>,
}

impl UploadReport {
    pub fn total_bytes(&self) -> u64 {
        self.uploaded.iter().map(|o| o.size_bytes).sum()
    }

    pub fn len(&self) -> usize {
        self.uploaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploaded.is_empty()
    }
}

/// Drives uploads of local backup files through an [`S3Operations`] store
pub struct UploadDispatcher<S> {
    store: S,
    base_dir: PathBuf,
    concurrency: usize,
}

impl<S: S3Operations> UploadDispatcher<S> {
    /// Create a sequential dispatcher resolving file names under `base_dir`
    pub fn new(store: S, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            base_dir: base_dir.into(),
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` files in flight at once (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Validate the target before any upload
    pub async fn check_access(
        &self,
        address: &BucketAddress,
        cancel: &CancellationToken,
    ) -> Result<()> {
        connectivity::check_access(&self.store, address, cancel).await
    }

    /// Upload every file in `file_names` to `address`
    ///
    /// # AllOrAbort
    ///
    /// The batch either uploads every file or fails. The first per-file
    /// error (stat, open, upload or cancellation) is returned as-is, no
    /// further files are started, and files still in flight are dropped
    /// with their handles closed. With a concurrency of 1 files run
    /// strictly in the given order, so a failure on the second of three
    /// files means the third is never attempted.
    pub async fn upload_all(
        &self,
        file_names: &[String],
        address: &BucketAddress,
        cancel: &CancellationToken,
    ) -> Result<UploadReport> {
        info!(
            files = file_names.len(),
            bucket = %address,
            concurrency = self.concurrency,
            "Starting backup upload"
        );

        let outcome = stream::iter(
            file_names
                .iter()
                .map(|name| self.upload_one(name, address, cancel)),
        )
        .buffered(self.concurrency)
        .try_collect::<Vec<_>>()
        .await;

        match outcome {
            Ok(uploaded) => {
                let report = UploadReport { uploaded };
                info!(
                    files = report.len(),
                    bytes = report.total_bytes(),
                    bucket = %address,
                    "Backup upload complete"
                );
                Ok(report)
            }
            Err(e) => {
                error!(bucket = %address, category = %e.category(), error = %e, "Backup upload aborted");
                Err(e)
            }
        }
    }

    async fn upload_one(
        &self,
        file_name: &str,
        address: &BucketAddress,
        cancel: &CancellationToken,
    ) -> Result<UploadedObject> {
        let path = local_path(&self.base_dir, file_name);

        if cancel.is_cancelled() {
            return Err(BackupError::Cancelled {
                operation: format!("starting upload of {}", path.display()),
            });
        }

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| BackupError::file_io(&path, e))?;
        if !metadata.is_file() {
            return Err(BackupError::file_io(
                &path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        let size_bytes = metadata.len();
        let strategy = UploadStrategy::classify(size_bytes);
        let target = address.resolve(file_name);

        let file = File::open(&path)
            .await
            .map_err(|e| BackupError::file_io(&path, e))?;

        info!(file = %path.display(), "Starting upload of file");
        debug!(
            bucket = %target.physical_bucket,
            key = %target.object_key,
            strategy = %strategy,
            size = size_bytes,
            "Resolved upload target"
        );

        // `file` moves into the store call and is closed when it returns.
        let result = match strategy {
            UploadStrategy::Direct => {
                self.store
                    .put_object(&target.physical_bucket, &target.object_key, file, cancel)
                    .await
            }
            UploadStrategy::Multipart => {
                self.store
                    .multipart_upload(
                        &target.physical_bucket,
                        &target.object_key,
                        file,
                        MULTIPART_PART_SIZE,
                        cancel,
                    )
                    .await
            }
        };
        result.map_err(|e| BackupError::upload(&path, address.as_str(), e))?;

        info!(file = file_name, bucket = %address, strategy = %strategy, "File uploaded to s3 bucket");

        Ok(UploadedObject {
            file_name: file_name.to_string(),
            bucket: target.physical_bucket,
            key: target.object_key,
            strategy,
            size_bytes,
        })
    }
}

/// `base_dir` + "/" + `file_name`, without reinterpreting either part
fn local_path(base_dir: &Path, file_name: &str) -> PathBuf {
    let mut path = OsString::from(base_dir.as_os_str());
    path.push("/");
    path.push(file_name);
    PathBuf::from(path)
}
