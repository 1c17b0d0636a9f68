//! S3 operations trait and implementations

use super::client::S3Client;
use super::error::{S3Error, S3Result};
use super::types::{S3ListResult, S3Object};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use std::future::Future;
use tokio::fs::File;
use tokio_util::sync::CancellationToken;

/// The storage capability the upload core depends on
///
/// Every call takes the physical bucket explicitly and a cancellation
/// token. A call observing cancellation returns [`S3Error::Cancelled`].
/// Bodies are passed as open file handles; implementations own them and
/// the handle is closed when the call returns, on every path.
#[async_trait]
pub trait S3Operations: Send + Sync {
    /// List the first page of objects in `bucket`, optionally under `prefix`
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        cancel: &CancellationToken,
    ) -> S3Result<S3ListResult>;

    /// Upload the whole file as one object in a single request
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        cancel: &CancellationToken,
    ) -> S3Result<()>;

    /// Upload the file as fixed-size parts of `part_size` bytes
    async fn multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        part_size: u64,
        cancel: &CancellationToken,
    ) -> S3Result<()>;
}

/// Run `fut` unless `cancel` fires first
pub(crate) async fn cancellable<T, F>(
    cancel: &CancellationToken,
    operation: &str,
    fut: F,
) -> S3Result<T>
where
    F: Future<Output = S3Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(S3Error::Cancelled(operation.to_string())),
        result = fut => result,
    }
}

#[async_trait]
impl S3Operations for S3Client {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        cancel: &CancellationToken,
    ) -> S3Result<S3ListResult> {
        let request = self
            .aws_client()
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(str::to_string));

        let response = cancellable(cancel, "list objects", async {
            request.send().await.map_err(S3Error::from)
        })
        .await?;

        let objects = response
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?;
                Some(S3Object::new(key, obj.size().unwrap_or(0).max(0) as u64))
            })
            .collect();

        Ok(S3ListResult {
            objects,
            is_truncated: response.is_truncated().unwrap_or(false),
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        cancel: &CancellationToken,
    ) -> S3Result<()> {
        let operation = format!("put {}/{}", bucket, key);
        cancellable(cancel, &operation, async {
            let byte_stream = ByteStream::read_from()
                .file(body)
                .build()
                .await
                .map_err(|e| S3Error::Io(format!("Failed to stream file body: {}", e)))?;

            self.aws_client()
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(byte_stream)
                .send()
                .await
                .map_err(S3Error::from)?;
            Ok(())
        })
        .await
    }

    async fn multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        part_size: u64,
        cancel: &CancellationToken,
    ) -> S3Result<()> {
        self.upload_file_multipart(bucket, key, body, part_size, cancel)
            .await
    }
}
