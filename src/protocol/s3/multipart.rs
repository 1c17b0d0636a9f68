//! Multipart upload for large files

use super::client::S3Client;
use super::error::{S3Error, S3Result};
use super::operations::cancellable;
use super::types::{PartRange, UploadPartInfo};
use super::{MAX_PARTS, MAX_PART_SIZE, MIN_PART_SIZE};
use aws_sdk_s3::primitives::{ByteStream, Length};
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::AsyncSeekExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Split `total_size` bytes into consecutive parts of `part_size` bytes
///
/// The last part carries the remainder. An empty file still produces one
/// (empty) part since S3 requires at least one part per upload.
pub fn plan_parts(total_size: u64, part_size: u64) -> S3Result<Vec<PartRange>> {
    if !(MIN_PART_SIZE..=MAX_PART_SIZE).contains(&part_size) {
        return Err(S3Error::MultipartUpload(format!(
            "Part size {} outside allowed range {}..={}",
            part_size, MIN_PART_SIZE, MAX_PART_SIZE
        )));
    }

    let count = total_size.div_ceil(part_size).max(1);
    if count > MAX_PARTS {
        return Err(S3Error::MultipartUpload(format!(
            "{} bytes would need {} parts of {} bytes, limit is {}",
            total_size, count, part_size, MAX_PARTS
        )));
    }

    Ok((0..count)
        .map(|index| {
            let offset = index * part_size;
            PartRange {
                part_number: (index + 1) as i32,
                offset,
                length: part_size.min(total_size - offset),
            }
        })
        .collect())
}

/// Stream exactly `part.length` bytes of `file` starting at `part.offset`
///
/// The cloned handle shares its cursor with `file`, so bodies must be
/// consumed one part at a time.
pub(crate) async fn part_body(file: &File, part: &PartRange) -> S3Result<ByteStream> {
    let mut handle = file.try_clone().await?;
    handle.seek(SeekFrom::Start(part.offset)).await?;

    ByteStream::read_from()
        .file(handle)
        .length(Length::Exact(part.length))
        .build()
        .await
        .map_err(|e| S3Error::Io(format!("Failed to stream part {}: {}", part.part_number, e)))
}

impl S3Client {
    /// Upload an open file to `bucket`/`key` using multipart upload
    ///
    /// Parts are streamed from the file one after another without
    /// buffering a whole part in memory. Any failure, including
    /// cancellation, aborts the multipart upload.
    pub async fn upload_file_multipart(
        &self,
        bucket: &str,
        key: &str,
        file: File,
        part_size: u64,
        cancel: &CancellationToken,
    ) -> S3Result<()> {
        let file_size = file.metadata().await?.len();
        let parts = plan_parts(file_size, part_size)?;

        let upload_id = cancellable(
            cancel,
            &format!("create multipart upload {}/{}", bucket, key),
            self.initiate_multipart_upload(bucket, key),
        )
        .await?;
        debug!(bucket, key, upload_id = %upload_id, parts = parts.len(), "Multipart upload initiated");

        let outcome = match self
            .upload_parts(bucket, key, &upload_id, &file, &parts, cancel)
            .await
        {
            Ok(completed) => {
                cancellable(
                    cancel,
                    &format!("complete multipart upload {}/{}", bucket, key),
                    self.complete_multipart_upload(bucket, key, &upload_id, &completed),
                )
                .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            warn!(bucket, key, upload_id = %upload_id, error = %e, "Aborting multipart upload");
            if let Err(abort_err) = self.abort_multipart_upload(bucket, key, &upload_id).await {
                warn!(bucket, key, upload_id = %upload_id, error = %abort_err, "Failed to abort multipart upload");
            }
        }

        outcome
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        file: &File,
        parts: &[PartRange],
        cancel: &CancellationToken,
    ) -> S3Result<Vec<UploadPartInfo>> {
        let mut completed = Vec::with_capacity(parts.len());

        for part in parts {
            let body = part_body(file, part).await?;
            let info = cancellable(
                cancel,
                &format!("upload part {} of {}/{}", part.part_number, bucket, key),
                self.upload_part(bucket, key, upload_id, part, body),
            )
            .await?;

            debug!(
                bucket,
                key,
                part = info.part_number,
                size = info.size,
                "Uploaded part"
            );
            completed.push(info);
        }

        Ok(completed)
    }

    /// Initiate a multipart upload
    async fn initiate_multipart_upload(&self, bucket: &str, key: &str) -> S3Result<String> {
        let response = self
            .aws_client()
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(S3Error::from)?;

        response
            .upload_id()
            .ok_or_else(|| S3Error::MultipartUpload("No upload ID returned".to_string()))
            .map(|s| s.to_string())
    }

    /// Upload a single part
    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part: &PartRange,
        body: ByteStream,
    ) -> S3Result<UploadPartInfo> {
        let response = self
            .aws_client()
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part.part_number)
            .content_length(part.length as i64)
            .body(body)
            .send()
            .await
            .map_err(S3Error::from)?;

        let etag = response
            .e_tag()
            .ok_or_else(|| S3Error::MultipartUpload("No ETag returned for part".to_string()))?
            .to_string();

        Ok(UploadPartInfo::new(part.part_number, etag, part.length))
    }

    /// Complete a multipart upload
    async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[UploadPartInfo],
    ) -> S3Result<()> {
        let completed_parts: Vec<CompletedPart> = parts
            .iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number)
                    .e_tag(&p.etag)
                    .build()
            })
            .collect();

        let multipart_upload = CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build();

        self.aws_client()
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(multipart_upload)
            .send()
            .await
            .map_err(S3Error::from)?;

        Ok(())
    }

    /// Abort a multipart upload
    pub async fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> S3Result<()> {
        self.aws_client()
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(S3Error::from)?;

        Ok(())
    }
}
