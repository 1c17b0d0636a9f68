//! Integration tests for S3 protocol
//!
//! These tests require a running S3-compatible service (AWS S3, MinIO, LocalStack, etc.)
//! Set the following environment variables to run tests:
//!
//! - `S3_TEST_BUCKET`: Bucket name for testing
//! - `S3_TEST_REGION`: AWS region (default: us-east-1)
//! - `S3_TEST_ENDPOINT`: Custom endpoint for MinIO/LocalStack (optional)
//! - `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`: picked up by the credential chain
//! - `S3_TESTS_ENABLED`: Set to "1" to enable integration tests

use super::*;
use std::env;
use std::io::Write;
use tokio_util::sync::CancellationToken;

/// Check if S3 integration tests should run
fn s3_tests_enabled() -> bool {
    env::var("S3_TESTS_ENABLED").unwrap_or_default() == "1"
}

fn test_bucket() -> String {
    env::var("S3_TEST_BUCKET").unwrap_or_else(|_| "backup-s3-test-bucket".to_string())
}

/// Get test configuration from environment
fn get_test_config() -> S3Config {
    let mut builder = S3ConfigBuilder::new()
        .region(env::var("S3_TEST_REGION").unwrap_or_else(|_| "us-east-1".to_string()));

    if let Ok(endpoint) = env::var("S3_TEST_ENDPOINT") {
        builder = builder.endpoint(endpoint);
    }

    builder.build().expect("Invalid test configuration")
}

fn temp_file_with(len: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&vec![0xAB; len]).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
#[ignore]
async fn test_list_bucket() {
    if !s3_tests_enabled() {
        println!("Skipping S3 integration test - set S3_TESTS_ENABLED=1 to run");
        return;
    }

    let client = S3Client::new(get_test_config())
        .await
        .expect("Failed to create client");

    client
        .list_objects(&test_bucket(), None, &CancellationToken::new())
        .await
        .expect("Failed to list bucket");
}

#[tokio::test]
#[ignore]
async fn test_put_then_list_under_prefix() {
    if !s3_tests_enabled() {
        return;
    }

    let client = S3Client::new(get_test_config())
        .await
        .expect("Failed to create client");
    let cancel = CancellationToken::new();
    let bucket = test_bucket();

    let local = temp_file_with(1024);
    let file = tokio::fs::File::open(local.path()).await.unwrap();
    client
        .put_object(&bucket, "it/put/small.dump", file, &cancel)
        .await
        .expect("Failed to upload");

    let page = client
        .list_objects(&bucket, Some("it/put"), &cancel)
        .await
        .expect("Failed to list");
    assert!(page.objects.iter().any(|o| o.key == "it/put/small.dump"));
}

#[tokio::test]
#[ignore]
async fn test_multipart_with_minimum_parts() {
    if !s3_tests_enabled() {
        return;
    }

    let client = S3Client::new(get_test_config())
        .await
        .expect("Failed to create client");
    let cancel = CancellationToken::new();
    let bucket = test_bucket();

    let size = (2 * MIN_PART_SIZE + 17) as usize;
    let local = temp_file_with(size);
    let file = tokio::fs::File::open(local.path()).await.unwrap();
    client
        .multipart_upload(&bucket, "it/multipart/large.dump", file, MIN_PART_SIZE, &cancel)
        .await
        .expect("Failed multipart upload");

    let page = client
        .list_objects(&bucket, Some("it/multipart/large.dump"), &cancel)
        .await
        .expect("Failed to list");
    assert_eq!(page.objects.len(), 1);
    assert_eq!(page.objects[0].size, size as u64);
}
