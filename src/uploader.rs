/*!
 * Caller-facing backup uploader
 *
 * Ties the S3 client, the upload dispatcher, the credential bridge and a
 * shared cancellation token together behind string-typed entry points.
 * Bucket addresses are parsed once here and passed on typed.
 */

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::BackupConfig;
use crate::core::{BucketAddress, UploadDispatcher, UploadReport};
use crate::credentials::{
    CredentialBridge, CredentialSupplier, EnvironmentStore, ProcessEnvironment,
    SdkCredentialSupplier,
};
use crate::error::{BackupError, Result};
use crate::protocol::s3::{S3Client, S3Operations};

pub struct BackupUploader<S = S3Client, C = SdkCredentialSupplier> {
    dispatcher: UploadDispatcher<S>,
    credentials: CredentialBridge<C>,
    cancel: CancellationToken,
}

impl BackupUploader {
    /// Build an uploader against real S3 from `config`
    pub async fn from_config(config: &BackupConfig) -> Result<Self> {
        config.validate()?;

        let client = S3Client::new(config.s3_config()?)
            .await
            .map_err(|e| BackupError::Config(format!("Failed to create S3 client: {}", e)))?;
        let supplier = SdkCredentialSupplier::from_sdk_config(client.sdk_config());

        debug!(
            location = %config.location.display(),
            endpoint = config.endpoint.as_deref().unwrap_or("default"),
            concurrency = config.concurrency,
            "S3 uploader ready"
        );

        let dispatcher = UploadDispatcher::new(client, config.location.clone())
            .with_concurrency(config.concurrency);
        Ok(Self::new(dispatcher, supplier))
    }
}

impl<S, C> BackupUploader<S, C>
where
    S: S3Operations,
    C: CredentialSupplier,
{
    pub fn new(dispatcher: UploadDispatcher<S>, supplier: C) -> Self {
        Self {
            dispatcher,
            credentials: CredentialBridge::new(supplier),
            cancel: CancellationToken::new(),
        }
    }

    pub fn dispatcher(&self) -> &UploadDispatcher<S> {
        &self.dispatcher
    }

    /// Verify that `bucket_address` is reachable
    pub async fn check_access(&self, bucket_address: &str) -> Result<()> {
        let address = BucketAddress::parse(bucket_address)?;
        self.dispatcher.check_access(&address, &self.cancel).await
    }

    /// Upload `file_names` (relative to the configured location) to `bucket_address`
    ///
    /// Fails on the first file that cannot be read or uploaded.
    pub async fn upload_files(
        &self,
        file_names: &[String],
        bucket_address: &str,
    ) -> Result<UploadReport> {
        let address = BucketAddress::parse(bucket_address)?;
        self.dispatcher
            .upload_all(file_names, &address, &self.cancel)
            .await
    }

    /// Export credentials into the process environment
    ///
    /// Must run before anything else in the process reads those variables.
    pub async fn export_credentials(&self) -> Result<()> {
        self.export_credentials_to(&mut ProcessEnvironment).await
    }

    pub async fn export_credentials_to<E>(&self, env: &mut E) -> Result<()>
    where
        E: EnvironmentStore + ?Sized,
    {
        self.credentials.export(env).await
    }

    /// Cancel every in-flight and future operation of this uploader
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UploadStrategy;
    use crate::credentials::{Credentials, ENV_ACCESS_KEY_ID, ENV_REGION};
    use crate::logging::init_test_logging;
    use crate::protocol::s3::mock::{Call, MemoryStore};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct FixedSupplier;

    #[async_trait]
    impl CredentialSupplier for FixedSupplier {
        async fn retrieve(&self) -> Result<Credentials> {
            Ok(Credentials::new("AKIATEST", "secret", "eu-west-1"))
        }
    }

    fn uploader(dir: &TempDir, store: MemoryStore) -> BackupUploader<MemoryStore, FixedSupplier> {
        init_test_logging();
        BackupUploader::new(UploadDispatcher::new(store, dir.path()), FixedSupplier)
    }

    #[tokio::test]
    async fn test_upload_files_to_nested_address() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("db.dump"), b"payload").unwrap();
        let uploader = uploader(&dir, MemoryStore::new());

        let report = uploader
            .upload_files(&["db.dump".to_string()], "demo/nightly")
            .await
            .unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.uploaded[0].bucket, "demo");
        assert_eq!(report.uploaded[0].key, "nightly/db.dump");
        assert_eq!(report.uploaded[0].strategy, UploadStrategy::Direct);
    }

    #[tokio::test]
    async fn test_invalid_address_rejected_before_any_call() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let uploader = uploader(&dir, store.clone());

        assert!(uploader.check_access("").await.is_err());
        assert!(uploader.check_access("/prefix").await.is_err());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_check_access_virtual_bucket() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        store.add_object("demo", "nightly/old.dump", 1);
        let uploader = uploader(&dir, store);

        assert!(uploader.check_access("demo/nightly").await.is_ok());
        assert!(matches!(
            uploader.check_access("demo/weekly").await,
            Err(BackupError::Connectivity { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_stops_uploads() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.dump"), b"a").unwrap();
        let store = MemoryStore::new();
        let uploader = uploader(&dir, store.clone());

        uploader.cancel();
        assert!(uploader.cancellation_token().is_cancelled());

        let err = uploader
            .upload_files(&["a.dump".to_string()], "demo")
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(!store
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Put { .. })));
    }

    #[tokio::test]
    async fn test_export_credentials_once() {
        let dir = TempDir::new().unwrap();
        let uploader = uploader(&dir, MemoryStore::new());
        let mut env: HashMap<String, String> = HashMap::new();

        uploader.export_credentials_to(&mut env).await.unwrap();
        assert_eq!(env[ENV_ACCESS_KEY_ID], "AKIATEST");
        assert_eq!(env[ENV_REGION], "eu-west-1");

        assert!(uploader.export_credentials_to(&mut env).await.is_err());
    }
}
