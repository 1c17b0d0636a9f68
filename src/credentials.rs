/*!
 * Credential export for downstream tooling
 *
 * Some tools launched next to the uploader (aggregate backups, for one)
 * only discover AWS credentials through environment variables. The bridge
 * retrieves credentials from the SDK chain and mirrors them into the
 * process environment once, at startup, before any reader runs.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::error::{BackupError, Result};

pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const ENV_REGION: &str = "AWS_REGION";

/// Access key, secret and region as handed out by the credential chain
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
    pub region: String,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            session_token: None,
            region: region.into(),
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(SecretString::from(token.into()));
        self
    }

    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_ref().map(|t| t.expose_secret())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .field("region", &self.region)
            .finish()
    }
}

/// Source of credentials
#[async_trait]
pub trait CredentialSupplier: Send + Sync {
    async fn retrieve(&self) -> Result<Credentials>;
}

/// Credentials from the AWS SDK provider chain the S3 client was built with
pub struct SdkCredentialSupplier {
    provider: Option<SharedCredentialsProvider>,
    region: Option<String>,
}

impl SdkCredentialSupplier {
    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self {
            provider: sdk_config.credentials_provider(),
            region: sdk_config.region().map(|r| r.to_string()),
        }
    }
}

#[async_trait]
impl CredentialSupplier for SdkCredentialSupplier {
    async fn retrieve(&self) -> Result<Credentials> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            BackupError::Credential("No credentials provider configured".to_string())
        })?;
        let region = self
            .region
            .clone()
            .ok_or_else(|| BackupError::Credential("No AWS region configured".to_string()))?;

        let creds = provider
            .provide_credentials()
            .await
            .map_err(|e| BackupError::Credential(format!("Unable to retrieve credentials: {}", e)))?;

        let mut credentials =
            Credentials::new(creds.access_key_id(), creds.secret_access_key(), region);
        if let Some(token) = creds.session_token() {
            credentials = credentials.with_session_token(token);
        }
        Ok(credentials)
    }
}

/// Process-wide key/value state that downstream tools read
pub trait EnvironmentStore {
    /// Reject a pair `set` would not accept, without writing anything
    fn check(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// The real process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl EnvironmentStore for ProcessEnvironment {
    fn check(&self, key: &str, value: &str) -> Result<()> {
        // `set_var` panics on these instead of reporting them.
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(BackupError::Credential(format!(
                "Invalid environment variable name {:?}",
                key
            )));
        }
        if value.contains('\0') {
            return Err(BackupError::Credential(format!(
                "Value for {} contains a NUL byte",
                key
            )));
        }
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check(key, value)?;
        std::env::set_var(key, value);
        Ok(())
    }
}

impl EnvironmentStore for HashMap<String, String> {
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Write `credentials` into `env`
///
/// Every pair is checked before the first write, so a rejected value
/// leaves `env` untouched.
pub fn export_to<E: EnvironmentStore + ?Sized>(credentials: &Credentials, env: &mut E) -> Result<()> {
    let mut pairs = vec![
        (ENV_ACCESS_KEY_ID, credentials.access_key_id.as_str()),
        (ENV_SECRET_ACCESS_KEY, credentials.secret_access_key()),
        (ENV_REGION, credentials.region.as_str()),
    ];
    if let Some(token) = credentials.session_token() {
        pairs.push((ENV_SESSION_TOKEN, token));
    }

    for (key, value) in &pairs {
        env.check(key, value)?;
    }
    for (key, value) in pairs {
        env.set(key, value)?;
    }
    Ok(())
}

/// Retrieves credentials and exports them exactly once
pub struct CredentialBridge<C> {
    supplier: C,
    exported: AtomicBool,
}

impl<C: CredentialSupplier> CredentialBridge<C> {
    pub fn new(supplier: C) -> Self {
        Self {
            supplier,
            exported: AtomicBool::new(false),
        }
    }

    pub fn is_exported(&self) -> bool {
        self.exported.load(Ordering::SeqCst)
    }

    /// Export credentials into `env`
    ///
    /// A second call after a successful export is rejected. A failed
    /// attempt leaves the bridge unexported.
    pub async fn export<E: EnvironmentStore + ?Sized>(&self, env: &mut E) -> Result<()> {
        if self.exported.swap(true, Ordering::SeqCst) {
            return Err(BackupError::Credential(
                "Credentials were already exported".to_string(),
            ));
        }

        let result = match self.supplier.retrieve().await {
            Ok(credentials) => export_to(&credentials, env).map(|_| credentials),
            Err(e) => Err(e),
        };

        match result {
            Ok(credentials) => {
                info!(
                    region = %credentials.region,
                    session = credentials.session_token().is_some(),
                    "Exported AWS credentials to environment"
                );
                Ok(())
            }
            Err(e) => {
                self.exported.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }
}
