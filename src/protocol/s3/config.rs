//! Configuration types for S3 client

use super::error::{S3Error, S3Result};
use serde::{Deserialize, Serialize};

/// S3 client configuration
///
/// The client is not bound to a bucket: every call names the physical
/// bucket it targets, so one client serves any bucket address.
/// Credentials always come from the SDK provider chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct S3Config {
    /// AWS region (e.g., "us-east-1"); the SDK provider chain is used when unset
    pub region: Option<String>,

    /// Custom endpoint URL (for S3-compatible services like MinIO)
    pub endpoint: Option<String>,

    /// Path-style addressing (required for some S3-compatible services)
    pub force_path_style: bool,

    /// Whole-operation deadline in seconds; unset means no deadline
    ///
    /// A single request can carry a full 1 GiB part, so there is no
    /// default cap. Connecting is always bounded by
    /// [`DEFAULT_CONNECT_TIMEOUT_SECS`](super::DEFAULT_CONNECT_TIMEOUT_SECS).
    pub timeout_seconds: Option<u64>,
}

impl S3Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> S3Result<()> {
        if let Some(endpoint) = &self.endpoint {
            if endpoint.trim().is_empty() {
                return Err(S3Error::InvalidConfig(
                    "Endpoint cannot be blank".to_string(),
                ));
            }
            if !self.force_path_style {
                return Err(S3Error::InvalidConfig(format!(
                    "Custom endpoint {} requires path-style addressing",
                    endpoint
                )));
            }
        }

        if self.timeout_seconds == Some(0) {
            return Err(S3Error::InvalidConfig(
                "Timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for S3Config
#[derive(Default)]
pub struct S3ConfigBuilder {
    config: S3Config,
}

impl S3ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the AWS region
    pub fn region(mut self, region: String) -> Self {
        self.config.region = Some(region);
        self
    }

    /// Set a custom endpoint (MinIO, LocalStack, etc.)
    ///
    /// Blank values are ignored. A non-blank endpoint always switches the
    /// client to path-style addressing.
    pub fn endpoint(mut self, endpoint: impl AsRef<str>) -> Self {
        let endpoint = endpoint.as_ref().trim();
        if !endpoint.is_empty() {
            self.config.endpoint = Some(endpoint.to_string());
            self.config.force_path_style = true;
        }
        self
    }

    /// Cap every operation at `seconds`
    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.timeout_seconds = Some(seconds);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> S3Result<S3Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = S3Config::default();
        assert!(config.validate().is_ok());
        assert!(config.endpoint.is_none());
        assert!(!config.force_path_style);
        assert_eq!(config.timeout_seconds, None);
    }

    #[test]
    fn test_endpoint_forces_path_style() {
        let config = S3ConfigBuilder::new()
            .endpoint("http://minio:9000")
            .build()
            .unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://minio:9000"));
        assert!(config.force_path_style);
    }

    #[test]
    fn test_blank_endpoint_ignored() {
        let config = S3ConfigBuilder::new().endpoint("   ").build().unwrap();
        assert!(config.endpoint.is_none());
        assert!(!config.force_path_style);
    }

    #[test]
    fn test_endpoint_without_path_style_rejected() {
        let mut config = S3Config::new();
        config.endpoint = Some("http://minio:9000".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = S3ConfigBuilder::new().timeout_seconds(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_timeout_kept() {
        let config = S3ConfigBuilder::new().timeout_seconds(900).build().unwrap();
        assert_eq!(config.timeout_seconds, Some(900));
    }
}
