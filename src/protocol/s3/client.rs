//! S3 client implementation

use super::config::S3Config;
use super::error::S3Result;
use super::DEFAULT_CONNECT_TIMEOUT_SECS;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as AwsS3Client;
use std::time::Duration;
use tracing::debug;

/// S3 client for interacting with AWS S3 and S3-compatible storage
#[derive(Clone)]
pub struct S3Client {
    /// AWS S3 client
    client: AwsS3Client,

    /// Shared SDK configuration the client was built from
    sdk_config: SdkConfig,

    /// Client configuration
    config: S3Config,
}

impl S3Client {
    /// Create a new S3 client with the given configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use backup_s3::protocol::s3::{S3Client, S3ConfigBuilder};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = S3ConfigBuilder::new()
    ///         .endpoint("http://minio:9000")
    ///         .build()?;
    ///     let client = S3Client::new(config).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: S3Config) -> S3Result<Self> {
        config.validate()?;

        let sdk_config = Self::load_sdk_config(&config).await;
        let client = Self::build_aws_client(&sdk_config, &config);

        Ok(Self {
            client,
            sdk_config,
            config,
        })
    }

    /// Resolve region and credentials through the AWS provider chain
    async fn load_sdk_config(config: &S3Config) -> SdkConfig {
        let region_provider = if let Some(region_str) = &config.region {
            RegionProviderChain::first_try(Region::new(region_str.clone()))
        } else {
            RegionProviderChain::default_provider()
        };

        aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await
    }

    /// Build the S3 service client on top of the shared SDK config
    fn build_aws_client(sdk_config: &SdkConfig, config: &S3Config) -> AwsS3Client {
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(sdk_config);

        if let Some(endpoint) = &config.endpoint {
            debug!(endpoint = %endpoint, "Using custom S3 endpoint with path-style addressing");
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        s3_config_builder = s3_config_builder.timeout_config(timeout_config(config));

        AwsS3Client::from_conf(s3_config_builder.build())
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Get the SDK configuration (region and credentials provider)
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    /// Get a reference to the underlying AWS S3 client
    pub fn aws_client(&self) -> &AwsS3Client {
        &self.client
    }
}

/// Bounded connect; the whole operation only when the caller asked for it
fn timeout_config(config: &S3Config) -> TimeoutConfig {
    let mut builder =
        TimeoutConfig::builder().connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));
    if let Some(seconds) = config.timeout_seconds {
        builder = builder.operation_timeout(Duration::from_secs(seconds));
    }
    builder.build()
}
