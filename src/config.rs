/*!
 * Configuration types for backup uploads
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BackupError, Result};
use crate::protocol::s3::{S3Config, S3ConfigBuilder};

/// Environment variable holding the directory backups are written to
pub const ENV_LOCATION: &str = "LOCATION";

/// Environment variable holding an optional S3-compatible endpoint
pub const ENV_ENDPOINT: &str = "ENDPOINT";

/// Environment variable holding the AWS region
pub const ENV_REGION: &str = "AWS_REGION";

/// Main configuration for upload runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Directory that file names are resolved against
    #[serde(default = "default_location")]
    pub location: PathBuf,

    /// Custom S3 endpoint (MinIO and friends); implies path-style addressing
    #[serde(default)]
    pub endpoint: Option<String>,

    /// AWS region (falls back to the SDK provider chain)
    #[serde(default)]
    pub region: Option<String>,

    /// Optional whole-operation S3 deadline in seconds (None = no deadline)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Number of files uploaded at once (1 = strictly sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            endpoint: None,
            region: None,
            timeout_seconds: None,
            concurrency: default_concurrency(),
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_location() -> PathBuf {
    PathBuf::from("/backups")
}

fn default_concurrency() -> usize {
    1
}

impl BackupConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BackupError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            BackupError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| BackupError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents).map_err(|e| {
            BackupError::Config(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Read `LOCATION`, `ENDPOINT` and `AWS_REGION` from the process environment
    pub fn from_env() -> Self {
        Self::default().merge_env(|key| std::env::var(key).ok())
    }

    /// Overlay values found through `lookup` onto this configuration
    ///
    /// Blank values are treated as unset.
    pub fn merge_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(location) = non_blank(ENV_LOCATION) {
            self.location = PathBuf::from(location);
        }
        if let Some(endpoint) = non_blank(ENV_ENDPOINT) {
            self.endpoint = Some(endpoint.trim().to_string());
        }
        if let Some(region) = non_blank(ENV_REGION) {
            self.region = Some(region);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.location.as_os_str().is_empty() {
            return Err(BackupError::Config(
                "Backup location cannot be empty".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(BackupError::Config(
                "Concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_seconds == Some(0) {
            return Err(BackupError::Config(
                "Timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Project into the S3 client configuration
    pub fn s3_config(&self) -> Result<S3Config> {
        let mut builder = S3ConfigBuilder::new();
        if let Some(seconds) = self.timeout_seconds {
            builder = builder.timeout_seconds(seconds);
        }
        if let Some(region) = &self.region {
            builder = builder.region(region.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint);
        }
        builder
            .build()
            .map_err(|e| BackupError::Config(e.to_string()))
    }
}
