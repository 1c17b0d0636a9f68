/*!
 * Logging and tracing initialization
 *
 * Diagnostics go to stderr as compact lines, or to a log file as JSON.
 * Stdout is left to command output. The AWS SDK crates are held at `warn`
 * unless the run asks for `trace`.
 */

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::BackupConfig;
use crate::error::{BackupError, Result};

const SDK_TARGETS: &[&str] = &["aws_config", "aws_sdk_s3", "aws_smithy_runtime", "hyper"];

/// Where diagnostics are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Appended to, one JSON object per line
    File(PathBuf),
}

impl LogSink {
    pub fn from_config(config: &BackupConfig) -> Self {
        match &config.log_file {
            Some(path) => LogSink::File(path.clone()),
            None => LogSink::Stderr,
        }
    }
}

/// Level that `config` asks for; `verbose` wins over `log_level`
pub fn effective_level(config: &BackupConfig) -> Level {
    if config.verbose {
        Level::DEBUG
    } else {
        config.log_level.to_tracing_level()
    }
}

/// Filter directive used when `RUST_LOG` is not set
pub fn filter_directive(level: Level) -> String {
    let sdk_level = if level == Level::TRACE {
        Level::DEBUG
    } else {
        Level::WARN
    };

    let mut directive = format!("backup_s3={}", level);
    for target in SDK_TARGETS {
        directive.push_str(&format!(",{}={}", target, sdk_level));
    }
    directive
}

/// Install the global subscriber described by `config`
pub fn init_logging(config: &BackupConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(effective_level(config))))
        .map_err(|e| BackupError::Config(format!("Failed to create log filter: {}", e)))?;

    let (terminal, file) = match LogSink::from_config(config) {
        LogSink::Stderr => (
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .compact(),
            ),
            None,
        ),
        LogSink::File(path) => (
            None,
            Some(
                fmt::layer()
                    .with_writer(open_log_file(&path)?)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .json(),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(terminal)
        .with(file)
        .try_init()
        .map_err(|e| BackupError::Config(format!("Failed to install logger: {}", e)))
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            BackupError::Config(format!(
                "Failed to open log file {}: {}",
                path.display(),
                e
            ))
        })
}

/// Route logs to the test harness; safe to call from every test
#[cfg(test)]
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter_directive(Level::DEBUG)));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_test_writer().with_target(false).compact())
            .try_init()
            .ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use tempfile::TempDir;

    #[test]
    fn test_effective_level_follows_config() {
        let config = BackupConfig {
            log_level: LogLevel::Warn,
            ..Default::default()
        };
        assert_eq!(effective_level(&config), Level::WARN);
    }

    #[test]
    fn test_verbose_overrides_log_level() {
        let config = BackupConfig {
            log_level: LogLevel::Error,
            verbose: true,
            ..Default::default()
        };
        assert_eq!(effective_level(&config), Level::DEBUG);
    }

    #[test]
    fn test_filter_directive_quiets_sdk() {
        let directive = filter_directive(Level::INFO);
        assert!(directive.starts_with("backup_s3=INFO"));
        assert!(directive.contains("aws_smithy_runtime=WARN"));
        assert!(EnvFilter::try_new(&directive).is_ok());

        assert!(filter_directive(Level::TRACE).contains("aws_sdk_s3=DEBUG"));
    }

    #[test]
    fn test_sink_from_config() {
        assert_eq!(
            LogSink::from_config(&BackupConfig::default()),
            LogSink::Stderr
        );
        let config = BackupConfig {
            log_file: Some("/var/log/backup-s3.log".into()),
            ..Default::default()
        };
        assert_eq!(
            LogSink::from_config(&config),
            LogSink::File("/var/log/backup-s3.log".into())
        );
    }

    #[test]
    fn test_log_file_is_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup-s3.log");
        std::fs::write(&path, b"previous run\n").unwrap();

        let mut file = open_log_file(&path).unwrap();
        std::io::Write::write_all(&mut file, b"next run\n").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "previous run\nnext run\n");
    }

    #[test]
    fn test_unwritable_log_file_is_config_error() {
        let config = BackupConfig {
            log_file: Some("/nonexistent-dir/backup-s3.log".into()),
            ..Default::default()
        };
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(err, BackupError::Config(_)));
    }

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("test logging active");
    }
}
