/*!
 * backup-s3 CLI
 *
 * Checks bucket access, uploads backup files from the configured location
 * and exports AWS credentials for tooling that reads them from the
 * environment.
 */

use backup_s3::{
    config::{BackupConfig, LogLevel},
    error::{Result, EXIT_SUCCESS},
    logging, BackupUploader,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(name = "backup-s3")]
#[command(version, about = "Upload backup files to S3 and S3-compatible storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory backup file names are resolved against (env: LOCATION)
    #[arg(long, value_name = "DIR", global = true)]
    location: Option<PathBuf>,

    /// Custom S3 endpoint; enables path-style addressing (env: ENDPOINT)
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,

    /// AWS region (env: AWS_REGION)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Number of files uploaded at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Whole-operation S3 deadline in seconds (default: none)
    #[arg(long, value_name = "SECONDS", global = true)]
    timeout: Option<u64>,

    /// Log level
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevelArg>,

    /// Path to log file (default: stderr)
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging (equivalent to --log-level=debug)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify that a bucket address is reachable
    Check {
        /// Bucket, optionally followed by a virtual sub-bucket (demo/nightly)
        #[arg(value_name = "BUCKET_ADDRESS")]
        address: String,
    },

    /// Upload files to a bucket address, failing on the first error
    Upload {
        #[arg(value_name = "BUCKET_ADDRESS")]
        address: String,

        /// File names relative to the backup location
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Print retrieved AWS credentials as shell exports
    ExportCredentials,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let uploader = BackupUploader::from_config(&config).await?;

    let token = uploader.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            token.cancel();
        }
    });

    match cli.command {
        Commands::Check { address } => {
            uploader.check_access(&address).await?;
            println!("Bucket {} is accessible", address);
        }
        Commands::Upload { address, files } => {
            uploader.check_access(&address).await?;
            let report = uploader.upload_files(&files, &address).await?;
            for object in &report.uploaded {
                println!(
                    "{} -> s3://{}/{} ({}, {} bytes)",
                    object.file_name, object.bucket, object.key, object.strategy, object.size_bytes
                );
            }
            println!(
                "Uploaded {} file(s), {} bytes total",
                report.len(),
                report.total_bytes()
            );
        }
        Commands::ExportCredentials => {
            let mut exported: HashMap<String, String> = HashMap::new();
            uploader.export_credentials_to(&mut exported).await?;
            let mut keys: Vec<_> = exported.keys().cloned().collect();
            keys.sort();
            for key in keys {
                println!("export {}={}", key, shell_quote(&exported[&key]));
            }
        }
    }

    Ok(())
}

/// Config file (or defaults), then environment, then command line
fn build_config(cli: &Cli) -> Result<BackupConfig> {
    let base = match cli.config {
        Some(ref path) => BackupConfig::from_file(path)?,
        None => BackupConfig::default(),
    };
    let mut config = base.merge_env(|key| std::env::var(key).ok());

    if let Some(ref location) = cli.location {
        config.location = location.clone();
    }
    if let Some(ref endpoint) = cli.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    if let Some(ref region) = cli.region {
        config.region = Some(region.clone());
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_seconds = Some(timeout);
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if let Some(ref log_file) = cli.log_file {
        config.log_file = Some(log_file.clone());
    }
    config.verbose |= cli.verbose;

    config.validate()?;
    Ok(config)
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
