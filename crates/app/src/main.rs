// Logging behavior:
// - Writes logs to both stderr and a daily-rotated file at logs/voxrelay.log.
// - Default log level is INFO to reduce verbosity. Control via RUST_LOG environment variable:
//   * RUST_LOG=info                     # Standard logging (default, recommended)
//   * RUST_LOG=debug                    # Verbose debugging (includes segmenter decisions)
//   * RUST_LOG=trace                    # Maximum verbosity (includes every audio chunk)
//   * RUST_LOG=voxrelay=info,stt_debug=trace  # Fine-grained per-module control
// - The logs/ directory is created on startup if missing; file output uses a non-blocking writer.
// - File layer disables ANSI to keep logs clean for analysis.
use std::fs;
use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use voxrelay_app::session::{self, Session};
use voxrelay_app::settings::{Cli, ExitCode};
use voxrelay_app::transcript_log::TranscriptLog;
use voxrelay_foundation::VoxRelayError;

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard, Box<dyn std::error::Error>>
{
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "voxrelay.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let file_layer = fmt::layer().with_writer(non_blocking_file).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(guard)
}

/// Prune rotated log files in `logs/` older than `retention_days` days.
/// If `retention_days` is `Some(0)` pruning is disabled. Default is 7 days when `None`.
fn prune_old_logs(retention_days: Option<u64>) {
    let retention = retention_days.unwrap_or(7);
    if retention == 0 {
        tracing::debug!("Log retention disabled (retention_days=0)");
        return;
    }

    let cutoff = match SystemTime::now().checked_sub(Duration::from_secs(retention * 24 * 60 * 60))
    {
        Some(t) => t,
        None => return,
    };

    let logs_dir = Path::new("logs");
    if !logs_dir.exists() {
        return;
    }

    match fs::read_dir(logs_dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let path = entry.path();
                if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                    if name.starts_with("voxrelay.log.") {
                        if let Ok(meta) = entry.metadata() {
                            if let Ok(modified) = meta.modified() {
                                if modified < cutoff {
                                    if let Err(e) = fs::remove_file(&path) {
                                        tracing::warn!(
                                            "Failed to remove old log {}: {}",
                                            path.display(),
                                            e
                                        );
                                    } else {
                                        tracing::info!("Removed old log file: {}", path.display());
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        Err(e) => tracing::warn!("Failed to read logs directory for pruning: {}", e),
    }
}

#[tokio::main]
async fn main() {
    let _guard = match init_logging() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            std::process::exit(ExitCode::Fatal as i32);
        }
    };

    let retention_days = std::env::var("VOXRELAY_LOG_RETENTION_DAYS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok());
    prune_old_logs(retention_days);

    let cli = Cli::parse();

    if cli.list_devices {
        if let Err(e) = session::list_input_devices() {
            eprintln!("error listing devices: {e}");
            std::process::exit(ExitCode::Fatal as i32);
        }
        std::process::exit(ExitCode::Clean as i32);
    }

    if let Err(msg) = cli.validate() {
        eprintln!("configuration error: {msg}");
        std::process::exit(ExitCode::Configuration as i32);
    }

    let transcript_log = match TranscriptLog::open(&cli.log_file) {
        Ok(log) => std::sync::Arc::new(log),
        Err(e) => {
            eprintln!("configuration error: cannot open transcript log: {e}");
            std::process::exit(ExitCode::Configuration as i32);
        }
    };

    let session = match Session::start(&cli, transcript_log).await {
        Ok(s) => s,
        Err(VoxRelayError::Config(e)) => {
            eprintln!("configuration error: {e}");
            std::process::exit(ExitCode::Configuration as i32);
        }
        Err(e) => {
            eprintln!("fatal error starting pipeline: {e}");
            std::process::exit(ExitCode::Fatal as i32);
        }
    };

    tracing::info!(
        input_language = %cli.input_language,
        target_language = %cli.target_language,
        transcriber = ?cli.transcriber,
        tts_provider = ?cli.tts_provider,
        "voxrelay session started"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
    }

    tracing::info!("shutdown requested, draining pipeline");
    session.stop().await;
    std::process::exit(ExitCode::Clean as i32);
}
