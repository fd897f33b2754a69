//! Logging to stderr and a per-session log file.
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Platform cache directory for session logs.
///
/// - Windows: `%LOCALAPPDATA%\eobot\cache\logs`
/// - Linux: `~/.cache/eobot/logs`
/// - Fallback: `./eobot-logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "eobot")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./eobot-logs"))
}

/// Initializes the global subscriber and returns the session directory.
pub fn setup_logging(session_id: &Option<String>) -> Result<PathBuf> {
    let session_id = session_id.clone().unwrap_or_else(|| {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        format!("session_{}", timestamp)
    });

    let session_dir = log_dir().join(&session_id);
    std::fs::create_dir_all(&session_dir)?;

    let file_appender = tracing_appender::rolling::never(&session_dir, "eobot.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    // Leak the guard to keep the file writer alive for the whole run
    std::mem::forget(guard);

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}", session_dir.join("eobot.log").display());

    Ok(session_dir)
}
