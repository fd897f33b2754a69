//! eobot command-line entry point.
//!
//! Startup is strictly ordered and every failure here is fatal: load the
//! environment, initialize logging, read calibration, pick and attach to the
//! game process. The perception loop then runs on a blocking thread until
//! Ctrl+C (observed at the next tick boundary) or until memory reads keep
//! failing. A JSON run summary is written next to the session log.
mod logging;
mod process;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use bot_runtime::{
    BotBuilder, BotConfig, Calibration, GameProcess, KeyboardInjector, RunSummary, SystemClock,
    find_processes, focus_window,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = BotConfig::from_env()?;
    let session_dir = logging::setup_logging(&config.session_id)?;

    info!("Starting eobot");
    info!("Calibration directory: {}", config.calibration_dir.display());

    let calibration =
        Calibration::load_files(&config.mob_address_path(), &config.player_address_path())?;

    let pid = match config.pid {
        Some(pid) => pid,
        None => {
            let candidates = find_processes(&config.process_name)?;
            process::choose_process(
                &config.process_name,
                candidates,
                io::stdin().lock(),
                io::stdout(),
            )?
            .pid
        }
    };
    info!("Using process {}", pid);

    if config.focus_window && !focus_window(pid) {
        warn!("Continuing without focusing the game window");
    }

    let game = GameProcess::attach(pid).with_context(|| format!("attaching to process {pid}"))?;

    let cancel = Arc::new(AtomicBool::new(false));
    let mut bot = BotBuilder::new(config)
        .calibration(calibration)
        .cancel_token(Arc::clone(&cancel))
        .build(game, KeyboardInjector::new(), SystemClock)?;

    let interrupt = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current tick");
            interrupt.store(true, Ordering::SeqCst);
        }
    });

    let (result, summary) = tokio::task::spawn_blocking(move || {
        let result = bot.run();
        (result, bot.summary())
    })
    .await?;

    write_summary(&session_dir, &summary)?;
    result?;
    Ok(())
}

fn write_summary(dir: &Path, summary: &RunSummary) -> Result<()> {
    let path = dir.join("summary.json");
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!("Run summary: {}", path.display());
    Ok(())
}
