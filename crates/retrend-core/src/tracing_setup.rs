use std::fs::OpenOptions;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable naming an append-only debug log file
pub const ENV_LOG_FILE: &str = "RETREND_LOG_FILE";

pub fn init_tracing() -> Result<()> {
    init_tracing_with_default("info")
}

/// Install the global subscriber: stderr filtered by `RUST_LOG` (falling back to
/// `default_directive`), plus a DEBUG file layer when `RETREND_LOG_FILE` is set.
pub fn init_tracing_with_default(default_directive: &str) -> Result<()> {
    let file_logging = std::env::var(ENV_LOG_FILE).ok();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    if let Some(log_path) = file_logging {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path))?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG);

        registry
            .with(file_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
        tracing::debug!(path = %log_path, "file logging enabled");
    } else {
        registry
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    Ok(())
}
