//! Tracing setup. The TUI owns the terminal, so interactive runs log JSON to a file.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "careercraft=info";
const LOG_FILE: &str = "careercraft.log";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn default_log_path(app_dir: &Path) -> PathBuf {
    app_dir.join(LOG_FILE)
}

/// JSON lines appended to `path`.
pub fn init_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(filter())
        .with(
            fmt::layer()
                .json()
                .with_writer(std::sync::Mutex::new(file))
                .with_current_span(false)
                .with_span_list(false),
        )
        .try_init()
        .context("logging already initialised")
}

/// Plain text on stderr so stdout stays clean for `--json`.
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("logging already initialised")
}
