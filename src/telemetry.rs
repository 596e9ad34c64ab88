use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::session::app_cache_dir;

const LOG_FILE: &str = "wc26_pool.log";
const LOG_ENV: &str = "WC_LOG";

/// Send `tracing` output to a log file in the cache dir; the terminal belongs to the UI.
pub fn init_tracing() -> Result<()> {
    let Some(dir) = app_cache_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&dir).context("create log dir")?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
        .context("open log file")?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("init tracing: {err}"))
}
