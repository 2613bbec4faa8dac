//! Log setup. The terminal belongs to the TUI, so logs go to a file.

use std::{fs::File, sync::Mutex};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

/// File the binary appends its log to.
pub const LOG_FILE: &str = "pentaseq.log";

/// Environment variable holding the log filter, e.g. `PENTASEQ_LOG=debug`.
pub const LOG_ENV: &str = "PENTASEQ_LOG";

pub fn init() -> EyreResult<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(LOG_FILE)
        .wrap_err_with(|| format!("failed to open log file {LOG_FILE}"))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(())
}
