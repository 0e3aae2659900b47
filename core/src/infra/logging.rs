//! Tracing setup: console output plus a daily rolling log file

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::{
	filter::LevelFilter,
	fmt::{self, Layer},
	prelude::*,
	EnvFilter,
};

pub use tracing_appender::non_blocking::WorkerGuard;

#[cfg(debug_assertions)]
const FILE_LOG_FILTER: LevelFilter = LevelFilter::DEBUG;

#[cfg(not(debug_assertions))]
const FILE_LOG_FILTER: LevelFilter = LevelFilter::INFO;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise our crates log at `level` and everything
/// else at `warn`. Keep the returned guard alive or buffered file output is lost.
pub fn init_logging(logs_dir: &Path, level: &str) -> Result<WorkerGuard> {
	std::fs::create_dir_all(logs_dir)?;

	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(format!(
			"warn,sst_core={level},sst_cli={level},sip_and_smoke={level}"
		))
		.map_err(|e| anyhow!("Invalid log level {level:?}: {e}"))?,
	};

	let (non_blocking, guard) = tracing_appender::non_blocking(rolling::daily(logs_dir, "log"));

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_writer(std::io::stderr))
		.with(
			Layer::default()
				.with_writer(non_blocking)
				.with_ansi(false)
				.with_filter(FILE_LOG_FILTER),
		)
		.try_init()
		.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

	Ok(guard)
}
