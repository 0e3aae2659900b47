use anyhow::{anyhow, bail, Result};
use sst_core::config::DEFAULT_LOG_LEVEL;
use sst_core::infra::logging::{init_logging, WorkerGuard};
use sst_core::{Event, EventBus, LocalHost, RecordId, RecordStore, Tracker, TrackerConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
	Human,
	Json,
}

/// Everything a command needs: the running tracker and the host it drives
pub struct Context {
	pub format: OutputFormat,
	pub events: EventBus,
	pub host: Arc<LocalHost>,
	pub tracker: Tracker,
	_log_guard: WorkerGuard,
}

impl Context {
	/// Bring the tracker up and attach every stored record
	pub async fn start(data_dir: &Path, format: OutputFormat) -> Result<Self> {
		// Logging must be up before the config is loaded
		let log_level = TrackerConfig::read(data_dir)?
			.map_or_else(|| DEFAULT_LOG_LEVEL.to_string(), |config| config.log_level);
		let log_guard = init_logging(&TrackerConfig::logs_dir_for(data_dir), &log_level)?;

		let config = TrackerConfig::load_from(data_dir)?;
		config.ensure_directories()?;

		let events = EventBus::new(config.event_capacity);
		let host = Arc::new(LocalHost::new(
			RecordStore::new(config.records_dir()),
			events.clone(),
		));
		let mut tracker = Tracker::new(host.clone()).with_events(events.clone());

		let stored = host.store().load_all().await?;
		let report = tracker.restore(stored).await;
		for (record_id, e) in &report.failed {
			warn!("Record {} could not be restored: {}", record_id, e);
		}
		info!(
			"Tracker started with {} records from {:?}",
			report.attached.len(),
			config.data_dir
		);
		events.emit(Event::TrackerStarted);

		Ok(Self {
			format,
			events,
			host,
			tracker,
			_log_guard: log_guard,
		})
	}

	pub fn store(&self) -> &RecordStore {
		self.host.store()
	}

	/// Resolve a full record id or an unambiguous prefix of one
	pub fn resolve_record(&self, needle: &str) -> Result<RecordId> {
		if let Ok(record_id) = needle.parse::<RecordId>() {
			return Ok(record_id);
		}

		let matches: Vec<RecordId> = self
			.tracker
			.active()
			.ids()
			.into_iter()
			.filter(|id| id.to_string().starts_with(needle))
			.collect();

		match matches.as_slice() {
			[record_id] => Ok(*record_id),
			[] => Err(anyhow!("No item matches '{}'", needle)),
			_ => bail!("'{}' matches {} items, use a longer prefix", needle, matches.len()),
		}
	}

	pub fn shutdown(&self) {
		self.events.emit(Event::TrackerShutdown);
		info!("Tracker shut down");
	}
}
