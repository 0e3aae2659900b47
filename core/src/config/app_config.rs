//! Tracker configuration

use super::Migrate;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CONFIG_FILE: &str = "tracker.json";

/// Log level of a fresh configuration
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
	/// Config schema version
	pub version: u32,

	/// Data directory path
	pub data_dir: PathBuf,

	/// Logging level
	pub log_level: String,

	/// Capacity of the event bus channel
	#[serde(default = "default_event_capacity")]
	pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
	1024
}

impl TrackerConfig {
	/// Parse the stored configuration, if any, without creating or migrating it
	pub fn read(data_dir: &Path) -> Result<Option<Self>> {
		let config_path = data_dir.join(CONFIG_FILE);
		if !config_path.exists() {
			return Ok(None);
		}

		let json = fs::read_to_string(&config_path)?;
		let mut config: TrackerConfig = serde_json::from_str(&json)?;

		// The directory it was loaded from wins over a stale stored path
		config.data_dir = data_dir.to_path_buf();
		Ok(Some(config))
	}

	/// Load configuration from a specific data directory, creating it if absent
	pub fn load_from(data_dir: &Path) -> Result<Self> {
		let config_path = data_dir.join(CONFIG_FILE);

		match Self::read(data_dir)? {
			Some(mut config) => {
				info!("Loaded config from {:?}", config_path);

				if config.needs_migration() {
					info!(
						"Migrating config from v{} to v{}",
						config.version,
						Self::target_version()
					);
					config.migrate()?;
					config.save()?;
				}

				Ok(config)
			}
			None => {
				warn!("No config found, creating default at {:?}", config_path);
				let config = Self::default_with_dir(data_dir.to_path_buf());
				config.save()?;
				Ok(config)
			}
		}
	}

	/// Create default configuration with specific data directory
	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: Self::target_version(),
			data_dir,
			log_level: DEFAULT_LOG_LEVEL.to_string(),
			event_capacity: default_event_capacity(),
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;

		let config_path = self.data_dir.join(CONFIG_FILE);
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json)?;
		info!("Saved config to {:?}", config_path);
		Ok(())
	}

	/// Directory holding one payload per record
	pub fn records_dir(&self) -> PathBuf {
		self.data_dir.join("records")
	}

	/// Get the path for logs directory
	pub fn logs_dir(&self) -> PathBuf {
		Self::logs_dir_for(&self.data_dir)
	}

	/// Logs directory of `data_dir`, usable before the config is loaded
	pub fn logs_dir_for(data_dir: &Path) -> PathBuf {
		data_dir.join("logs")
	}

	/// Ensure all required directories exist
	pub fn ensure_directories(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;
		fs::create_dir_all(self.records_dir())?;
		fs::create_dir_all(self.logs_dir())?;
		Ok(())
	}
}

impl Migrate for TrackerConfig {
	fn current_version(&self) -> u32 {
		self.version
	}

	fn target_version() -> u32 {
		1
	}

	fn migrate(&mut self) -> Result<()> {
		match self.version {
			0 => {
				// v0 had no event_capacity; serde already filled the default
				self.version = 1;
				Ok(())
			}
			1 => Ok(()),
			v => Err(anyhow!("Unknown config version: {}", v)),
		}
	}
}
