use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the platform data directory
pub const DATA_DIR_ENV: &str = "SIP_AND_SMOKE_DATA_DIR";

/// Platform-specific data directory resolution
pub fn default_data_dir() -> Result<PathBuf> {
	if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
		return ensure_dir(PathBuf::from(dir));
	}

	#[cfg(target_os = "macos")]
	let dir = dirs::data_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("sip-and-smoke");

	#[cfg(target_os = "windows")]
	let dir = dirs::data_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("SipAndSmoke");

	#[cfg(not(any(target_os = "macos", target_os = "windows")))]
	let dir = dirs::data_local_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("sip-and-smoke");

	ensure_dir(dir)
}

/// Create `dir` if it doesn't exist and hand it back
pub fn ensure_dir(dir: impl AsRef<Path>) -> Result<PathBuf> {
	let dir = dir.as_ref();
	fs::create_dir_all(dir)
		.map_err(|e| anyhow!("Could not create data directory {}: {}", dir.display(), e))?;
	Ok(dir.to_path_buf())
}
