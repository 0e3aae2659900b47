//! Durable storage of record payloads, one JSON document per record

use crate::common::errors::HostError;
use crate::domain::{RecordId, RecordPayload};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct RecordStore {
	dir: PathBuf,
}

impl RecordStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	fn path_for(&self, record_id: RecordId) -> PathBuf {
		self.dir.join(format!("{record_id}.{EXTENSION}"))
	}

	/// Store a new payload under a fresh identity
	pub async fn create(&self, payload: &RecordPayload) -> Result<RecordId, HostError> {
		let record_id = RecordId::new();
		self.write(record_id, payload).await?;
		Ok(record_id)
	}

	/// Overwrite the whole payload of `record_id`.
	///
	/// The document is written next to the target and renamed over it, so a
	/// reader sees either the old payload or the new one.
	pub async fn write(
		&self,
		record_id: RecordId,
		payload: &RecordPayload,
	) -> Result<(), HostError> {
		fs::create_dir_all(&self.dir).await?;

		let path = self.path_for(record_id);
		let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
		let json = serde_json::to_string_pretty(payload)?;

		fs::write(&tmp, json).await?;
		fs::rename(&tmp, &path).await?;

		debug!("Saved record {} to {:?}", record_id, path);
		Ok(())
	}

	pub async fn read(&self, record_id: RecordId) -> Result<Option<RecordPayload>, HostError> {
		let path = self.path_for(record_id);
		match fs::read_to_string(&path).await {
			Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	/// Delete a stored payload, returns whether one existed
	pub async fn remove(&self, record_id: RecordId) -> Result<bool, HostError> {
		match fs::remove_file(self.path_for(record_id)).await {
			Ok(()) => Ok(true),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
			Err(e) => Err(e.into()),
		}
	}

	/// Every stored payload, sorted by identity. Unreadable documents are skipped.
	pub async fn load_all(&self) -> Result<Vec<(RecordId, RecordPayload)>, HostError> {
		let mut records = Vec::new();

		let mut entries = match fs::read_dir(&self.dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(records),
			Err(e) => return Err(e.into()),
		};

		while let Some(entry) = entries.next_entry().await? {
			let path = entry.path();
			if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
				continue;
			}

			let Some(record_id) = path
				.file_stem()
				.and_then(|s| s.to_str())
				.and_then(|s| s.parse::<RecordId>().ok())
			else {
				warn!("Skipping {:?}: file name is not a record id", path);
				continue;
			};

			let payload = match fs::read_to_string(&path).await {
				Ok(json) => serde_json::from_str::<RecordPayload>(&json),
				Err(e) => {
					warn!("Skipping {:?}: {}", path, e);
					continue;
				}
			};

			match payload {
				Ok(payload) => records.push((record_id, payload)),
				Err(e) => warn!("Skipping {:?}: {}", path, e),
			}
		}

		records.sort_by_key(|(id, _)| *id);
		Ok(records)
	}
}
