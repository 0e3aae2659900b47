//! Shared fixtures for tracker integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use sst_core::collector;
use sst_core::domain::{AttributeCell, DeviceId, DeviceInfo};
use sst_core::{HostError, PresentationHost, RecordId, RecordPayload};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Presentation host that records every call it receives
#[derive(Default)]
pub struct RecordingHost {
	pub devices: Mutex<Vec<DeviceInfo>>,
	pub entities: Mutex<Vec<AttributeCell>>,
	pub notified: Mutex<Vec<AttributeCell>>,
	pub persisted: Mutex<Vec<(RecordId, RecordPayload)>>,
	pub deregistered: Mutex<Vec<RecordId>>,
	/// Persist calls fail while this is set
	pub fail_persist: Mutex<bool>,
	/// Deregister calls fail while this is set
	pub fail_deregister: Mutex<bool>,
}

impl RecordingHost {
	pub fn persist_count(&self) -> usize {
		self.persisted.lock().unwrap().len()
	}

	pub fn last_persisted(&self) -> Option<(RecordId, RecordPayload)> {
		self.persisted.lock().unwrap().last().cloned()
	}

	/// Latest payload persisted per record, like a key/value store would hold
	pub fn stored(&self) -> HashMap<RecordId, RecordPayload> {
		self.persisted.lock().unwrap().iter().cloned().collect()
	}
}

#[async_trait]
impl PresentationHost for RecordingHost {
	async fn register_device(&self, info: &DeviceInfo) -> Result<DeviceId, HostError> {
		self.devices.lock().unwrap().push(info.clone());
		Ok(DeviceId(Uuid::new_v5(
			&Uuid::NAMESPACE_OID,
			info.grouping_key.as_uuid().as_bytes(),
		)))
	}

	async fn register_entities(&self, cells: &[AttributeCell]) -> Result<(), HostError> {
		self.entities.lock().unwrap().extend_from_slice(cells);
		Ok(())
	}

	async fn notify_state_changed(&self, cell: &AttributeCell) -> Result<(), HostError> {
		self.notified.lock().unwrap().push(cell.clone());
		Ok(())
	}

	async fn persist_record(
		&self,
		record_id: RecordId,
		payload: &RecordPayload,
	) -> Result<(), HostError> {
		if *self.fail_persist.lock().unwrap() {
			return Err(HostError::Io(std::io::Error::new(
				std::io::ErrorKind::Other,
				"disk full",
			)));
		}
		self.persisted
			.lock()
			.unwrap()
			.push((record_id, payload.clone()));
		Ok(())
	}

	async fn deregister(&self, record_id: RecordId) -> Result<(), HostError> {
		if *self.fail_deregister.lock().unwrap() {
			return Err(HostError::LockPoisoned);
		}
		self.deregistered.lock().unwrap().push(record_id);
		Ok(())
	}
}

pub fn entry_date() -> NaiveDate {
	NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

/// Run the collector for `category` with `fields`
pub fn collect(category: &str, fields: Value) -> RecordPayload {
	let Value::Object(input) = fields else {
		panic!("fields must be an object");
	};
	collector::start()
		.select(category)
		.unwrap()
		.submit_on(&input, entry_date())
		.unwrap()
}

pub fn glenlivet() -> RecordPayload {
	collect(
		"Whisky",
		json!({
			"item_name": "Glenlivet 18",
			"image_path": "img://1",
			"amount": 2,
			"abv": 40,
		}),
	)
}

pub fn padron() -> RecordPayload {
	collect(
		"Cigar",
		json!({
			"item_name": "Padron 1964",
			"image_path": "img://2",
			"length": 6,
			"burn_time_min": 60,
			"burn_time_max": 90,
		}),
	)
}
