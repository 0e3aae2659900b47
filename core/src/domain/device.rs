//! Host-visible devices
//!
//! Every record shows up on the presentation host as one device, and all of the
//! record's cells are grouped under it.

use super::category::Category;
use super::record::{Record, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Manufacturer tag carried by every device the tracker registers
pub const MANUFACTURER: &str = "Sip and Smoke Tracker";

/// Identifier the host assigned to a registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub Uuid);

impl fmt::Display for DeviceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// What the host needs to know to register a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
	/// Grouping key, the owning record's identity
	pub grouping_key: RecordId,

	/// Always [`MANUFACTURER`]
	pub manufacturer: String,

	/// Display name, the record's name
	pub name: String,

	/// Host-visible model, the record's category
	pub model: Category,
}

impl DeviceInfo {
	pub fn for_record(record_id: RecordId, record: &Record) -> Self {
		Self {
			grouping_key: record_id,
			manufacturer: MANUFACTURER.to_string(),
			name: record.name.clone(),
			model: record.category,
		}
	}
}
