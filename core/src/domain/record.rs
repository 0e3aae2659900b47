//! Records - one tracked consumable item and its current attribute values

use super::category::Category;
use super::schema;
use crate::common::errors::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const CATEGORY_KEY: &str = "category";
/// Older payloads stored the category under this key
pub const LEGACY_CATEGORY_KEY: &str = "item_type";
pub const NAME_KEY: &str = "item_name";
pub const DESCRIPTION_KEY: &str = "description";
pub const IMAGE_KEY: &str = "image_path";
pub const ENTRY_DATE_KEY: &str = "entry_date";

/// Format of `entry_date`
pub const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Stable identity of a record, also used as its device grouping key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}

	pub fn from_uuid(id: Uuid) -> Self {
		Self(id)
	}

	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}

impl Default for RecordId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for RecordId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for RecordId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Uuid::parse_str(s).map(Self)
	}
}

/// The flat key/value document a record is persisted as
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordPayload(Map<String, Value>);

impl RecordPayload {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(key.into(), value.into())
	}

	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.0.remove(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &String> {
		self.0.keys()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Map<String, Value>> for RecordPayload {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

/// A consumable item, validated against its category schema
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
	pub category: Category,
	pub name: String,
	/// `None` when the stored payload had no such key
	pub description: Option<String>,
	pub image_reference: String,
	pub creation_date: Option<String>,
	/// Category attributes plus the common ones (`amount`), keyed by attribute name
	pub attributes: BTreeMap<String, Value>,
}

impl Record {
	/// Parse and validate a stored payload.
	///
	/// `category`, `item_name` and `image_path` are required; every other key has
	/// to be one of the category's record attributes.
	pub fn from_payload(payload: &RecordPayload) -> Result<Self> {
		let category = match payload
			.get(CATEGORY_KEY)
			.or_else(|| payload.get(LEGACY_CATEGORY_KEY))
		{
			Some(Value::String(name)) => Category::parse(name)?,
			Some(other) => {
				return Err(TrackerError::InvalidRecord(format!(
					"`{CATEGORY_KEY}` must be a string, got {other}"
				)))
			}
			None => return Err(missing(CATEGORY_KEY)),
		};

		let name = required_text(payload, NAME_KEY)?;
		let image_reference = required_text(payload, IMAGE_KEY)?;
		let description = optional_text(payload, DESCRIPTION_KEY)?;
		let creation_date = optional_text(payload, ENTRY_DATE_KEY)?;

		let mut attributes = BTreeMap::new();
		for (key, value) in payload.0.iter() {
			if is_identity_key(key) {
				continue;
			}
			if schema::definition(category, key).is_none() {
				return Err(TrackerError::InvalidRecord(format!(
					"`{key}` is not an attribute of {category}"
				)));
			}
			attributes.insert(key.clone(), value.clone());
		}

		Ok(Self {
			category,
			name,
			description,
			image_reference,
			creation_date,
			attributes,
		})
	}

	/// Flatten back into the persisted layout
	pub fn to_payload(&self) -> RecordPayload {
		let mut payload = RecordPayload::new();
		payload.insert(CATEGORY_KEY, self.category.to_string());
		payload.insert(NAME_KEY, self.name.clone());
		if let Some(description) = &self.description {
			payload.insert(DESCRIPTION_KEY, description.clone());
		}
		payload.insert(IMAGE_KEY, self.image_reference.clone());
		if let Some(creation_date) = &self.creation_date {
			payload.insert(ENTRY_DATE_KEY, creation_date.clone());
		}
		for (key, value) in &self.attributes {
			payload.insert(key.clone(), value.clone());
		}
		payload
	}

	/// Current amount on hand, if it is stored as an integer
	pub fn amount(&self) -> Option<i64> {
		self.attributes.get("amount").and_then(Value::as_i64)
	}

	/// Overwrite the value stored under `key`.
	///
	/// Identity fields only accept strings so the record stays valid; attribute
	/// values are stored verbatim.
	pub fn set(&mut self, key: &str, value: Value) -> std::result::Result<(), String> {
		if !is_identity_key(key) {
			if schema::definition(self.category, key).is_none() {
				return Err(format!("`{key}` is not an attribute of {}", self.category));
			}
			self.attributes.insert(key.to_string(), value);
			return Ok(());
		}

		let text = match value {
			Value::String(text) => text,
			other => return Err(format!("`{key}` must be a string, got {other}")),
		};
		match key {
			NAME_KEY => self.name = text,
			DESCRIPTION_KEY => self.description = Some(text),
			IMAGE_KEY => self.image_reference = text,
			ENTRY_DATE_KEY => self.creation_date = Some(text),
			_ => return Err("the category of a record can't change".to_string()),
		}
		Ok(())
	}
}

fn is_identity_key(key: &str) -> bool {
	matches!(
		key,
		CATEGORY_KEY | LEGACY_CATEGORY_KEY | NAME_KEY | DESCRIPTION_KEY | IMAGE_KEY | ENTRY_DATE_KEY
	)
}

fn missing(key: &str) -> TrackerError {
	TrackerError::InvalidRecord(format!("missing required field `{key}`"))
}

fn required_text(payload: &RecordPayload, key: &str) -> Result<String> {
	match payload.get(key) {
		Some(Value::String(text)) => Ok(text.clone()),
		None | Some(Value::Null) => Err(missing(key)),
		Some(other) => Err(TrackerError::InvalidRecord(format!(
			"`{key}` must be a string, got {other}"
		))),
	}
}

fn optional_text(payload: &RecordPayload, key: &str) -> Result<Option<String>> {
	match payload.get(key) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(text)) => Ok(Some(text.clone())),
		Some(other) => Err(TrackerError::InvalidRecord(format!(
			"`{key}` must be a string, got {other}"
		))),
	}
}
