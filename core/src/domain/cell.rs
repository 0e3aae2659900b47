//! Attribute cells - independently addressable views onto one record attribute

use super::device::DeviceId;
use super::record::{Record, RecordId, DESCRIPTION_KEY, ENTRY_DATE_KEY, IMAGE_KEY, NAME_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Globally unique, stable identifier of a cell.
///
/// Derived from `(record identity, attribute name)`: the record id, an
/// underscore, then the lowercased attribute name with whitespace replaced by
/// underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(String);

impl CellId {
	pub fn new(record_id: RecordId, attribute_name: &str) -> Self {
		let slug = attribute_name
			.to_lowercase()
			.split_whitespace()
			.collect::<Vec<_>>()
			.join("_");
		Self(format!("{record_id}_{slug}"))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CellId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for CellId {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

impl From<String> for CellId {
	fn from(s: String) -> Self {
		Self(s)
	}
}

/// The four identity fields every record exposes, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityField {
	Name,
	Description,
	ImagePath,
	EntryDate,
}

impl IdentityField {
	pub const ALL: [IdentityField; 4] = [
		IdentityField::Name,
		IdentityField::Description,
		IdentityField::ImagePath,
		IdentityField::EntryDate,
	];

	/// Fixed label, also used as the cell's attribute name
	pub fn label(&self) -> &'static str {
		match self {
			Self::Name => "Name",
			Self::Description => "Description",
			Self::ImagePath => "Image Path",
			Self::EntryDate => "Entry Date",
		}
	}

	/// Key the field is persisted under
	pub fn record_key(&self) -> &'static str {
		match self {
			Self::Name => NAME_KEY,
			Self::Description => DESCRIPTION_KEY,
			Self::ImagePath => IMAGE_KEY,
			Self::EntryDate => ENTRY_DATE_KEY,
		}
	}

	pub fn value_of(&self, record: &Record) -> Value {
		let text = match self {
			Self::Name => record.name.as_str(),
			Self::Description => record.description.as_deref().unwrap_or_default(),
			Self::ImagePath => record.image_reference.as_str(),
			Self::EntryDate => record.creation_date.as_deref().unwrap_or_default(),
		};
		Value::String(text.to_string())
	}
}

/// One live (record, attribute) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeCell {
	pub cell_id: CellId,
	pub record_id: RecordId,
	pub attribute_name: String,
	pub display_label: String,
	pub current_value: Value,
	/// Name of the owning record at materialization time
	pub record_name: String,
	/// Set once the owning device is registered with the host
	pub device_id: Option<DeviceId>,
	#[serde(skip)]
	identity: Option<IdentityField>,
}

impl AttributeCell {
	pub fn identity(record_id: RecordId, field: IdentityField, record: &Record) -> Self {
		Self {
			cell_id: CellId::new(record_id, field.label()),
			record_id,
			attribute_name: field.label().to_string(),
			display_label: field.label().to_string(),
			current_value: field.value_of(record),
			record_name: record.name.clone(),
			device_id: None,
			identity: Some(field),
		}
	}

	pub fn attribute(record_id: RecordId, name: &str, value: Value, record: &Record) -> Self {
		Self {
			cell_id: CellId::new(record_id, name),
			record_id,
			attribute_name: name.to_string(),
			display_label: display_label(name),
			current_value: value,
			record_name: record.name.clone(),
			device_id: None,
			identity: None,
		}
	}

	/// Device grouping key, the owning record's identity
	pub fn grouping_key(&self) -> RecordId {
		self.record_id
	}

	/// Key in the record payload that updates to this cell are written to
	pub fn record_key(&self) -> String {
		match self.identity {
			Some(field) => field.record_key().to_string(),
			None => self.attribute_name.to_lowercase(),
		}
	}

	/// Host-visible entity name, e.g. "Glenlivet 18 Abv"
	pub fn entity_name(&self) -> String {
		format!("{} {}", self.record_name, self.display_label)
	}

	/// State as the host displays it
	pub fn state(&self) -> String {
		match &self.current_value {
			Value::String(s) => s.clone(),
			Value::Null => String::new(),
			other => other.to_string(),
		}
	}

	/// Read-only metadata published next to the state
	pub fn extra_attributes(&self) -> Map<String, Value> {
		let mut attributes = Map::new();
		if let Some(device_id) = self.device_id {
			attributes.insert("device_id".into(), Value::String(device_id.to_string()));
		}
		if self.identity == Some(IdentityField::ImagePath) {
			attributes.insert("image_url".into(), self.current_value.clone());
		}
		attributes
	}
}

/// `country_of_origin` -> `Country Of Origin`
pub fn display_label(name: &str) -> String {
	let mut label = String::with_capacity(name.len());
	let mut in_word = false;
	for c in name.replace('_', " ").chars() {
		if c.is_alphabetic() {
			if in_word {
				label.extend(c.to_lowercase());
			} else {
				label.extend(c.to_uppercase());
			}
			in_word = true;
		} else {
			label.push(c);
			in_word = false;
		}
	}
	label
}
