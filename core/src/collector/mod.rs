//! Input collector contract
//!
//! The two-step flow that gathers a new item: pick a category, then fill in the
//! mandatory fields plus the category's schema fields. Submitting stamps the
//! entry date, coerces every value exactly once and hands back the finalized
//! payload the tracker attaches as-is.

use crate::common::errors::{Result, TrackerError};
use crate::domain::record::{
	CATEGORY_KEY, DESCRIPTION_KEY, ENTRY_DATE_FORMAT, ENTRY_DATE_KEY, IMAGE_KEY, NAME_KEY,
};
use crate::domain::schema::{self, ValueKind};
use crate::domain::{Category, RecordPayload};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Raw field values as submitted
pub type FormInput = Map<String, Value>;

/// One field presented by the details step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
	pub key: &'static str,
	#[serde(skip)]
	pub kind: ValueKind,
	pub required: bool,
	/// Pre-filled value, `None` for required fields without a default
	pub default: Option<Value>,
}

impl FormField {
	const fn required_text(key: &'static str) -> Self {
		Self {
			key,
			kind: ValueKind::Text,
			required: true,
			default: None,
		}
	}
}

/// Begin a new item flow
pub fn start() -> CategoryStep {
	CategoryStep
}

/// Step one: choose the category
#[derive(Debug, Default)]
pub struct CategoryStep;

impl CategoryStep {
	pub fn choices(&self) -> Vec<Category> {
		Category::all().collect()
	}

	/// Select by name; fails with `UnknownCategory` for anything outside the fixed set
	pub fn select(self, category: &str) -> Result<DetailsStep> {
		let category = Category::parse(category)?;
		debug!("Selected item type: {}", category);
		Ok(self.select_category(category))
	}

	pub fn select_category(self, category: Category) -> DetailsStep {
		DetailsStep { category }
	}
}

/// Step two: item details for the chosen category
#[derive(Debug)]
pub struct DetailsStep {
	category: Category,
}

impl DetailsStep {
	pub fn category(&self) -> Category {
		self.category
	}

	/// Mandatory fields followed by the schema registry's fields for the category
	pub fn fields(&self) -> Vec<FormField> {
		let mut fields = vec![
			FormField::required_text(NAME_KEY),
			FormField {
				key: DESCRIPTION_KEY,
				kind: ValueKind::Text,
				required: false,
				default: Some(Value::String(String::new())),
			},
			FormField::required_text(IMAGE_KEY),
		];

		fields.extend(
			schema::record_attributes(self.category).map(|def| FormField {
				key: def.name,
				kind: def.kind,
				required: false,
				default: Some(def.raw_default()),
			}),
		);

		fields
	}

	/// Finalize with today's date on the local clock
	pub fn submit(self, input: &FormInput) -> Result<RecordPayload> {
		self.submit_on(input, Local::now().date_naive())
	}

	/// Finalize with an explicit entry date
	pub fn submit_on(self, input: &FormInput, entry_date: NaiveDate) -> Result<RecordPayload> {
		let category = self.category;

		if let Some(unknown) = input.keys().find(|key| !self.accepts(key)) {
			return Err(TrackerError::InvalidFieldValue {
				field: unknown.clone(),
				reason: format!("not a field of {category}"),
			});
		}

		let mut payload = RecordPayload::new();
		payload.insert(CATEGORY_KEY, category.to_string());
		payload.insert(NAME_KEY, required_text(input, NAME_KEY)?);
		payload.insert(DESCRIPTION_KEY, optional_text(input, DESCRIPTION_KEY)?);
		payload.insert(ENTRY_DATE_KEY, entry_date.format(ENTRY_DATE_FORMAT).to_string());
		payload.insert(IMAGE_KEY, required_text(input, IMAGE_KEY)?);

		for def in schema::record_attributes(category) {
			payload.insert(def.name, def.coerce(input.get(def.name))?);
		}

		debug!("Creating entry with data: {:?}", payload);
		Ok(payload)
	}

	fn accepts(&self, key: &str) -> bool {
		matches!(key, NAME_KEY | DESCRIPTION_KEY | IMAGE_KEY)
			|| schema::definition(self.category, key).is_some()
	}
}

fn required_text(input: &FormInput, key: &str) -> Result<String> {
	match input.get(key) {
		None | Some(Value::Null) => Err(TrackerError::MissingField(key.to_string())),
		Some(Value::String(text)) => Ok(text.clone()),
		Some(other) => Err(TrackerError::InvalidFieldValue {
			field: key.to_string(),
			reason: format!("expected text, got {other}"),
		}),
	}
}

fn optional_text(input: &FormInput, key: &str) -> Result<String> {
	match input.get(key) {
		None | Some(Value::Null) => Ok(String::new()),
		Some(_) => required_text(input, key),
	}
}
