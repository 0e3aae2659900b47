use anyhow::{anyhow, Result};
use clap::Args;
use serde_json::Value;
use sst_core::collector::FormInput;

use crate::util::prelude::parse_value;

#[derive(Args, Debug)]
pub struct AddArgs {
	/// Category of the new item
	pub category: String,

	/// Name of the item
	#[arg(long)]
	pub name: String,

	/// Path or URL of a picture of the item
	#[arg(long)]
	pub image: String,

	#[arg(long)]
	pub description: Option<String>,

	/// How many are on hand
	#[arg(long)]
	pub amount: Option<i64>,

	/// Category attribute as `key=value`, may be repeated
	#[arg(long = "set", value_name = "KEY=VALUE")]
	pub attributes: Vec<String>,
}

impl AddArgs {
	pub fn to_input(&self) -> Result<FormInput> {
		let mut input = FormInput::new();
		input.insert("item_name".into(), Value::String(self.name.clone()));
		input.insert("image_path".into(), Value::String(self.image.clone()));
		if let Some(description) = &self.description {
			input.insert("description".into(), Value::String(description.clone()));
		}
		if let Some(amount) = self.amount {
			input.insert("amount".into(), Value::from(amount));
		}

		for pair in &self.attributes {
			let (key, value) = pair
				.split_once('=')
				.ok_or_else(|| anyhow!("Expected key=value, got '{}'", pair))?;
			input.insert(key.trim().to_string(), parse_value(value));
		}

		Ok(input)
	}
}

#[derive(Args, Debug)]
pub struct RecordArgs {
	/// Record id, or an unambiguous prefix of it
	pub record: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
	/// Entity id of the attribute, e.g. `<record id>_abv`
	pub entity_id: String,

	/// New value; parsed as JSON, taken as text otherwise
	pub value: String,
}
