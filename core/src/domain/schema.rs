//! Schema Registry - static table of attribute definitions per category
//!
//! This is the single place that decides which fields apply to which category.
//! The input collector builds its form from it and the materializer builds its
//! cells from it, so the two can't drift apart.

use super::category::Category;
use crate::common::errors::{Result, TrackerError};
use serde_json::{Number, Value};

/// How an attribute's value is interpreted at creation time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
	Text,
	Integer,
	Decimal,
	/// Integer stored pre-formatted with the given suffix appended
	IntegerWithUnit(&'static str),
	/// Decimal stored pre-formatted with the given suffix appended
	DecimalWithUnit(&'static str),
}

/// Value used when the collector receives nothing for an attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
	Text(&'static str),
	Integer(i64),
	Decimal(f64),
}

/// One typed attribute of a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeDefinition {
	pub name: &'static str,
	pub kind: ValueKind,
	pub default: DefaultValue,
}

impl AttributeDefinition {
	const fn text(name: &'static str, default: &'static str) -> Self {
		Self {
			name,
			kind: ValueKind::Text,
			default: DefaultValue::Text(default),
		}
	}

	const fn integer(name: &'static str, default: i64) -> Self {
		Self {
			name,
			kind: ValueKind::Integer,
			default: DefaultValue::Integer(default),
		}
	}

	const fn integer_with_unit(name: &'static str, unit: &'static str) -> Self {
		Self {
			name,
			kind: ValueKind::IntegerWithUnit(unit),
			default: DefaultValue::Integer(0),
		}
	}

	const fn decimal_with_unit(name: &'static str, unit: &'static str) -> Self {
		Self {
			name,
			kind: ValueKind::DecimalWithUnit(unit),
			default: DefaultValue::Decimal(0.0),
		}
	}

	/// Unit suffix appended at creation, if any
	pub fn unit(&self) -> Option<&'static str> {
		match self.kind {
			ValueKind::IntegerWithUnit(unit) | ValueKind::DecimalWithUnit(unit) => Some(unit),
			_ => None,
		}
	}

	/// Human readable label, e.g. `country_of_origin` -> `Country Of Origin`
	pub fn label(&self) -> String {
		super::cell::display_label(self.name)
	}

	/// The default in its raw (unformatted) form, as a form would pre-fill it
	pub fn raw_default(&self) -> Value {
		match self.default {
			DefaultValue::Text(text) => Value::String(text.to_string()),
			DefaultValue::Integer(n) => Value::from(n),
			DefaultValue::Decimal(n) => Number::from_f64(n).map_or(Value::Null, Value::Number),
		}
	}

	/// Turn raw collector input into the value that gets stored.
	///
	/// This is the only place numeric parsing and unit formatting happen; stored
	/// values are never reformatted afterwards.
	pub fn coerce(&self, raw: Option<&Value>) -> Result<Value> {
		let default = self.raw_default();
		let raw = match raw {
			None | Some(Value::Null) => &default,
			Some(value) => value,
		};

		match self.kind {
			ValueKind::Text => Ok(Value::String(as_text(raw))),
			ValueKind::Integer => self.parse_integer(raw).map(Value::from),
			ValueKind::Decimal => {
				let n = self.parse_decimal(raw)?;
				Number::from_f64(n)
					.map(Value::Number)
					.ok_or_else(|| self.invalid("not a finite number"))
			}
			ValueKind::IntegerWithUnit(unit) => {
				let n = self.parse_integer(raw)?;
				Ok(Value::String(format!("{n}{unit}")))
			}
			ValueKind::DecimalWithUnit(unit) => {
				let n = self.parse_decimal(raw)?;
				Ok(Value::String(format!("{}{unit}", format_decimal(n))))
			}
		}
	}

	fn parse_integer(&self, raw: &Value) -> Result<i64> {
		match raw {
			Value::Number(n) => n
				.as_i64()
				// Fractional input truncates toward zero
				.or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
				.ok_or_else(|| self.invalid("not an integer")),
			Value::String(s) => s
				.trim()
				.parse::<i64>()
				.map_err(|e| self.invalid(&e.to_string())),
			other => Err(self.invalid(&format!("expected an integer, got {other}"))),
		}
	}

	fn parse_decimal(&self, raw: &Value) -> Result<f64> {
		let n = match raw {
			Value::Number(n) => n.as_f64().ok_or_else(|| self.invalid("not a number"))?,
			Value::String(s) => s
				.trim()
				.parse::<f64>()
				.map_err(|e| self.invalid(&e.to_string()))?,
			other => return Err(self.invalid(&format!("expected a number, got {other}"))),
		};

		if n.is_finite() {
			Ok(n)
		} else {
			Err(self.invalid("not a finite number"))
		}
	}

	fn invalid(&self, reason: &str) -> TrackerError {
		TrackerError::InvalidFieldValue {
			field: self.name.to_string(),
			reason: reason.to_string(),
		}
	}
}

/// Attributes every category carries in its mapping
pub const COMMON_ATTRIBUTES: &[AttributeDefinition] = &[AttributeDefinition::integer("amount", 1)];

const WHISKY: &[AttributeDefinition] = &[
	AttributeDefinition::text("distillery", ""),
	AttributeDefinition::text("country_of_origin", ""),
	AttributeDefinition::text("region", ""),
	AttributeDefinition::text("age", "N/A"),
	AttributeDefinition::text("alcohol_type", ""),
	AttributeDefinition::decimal_with_unit("abv", "%"),
];

const RUM: &[AttributeDefinition] = &[
	AttributeDefinition::text("type", ""),
	AttributeDefinition::text("country_of_origin", ""),
	AttributeDefinition::text("age", "N/A"),
	AttributeDefinition::text("alcohol_type", ""),
	AttributeDefinition::decimal_with_unit("abv", "%"),
];

const WINE: &[AttributeDefinition] = &[
	AttributeDefinition::text("type", ""),
	AttributeDefinition::text("grapes", ""),
	AttributeDefinition::integer("vintage", 0),
	AttributeDefinition::decimal_with_unit("abv", "%"),
	AttributeDefinition::text("country_of_origin", ""),
	AttributeDefinition::text("region", ""),
	AttributeDefinition::text("winery", ""),
];

const CIGAR: &[AttributeDefinition] = &[
	AttributeDefinition::text("vitola", ""),
	AttributeDefinition::text("origin", ""),
	AttributeDefinition::decimal_with_unit("length", "\""),
	AttributeDefinition::integer_with_unit("burn_time_min", " min"),
	AttributeDefinition::integer_with_unit("burn_time_max", " min"),
	AttributeDefinition::text("strength", ""),
	AttributeDefinition::integer("ring_gauge", 0),
];

const COFFEE: &[AttributeDefinition] = &[
	AttributeDefinition::text("roastery", ""),
	AttributeDefinition::text("roast_date", "DD/MM/YYYY"),
	AttributeDefinition::text("country", ""),
	AttributeDefinition::text("region", ""),
	AttributeDefinition::text("produced_by", ""),
	AttributeDefinition::text("process", ""),
	AttributeDefinition::text("variety", ""),
	AttributeDefinition::text("elevation", ""),
];

/// Category specific attribute definitions, in form order
pub fn attributes_for(category: Category) -> &'static [AttributeDefinition] {
	match category {
		Category::Whisky => WHISKY,
		Category::Rum => RUM,
		Category::Wine => WINE,
		Category::Cigar => CIGAR,
		Category::Coffee => COFFEE,
	}
}

/// Look a category up by name and return its definitions
pub fn lookup(category: &str) -> Result<&'static [AttributeDefinition]> {
	Category::parse(category).map(attributes_for)
}

/// Every definition a record of `category` may carry: common ones first
pub fn record_attributes(category: Category) -> impl Iterator<Item = &'static AttributeDefinition> {
	COMMON_ATTRIBUTES.iter().chain(attributes_for(category))
}

/// Find the definition for `key` among a category's record attributes
pub fn definition(category: Category, key: &str) -> Option<&'static AttributeDefinition> {
	record_attributes(category).find(|def| def.name == key)
}

/// Integral values keep one decimal place (`40` -> `40.0`), everything else
/// prints in shortest form.
pub fn format_decimal(n: f64) -> String {
	if n.fract() == 0.0 && n.abs() < 1e16 {
		format!("{n:.1}")
	} else {
		format!("{n}")
	}
}

fn as_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::collections::HashSet;

	#[test]
	fn every_category_has_a_stable_schema() {
		for category in Category::all() {
			let first = attributes_for(category);
			let second = attributes_for(category);
			assert!(!first.is_empty(), "{category} has no attributes");
			assert_eq!(first, second);
			assert!(first.len() <= 8);
		}
	}

	#[test]
	fn names_are_unique_within_a_category() {
		for category in Category::all() {
			let names: HashSet<_> = record_attributes(category).map(|d| d.name).collect();
			assert_eq!(names.len(), record_attributes(category).count());
		}
	}

	#[test]
	fn lookup_by_name() {
		assert_eq!(lookup("wine").unwrap(), attributes_for(Category::Wine));
		assert!(matches!(lookup("Mead"), Err(TrackerError::UnknownCategory(_))));
	}

	#[test]
	fn definition_covers_common_attributes() {
		assert_eq!(definition(Category::Coffee, "amount").unwrap().name, "amount");
		assert_eq!(definition(Category::Cigar, "vitola").unwrap().kind, ValueKind::Text);
		assert!(definition(Category::Coffee, "abv").is_none());
	}

	#[test]
	fn decimal_formatting() {
		assert_eq!(format_decimal(40.0), "40.0");
		assert_eq!(format_decimal(43.5), "43.5");
		assert_eq!(format_decimal(0.0), "0.0");
		assert_eq!(format_decimal(12.25), "12.25");
	}

	#[test]
	fn coerce_applies_units_once() {
		let abv = definition(Category::Whisky, "abv").unwrap();
		assert_eq!(abv.coerce(Some(&json!(40))).unwrap(), json!("40.0%"));
		assert_eq!(abv.coerce(Some(&json!("46.3"))).unwrap(), json!("46.3%"));
		assert_eq!(abv.coerce(None).unwrap(), json!("0.0%"));

		let length = definition(Category::Cigar, "length").unwrap();
		assert_eq!(length.coerce(Some(&json!(6.5))).unwrap(), json!("6.5\""));

		let burn = definition(Category::Cigar, "burn_time_min").unwrap();
		assert_eq!(burn.coerce(Some(&json!("45"))).unwrap(), json!("45 min"));
	}

	#[test]
	fn coerce_uses_defaults_and_rejects_garbage() {
		let age = definition(Category::Rum, "age").unwrap();
		assert_eq!(age.coerce(None).unwrap(), json!("N/A"));

		let amount = definition(Category::Rum, "amount").unwrap();
		assert_eq!(amount.coerce(None).unwrap(), json!(1));
		assert_eq!(amount.coerce(Some(&json!("3"))).unwrap(), json!(3));
		assert!(matches!(
			amount.coerce(Some(&json!("three"))),
			Err(TrackerError::InvalidFieldValue { field, .. }) if field == "amount"
		));

		let vintage = definition(Category::Wine, "vintage").unwrap();
		assert!(vintage.coerce(Some(&json!(true))).is_err());
	}
}
