use anyhow::Result;
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use serde::Serialize;
use serde_json::Value;

pub fn print_json<T: Serialize + ?Sized>(output: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(output)?);
	Ok(())
}

/// Empty table with our preset and the given header
pub fn table(header: Vec<&str>) -> Table {
	let mut table = Table::new();
	table.load_preset(UTF8_BORDERS_ONLY);
	table.set_header(header);
	table
}

/// Command line text as a value: JSON when it parses, a plain string otherwise
pub fn parse_value(raw: &str) -> Value {
	serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// A value the way a person reads it
pub fn display_value(value: &Value) -> String {
	match value {
		Value::String(s) if s.is_empty() => "-".to_string(),
		Value::String(s) => s.clone(),
		Value::Null => "-".to_string(),
		other => other.to_string(),
	}
}
