mod args;

use anyhow::Result;
use serde::Serialize;
use sst_core::collector::{self, FormField};
use sst_core::domain::{attributes_for, Category, ValueKind};

use crate::context::OutputFormat;
use crate::util::prelude::*;

pub use self::args::*;

#[derive(Debug, Serialize)]
struct CategoryInfo {
	name: Category,
	attributes: Vec<&'static str>,
}

pub fn categories(format: OutputFormat) -> Result<()> {
	let step = collector::start();
	let out: Vec<CategoryInfo> = step
		.choices()
		.into_iter()
		.map(|category| CategoryInfo {
			name: category,
			attributes: attributes_for(category).iter().map(|def| def.name).collect(),
		})
		.collect();

	print_output!(format, &out, |infos: &Vec<CategoryInfo>| {
		let mut table = table(vec!["Category", "Attributes"]);
		for info in infos {
			table.add_row(vec![info.name.to_string(), info.attributes.join(", ")]);
		}
		println!("{}", table);
	});
	Ok(())
}

pub fn fields(format: OutputFormat, args: &FieldsArgs) -> Result<()> {
	let out = collector::start().select(&args.category)?.fields();

	print_output!(format, &out, |fields: &Vec<FormField>| {
		let mut table = table(vec!["Field", "Type", "Required", "Default"]);
		for field in fields {
			table.add_row(vec![
				field.key.to_string(),
				kind_name(field.kind),
				if field.required { "yes" } else { "no" }.to_string(),
				field.default.as_ref().map_or_else(String::new, display_value),
			]);
		}
		println!("{}", table);
	});
	Ok(())
}

fn kind_name(kind: ValueKind) -> String {
	match kind {
		ValueKind::Text => "text".to_string(),
		ValueKind::Integer => "integer".to_string(),
		ValueKind::Decimal => "decimal".to_string(),
		ValueKind::IntegerWithUnit(unit) => format!("integer ({})", unit.trim()),
		ValueKind::DecimalWithUnit(unit) => format!("decimal ({})", unit.trim()),
	}
}
