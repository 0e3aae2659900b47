mod args;

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;
use sst_core::collector;
use sst_core::domain::{AttributeCell, Category};
use sst_core::{CellId, RecordId, TrackerError};
use tracing::info;

use crate::context::Context;
use crate::util::prelude::*;

pub use self::args::*;

#[derive(Debug, Serialize)]
struct RecordSummary {
	id: RecordId,
	category: Category,
	name: String,
	amount: Option<i64>,
	entry_date: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddOutput {
	id: RecordId,
	cells: usize,
}

pub async fn add(ctx: &mut Context, args: AddArgs) -> Result<()> {
	let input = args.to_input()?;
	let payload = collector::start().select(&args.category)?.submit(&input)?;

	let record_id = ctx.store().create(&payload).await?;
	ctx.tracker.attach(record_id, &payload).await?;
	info!("Added record {}", record_id);

	let out = AddOutput {
		id: record_id,
		cells: ctx.tracker.cells(record_id).map_or(0, <[AttributeCell]>::len),
	};
	print_output!(ctx.format, &out, |o: &AddOutput| {
		println!("Added {} with {} attributes", o.id, o.cells);
	});
	Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
	let out: Vec<RecordSummary> = ctx
		.tracker
		.active()
		.ids()
		.into_iter()
		.filter_map(|id| ctx.tracker.active().get(id).map(|active| (id, active)))
		.map(|(id, active)| RecordSummary {
			id,
			category: active.record.category,
			name: active.record.name.clone(),
			amount: active.record.amount(),
			entry_date: active.record.creation_date.clone(),
		})
		.collect();

	print_output!(ctx.format, &out, |records: &Vec<RecordSummary>| {
		if records.is_empty() {
			println!("No items tracked yet");
			return;
		}
		let mut table = table(vec!["ID", "Category", "Name", "Amount", "Added"]);
		for r in records {
			table.add_row(vec![
				r.id.to_string(),
				r.category.to_string(),
				r.name.clone(),
				r.amount.map_or_else(|| "-".to_string(), |n| n.to_string()),
				r.entry_date.clone().unwrap_or_else(|| "-".to_string()),
			]);
		}
		println!("{}", table);
	});
	Ok(())
}

pub fn show(ctx: &Context, args: &RecordArgs) -> Result<()> {
	let record_id = ctx.resolve_record(&args.record)?;
	let Some(cells) = ctx.tracker.cells(record_id) else {
		bail!("Item {} is not tracked", record_id);
	};

	print_output!(ctx.format, cells, |cells: &[AttributeCell]| {
		let mut table = table(vec!["Entity", "Attribute", "Value"]);
		for cell in cells {
			table.add_row(vec![
				cell.cell_id.to_string(),
				cell.display_label.clone(),
				display_value(&cell.current_value),
			]);
		}
		println!("{}", table);
	});
	Ok(())
}

pub async fn update(ctx: &mut Context, args: UpdateArgs) -> Result<()> {
	let target = CellId::from(args.entity_id);
	let value: Value = parse_value(&args.value);

	match ctx.tracker.route_update(&target, value).await {
		Ok(()) => {}
		Err(TrackerError::NoSuchCell(cell)) => bail!("No attribute with entity id {}", cell),
		Err(e) => return Err(e.into()),
	}

	let cell = ctx.tracker.cell(&target);
	print_output!(ctx.format, &cell, |cell: &Option<&AttributeCell>| {
		if let Some(cell) = cell {
			println!("{} = {}", cell.entity_name(), display_value(&cell.current_value));
		}
	});
	Ok(())
}

pub async fn remove(ctx: &mut Context, args: &RecordArgs) -> Result<()> {
	let record_id = ctx.resolve_record(&args.record)?;

	let detached = match ctx.tracker.detach(record_id).await {
		Ok(active) => Some(active),
		// Stored but never attached, e.g. it failed validation on startup
		Err(TrackerError::DetachUnknown(_)) => None,
		Err(e) => return Err(e.into()),
	};

	if !ctx.store().remove(record_id).await? && detached.is_none() {
		bail!("No item with id {}", record_id);
	}

	let name = detached.map(|active| active.record.name);
	print_output!(ctx.format, &name, |name: &Option<String>| {
		match name {
			Some(name) => println!("Removed {} ({})", name, record_id),
			None => println!("Removed {}", record_id),
		}
	});
	Ok(())
}
