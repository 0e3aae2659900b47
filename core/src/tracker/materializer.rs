//! Record materializer - turns a stored payload into registered cells

use crate::common::errors::Result;
use crate::domain::{
	schema, AttributeCell, DeviceId, DeviceInfo, IdentityField, Record, RecordId, RecordPayload,
};
use crate::host::PresentationHost;
use tracing::{debug, warn};

/// A validated record with its device description and cells, not yet registered
#[derive(Debug, Clone)]
pub struct Materialized {
	pub record: Record,
	pub device: DeviceInfo,
	pub cells: Vec<AttributeCell>,
}

/// Validate `payload` and build every cell for it.
///
/// Fails with `InvalidRecord` when an identity field is missing, before anything
/// is handed to the host.
pub fn materialize(record_id: RecordId, payload: &RecordPayload) -> Result<Materialized> {
	let record = Record::from_payload(payload)?;
	let cells = cells_for(record_id, &record);
	let device = DeviceInfo::for_record(record_id, &record);

	Ok(Materialized {
		record,
		device,
		cells,
	})
}

/// The four identity cells, then one cell per stored attribute in schema order.
///
/// Stored values are used verbatim.
pub fn cells_for(record_id: RecordId, record: &Record) -> Vec<AttributeCell> {
	let identity = IdentityField::ALL
		.iter()
		.map(|field| AttributeCell::identity(record_id, *field, record));

	let attributes = schema::record_attributes(record.category).filter_map(|def| {
		record
			.attributes
			.get(def.name)
			.map(|value| AttributeCell::attribute(record_id, def.name, value.clone(), record))
	});

	identity.chain(attributes).collect()
}

/// Register the device, then every cell under it
pub async fn register(
	host: &dyn PresentationHost,
	materialized: &mut Materialized,
) -> Result<DeviceId> {
	let device_id = host.register_device(&materialized.device).await?;

	for cell in &mut materialized.cells {
		cell.device_id = Some(device_id);
	}

	if let Err(e) = host.register_entities(&materialized.cells).await {
		// Don't leave a device without its cells behind
		let record_id = materialized.device.grouping_key;
		if let Err(cleanup) = host.deregister(record_id).await {
			warn!(
				"Failed to remove device of record {} after a failed setup: {}",
				record_id, cleanup
			);
		}
		return Err(e.into());
	}

	debug!(
		"Registered {} cells for {} under device {}",
		materialized.cells.len(),
		materialized.device.name,
		device_id
	);
	Ok(device_id)
}
