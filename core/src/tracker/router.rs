//! Update router - applies an external change to one live cell

use super::registry::ActiveRecords;
use crate::common::errors::{Result, TrackerError};
use crate::domain::CellId;
use crate::host::PresentationHost;
use serde_json::Value;
use tracing::{info, warn};

/// Route `value` to the cell named `target`.
///
/// The value is applied verbatim. The updated record is persisted before the
/// in-memory cell changes, so a failed write leaves both untouched and a
/// successful one leaves them in agreement.
pub async fn route_update(
	host: &dyn PresentationHost,
	active: &mut ActiveRecords,
	target: &CellId,
	value: Value,
) -> Result<()> {
	let Some((record_id, index)) = active.locate(target) else {
		warn!("No matching entity found for event: {}", target);
		return Err(TrackerError::NoSuchCell(target.clone()));
	};
	let entry = active
		.get_mut(record_id)
		.ok_or_else(|| TrackerError::NoSuchCell(target.clone()))?;

	info!(
		"Update event for {} with value: {}. Updating state.",
		target, value
	);

	let key = entry.cells[index].record_key();
	let mut updated = entry.record.clone();
	updated
		.set(&key, value.clone())
		.map_err(|reason| TrackerError::InvalidValue {
			cell: target.clone(),
			reason,
		})?;

	host.persist_record(record_id, &updated.to_payload()).await?;
	entry.record = updated;

	let cell = &mut entry.cells[index];
	cell.current_value = value;
	host.notify_state_changed(cell).await?;

	info!("Persisted {}: {} to record {}", key, cell.current_value, record_id);
	Ok(())
}
