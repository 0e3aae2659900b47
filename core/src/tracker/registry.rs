//! Registry of materialized records and their live cells

use crate::common::errors::{Result, TrackerError};
use crate::domain::{AttributeCell, CellId, DeviceId, Record, RecordId};
use std::collections::HashMap;

/// A record currently attached, with the cells materialized from it
#[derive(Debug, Clone)]
pub struct ActiveRecord {
	pub record: Record,
	pub device_id: DeviceId,
	pub cells: Vec<AttributeCell>,
}

/// Owned map of active records, indexed by cell identifier for O(1) routing
#[derive(Debug, Default)]
pub struct ActiveRecords {
	records: HashMap<RecordId, ActiveRecord>,
	cell_index: HashMap<CellId, (RecordId, usize)>,
}

impl ActiveRecords {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, record_id: RecordId) -> bool {
		self.records.contains_key(&record_id)
	}

	/// Add a record; the first attach of an identity stays authoritative
	pub fn insert(&mut self, record_id: RecordId, active: ActiveRecord) -> Result<()> {
		if self.records.contains_key(&record_id) {
			return Err(TrackerError::DuplicateAttach(record_id));
		}

		for (index, cell) in active.cells.iter().enumerate() {
			debug_assert!(
				!self.cell_index.contains_key(&cell.cell_id),
				"cell id collision on {}",
				cell.cell_id
			);
			self.cell_index
				.insert(cell.cell_id.clone(), (record_id, index));
		}
		self.records.insert(record_id, active);
		Ok(())
	}

	/// Remove a record together with all of its cells
	pub fn remove(&mut self, record_id: RecordId) -> Option<ActiveRecord> {
		let active = self.records.remove(&record_id)?;
		for cell in &active.cells {
			self.cell_index.remove(&cell.cell_id);
		}
		Some(active)
	}

	pub fn get(&self, record_id: RecordId) -> Option<&ActiveRecord> {
		self.records.get(&record_id)
	}

	pub(crate) fn get_mut(&mut self, record_id: RecordId) -> Option<&mut ActiveRecord> {
		self.records.get_mut(&record_id)
	}

	/// Owning record and position of a live cell
	pub fn locate(&self, cell_id: &CellId) -> Option<(RecordId, usize)> {
		self.cell_index.get(cell_id).copied()
	}

	pub fn cell(&self, cell_id: &CellId) -> Option<&AttributeCell> {
		let (record_id, index) = self.locate(cell_id)?;
		self.records.get(&record_id)?.cells.get(index)
	}

	/// Record identities, sorted
	pub fn ids(&self) -> Vec<RecordId> {
		let mut ids: Vec<_> = self.records.keys().copied().collect();
		ids.sort();
		ids
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn cell_count(&self) -> usize {
		self.cell_index.len()
	}
}
