//! In-process presentation host backed by a [`RecordStore`]

use super::{PresentationHost, RecordStore};
use crate::common::errors::HostError;
use crate::domain::{AttributeCell, CellId, DeviceId, DeviceInfo, RecordId, RecordPayload};
use crate::infra::event::{Event, EventBus};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Namespace for deriving device ids from record ids
const DEVICE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a57_93d4_4e0b_8c21_5b7e_0d9a_f342);

/// What the host knows about one registered entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
	pub entity_id: CellId,
	pub device_id: DeviceId,
	pub name: String,
	pub state: Value,
	pub attributes: Map<String, Value>,
}

impl EntityState {
	fn from_cell(cell: &AttributeCell, device_id: DeviceId) -> Self {
		Self {
			entity_id: cell.cell_id.clone(),
			device_id,
			name: cell.entity_name(),
			state: cell.current_value.clone(),
			attributes: cell.extra_attributes(),
		}
	}
}

struct DeviceEntry {
	id: DeviceId,
	info: DeviceInfo,
	entities: Vec<CellId>,
}

pub struct LocalHost {
	store: RecordStore,
	events: EventBus,
	devices: RwLock<HashMap<RecordId, DeviceEntry>>,
	entities: RwLock<HashMap<CellId, EntityState>>,
}

impl LocalHost {
	pub fn new(store: RecordStore, events: EventBus) -> Self {
		Self {
			store,
			events,
			devices: RwLock::new(HashMap::new()),
			entities: RwLock::new(HashMap::new()),
		}
	}

	pub fn store(&self) -> &RecordStore {
		&self.store
	}

	pub fn events(&self) -> &EventBus {
		&self.events
	}

	/// Device id for a record; identical across restarts
	pub fn device_id_for(record_id: RecordId) -> DeviceId {
		DeviceId(Uuid::new_v5(&DEVICE_NAMESPACE, record_id.as_uuid().as_bytes()))
	}

	pub fn device(&self, record_id: RecordId) -> Result<Option<(DeviceId, DeviceInfo)>, HostError> {
		let devices = self.devices.read().map_err(|_| HostError::LockPoisoned)?;
		Ok(devices
			.get(&record_id)
			.map(|entry| (entry.id, entry.info.clone())))
	}

	pub fn entity(&self, entity_id: &CellId) -> Result<Option<EntityState>, HostError> {
		let entities = self.entities.read().map_err(|_| HostError::LockPoisoned)?;
		Ok(entities.get(entity_id).cloned())
	}

	pub fn entity_count(&self) -> Result<usize, HostError> {
		let entities = self.entities.read().map_err(|_| HostError::LockPoisoned)?;
		Ok(entities.len())
	}
}

#[async_trait]
impl PresentationHost for LocalHost {
	async fn register_device(&self, info: &DeviceInfo) -> Result<DeviceId, HostError> {
		let id = Self::device_id_for(info.grouping_key);
		let mut devices = self.devices.write().map_err(|_| HostError::LockPoisoned)?;

		let entry = devices.entry(info.grouping_key).or_insert_with(|| DeviceEntry {
			id,
			info: info.clone(),
			entities: Vec::new(),
		});
		entry.info = info.clone();

		debug!(
			"Registered device {} ({} {}) for record {}",
			id, info.model, info.name, info.grouping_key
		);
		Ok(id)
	}

	async fn register_entities(&self, cells: &[AttributeCell]) -> Result<(), HostError> {
		let mut devices = self.devices.write().map_err(|_| HostError::LockPoisoned)?;
		let mut entities = self.entities.write().map_err(|_| HostError::LockPoisoned)?;

		for cell in cells {
			let device = devices
				.get_mut(&cell.grouping_key())
				.ok_or(HostError::DeviceNotRegistered(cell.grouping_key()))?;

			if !device.entities.contains(&cell.cell_id) {
				device.entities.push(cell.cell_id.clone());
			}
			entities.insert(cell.cell_id.clone(), EntityState::from_cell(cell, device.id));
		}

		debug!("Registered {} entities", cells.len());
		Ok(())
	}

	async fn notify_state_changed(&self, cell: &AttributeCell) -> Result<(), HostError> {
		{
			let mut entities = self.entities.write().map_err(|_| HostError::LockPoisoned)?;
			let entity = entities
				.get_mut(&cell.cell_id)
				.ok_or_else(|| HostError::EntityNotRegistered(cell.cell_id.clone()))?;
			entity.state = cell.current_value.clone();
			entity.attributes = cell.extra_attributes();
		}

		self.events.emit(Event::StateChanged {
			entity_id: cell.cell_id.clone(),
			value: cell.current_value.clone(),
		});
		Ok(())
	}

	async fn persist_record(
		&self,
		record_id: RecordId,
		payload: &RecordPayload,
	) -> Result<(), HostError> {
		self.store.write(record_id, payload).await
	}

	async fn deregister(&self, record_id: RecordId) -> Result<(), HostError> {
		let removed = {
			let mut devices = self.devices.write().map_err(|_| HostError::LockPoisoned)?;
			devices.remove(&record_id)
		};

		if let Some(device) = removed {
			let mut entities = self.entities.write().map_err(|_| HostError::LockPoisoned)?;
			for entity_id in &device.entities {
				entities.remove(entity_id);
			}
			info!(
				"Removed device {} and {} entities for record {}",
				device.id,
				device.entities.len(),
				record_id
			);
		}

		Ok(())
	}
}
