//! The tracker - lifecycle of attached records and routing of updates
//!
//! One [`Tracker`] owns the set of active records. It is created at startup,
//! gains entries on attach, loses them on detach, and processes host events one
//! at a time in delivery order.

pub mod materializer;
pub mod registry;
pub mod router;

pub use materializer::Materialized;
pub use registry::{ActiveRecord, ActiveRecords};

use crate::common::errors::{Result, TrackerError};
use crate::domain::{AttributeCell, CellId, DeviceId, RecordId, RecordPayload};
use crate::host::PresentationHost;
use crate::infra::event::{Event, EventBus, EventSubscriber, UPDATE_EVENT};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

/// Outcome of restoring stored records at startup
#[derive(Debug, Default)]
pub struct RestoreReport {
	pub attached: Vec<RecordId>,
	pub failed: Vec<(RecordId, TrackerError)>,
}

pub struct Tracker {
	host: Arc<dyn PresentationHost>,
	active: ActiveRecords,
	events: Option<EventBus>,
}

impl Tracker {
	pub fn new(host: Arc<dyn PresentationHost>) -> Self {
		Self {
			host,
			active: ActiveRecords::new(),
			events: None,
		}
	}

	/// Publish attach/detach notifications on `events`
	pub fn with_events(mut self, events: EventBus) -> Self {
		self.events = Some(events);
		self
	}

	pub fn active(&self) -> &ActiveRecords {
		&self.active
	}

	pub fn cell(&self, cell_id: &CellId) -> Option<&AttributeCell> {
		self.active.cell(cell_id)
	}

	pub fn cells(&self, record_id: RecordId) -> Option<&[AttributeCell]> {
		self.active.get(record_id).map(|active| active.cells.as_slice())
	}

	/// Materialize a record and register its cells with the host
	pub async fn attach(
		&mut self,
		record_id: RecordId,
		payload: &RecordPayload,
	) -> Result<DeviceId> {
		if self.active.contains(record_id) {
			warn!("Record {} is already set up!", record_id);
			return Err(TrackerError::DuplicateAttach(record_id));
		}

		let mut materialized = materializer::materialize(record_id, payload)?;
		let device_id = materializer::register(self.host.as_ref(), &mut materialized).await?;

		let Materialized { record, cells, .. } = materialized;
		let (name, category) = (record.name.clone(), record.category);
		self.active.insert(
			record_id,
			ActiveRecord {
				record,
				device_id,
				cells,
			},
		)?;

		info!("Successfully set up record {} ({} {})", record_id, category, name);
		self.emit(Event::RecordAttached {
			record_id,
			name,
			category,
		});
		Ok(device_id)
	}

	/// Discard a record's cells and deregister them from the host.
	///
	/// The record stays active when the host fails to deregister it, so the
	/// detach can be retried.
	pub async fn detach(&mut self, record_id: RecordId) -> Result<ActiveRecord> {
		if !self.active.contains(record_id) {
			warn!("Record {} is not found in active data.", record_id);
			return Err(TrackerError::DetachUnknown(record_id));
		}

		if let Err(e) = self.host.deregister(record_id).await {
			error!("Failed to unload record {}: {}", record_id, e);
			return Err(e.into());
		}

		let active = self
			.active
			.remove(record_id)
			.ok_or(TrackerError::DetachUnknown(record_id))?;

		info!("Successfully unloaded record {}", record_id);
		self.emit(Event::RecordDetached { record_id });
		Ok(active)
	}

	/// Apply `value` to the cell named `target` and persist the owning record
	pub async fn route_update(&mut self, target: &CellId, value: Value) -> Result<()> {
		router::route_update(self.host.as_ref(), &mut self.active, target, value).await
	}

	/// Attach every stored record; one failure never blocks the others
	pub async fn restore(&mut self, stored: Vec<(RecordId, RecordPayload)>) -> RestoreReport {
		let mut report = RestoreReport::default();

		for (record_id, payload) in stored {
			match self.attach(record_id, &payload).await {
				Ok(_) => report.attached.push(record_id),
				Err(e) => {
					error!("Failed to set up record {}: {}", record_id, e);
					report.failed.push((record_id, e));
				}
			}
		}

		report
	}

	/// React to one host event
	pub async fn handle_event(&mut self, event: Event) -> Result<()> {
		match event {
			Event::Update(update) => self.route_update(&update.entity_id, update.value).await,
			_ => Ok(()),
		}
	}

	/// Process events in delivery order until shutdown or until the bus closes
	pub async fn run(&mut self, mut events: EventSubscriber) {
		info!("Listening for {} events", UPDATE_EVENT);

		loop {
			match events.recv().await {
				Ok(Event::TrackerShutdown) => break,
				Ok(event) => {
					if let Err(e) = self.handle_event(event).await {
						if e.is_fatal() {
							error!("Failed to handle event: {}", e);
						}
					}
				}
				Err(RecvError::Lagged(missed)) => {
					warn!("Tracker fell behind, {} events were dropped", missed);
				}
				Err(RecvError::Closed) => break,
			}
		}

		info!("Stopped listening for events");
	}

	fn emit(&self, event: Event) {
		if let Some(events) = &self.events {
			events.emit(event);
		}
	}
}
