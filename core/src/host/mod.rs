//! Presentation host primitives
//!
//! The host owns device and entity registration, state-change notification and
//! durable storage of record payloads. The tracker only talks to it through
//! [`PresentationHost`], so any registry or pub/sub mechanism can stand in.

mod local;
mod store;

pub use local::{EntityState, LocalHost};
pub use store::RecordStore;

use crate::common::errors::HostError;
use crate::domain::{AttributeCell, DeviceId, DeviceInfo, RecordId, RecordPayload};
use async_trait::async_trait;

#[async_trait]
pub trait PresentationHost: Send + Sync {
	/// Register (or look up) the device grouping all cells of one record
	async fn register_device(&self, info: &DeviceInfo) -> Result<DeviceId, HostError>;

	/// Make cells observable; every cell already carries its device id
	async fn register_entities(&self, cells: &[AttributeCell]) -> Result<(), HostError>;

	/// Publish a cell's new observable state
	async fn notify_state_changed(&self, cell: &AttributeCell) -> Result<(), HostError>;

	/// Replace the stored payload of a record with `payload`
	async fn persist_record(
		&self,
		record_id: RecordId,
		payload: &RecordPayload,
	) -> Result<(), HostError>;

	/// Drop the device and every entity registered for a record
	async fn deregister(&self, record_id: RecordId) -> Result<(), HostError>;
}
