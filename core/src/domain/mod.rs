//! Domain models for tracked consumables

pub mod category;
pub mod cell;
pub mod device;
pub mod record;
pub mod schema;

pub use category::Category;
pub use cell::{AttributeCell, CellId, IdentityField};
pub use device::{DeviceId, DeviceInfo, MANUFACTURER};
pub use record::{Record, RecordId, RecordPayload};
pub use schema::{attributes_for, AttributeDefinition, DefaultValue, ValueKind};
