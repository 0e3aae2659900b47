//! Unified error handling for the tracker

use crate::domain::{CellId, RecordId};
use thiserror::Error;

/// Main error type for tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
	#[error("Unknown category: {0}")]
	UnknownCategory(String),

	#[error("Invalid record: {0}")]
	InvalidRecord(String),

	#[error("No live cell matches {0}")]
	NoSuchCell(CellId),

	#[error("Record {0} is already attached")]
	DuplicateAttach(RecordId),

	#[error("Record {0} was never attached")]
	DetachUnknown(RecordId),

	#[error("Missing required field: {0}")]
	MissingField(String),

	#[error("Invalid value for field {field}: {reason}")]
	InvalidFieldValue { field: String, reason: String },

	#[error("Invalid value for {cell}: {reason}")]
	InvalidValue { cell: CellId, reason: String },

	#[error("Host error: {0}")]
	Host(#[from] HostError),
}

impl TrackerError {
	/// Whether the error aborts the operation, as opposed to being reported and dropped
	pub fn is_fatal(&self) -> bool {
		!matches!(
			self,
			Self::NoSuchCell(_) | Self::DuplicateAttach(_) | Self::DetachUnknown(_)
		)
	}
}

/// Errors raised by a presentation host primitive
#[derive(Error, Debug)]
pub enum HostError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Lock poisoned")]
	LockPoisoned,

	#[error("No device registered for record {0}")]
	DeviceNotRegistered(RecordId),

	#[error("Entity not registered: {0}")]
	EntityNotRegistered(CellId),
}

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
