//! Event bus for decoupled communication
//!
//! This is the host's notification channel: external update requests arrive on
//! it and state changes of cells are published on it.

use crate::domain::{CellId, Category, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// Name of the external update-event channel
pub const UPDATE_EVENT: &str = "sip_and_smoke_tracker.update";
pub const STATE_CHANGED_EVENT: &str = "state_changed";
pub const RECORD_ATTACHED_EVENT: &str = "sip_and_smoke_tracker.record_attached";
pub const RECORD_DETACHED_EVENT: &str = "sip_and_smoke_tracker.record_detached";
pub const TRACKER_STARTED_EVENT: &str = "sip_and_smoke_tracker.started";
pub const TRACKER_SHUTDOWN_EVENT: &str = "sip_and_smoke_tracker.shutdown";

/// Request to set one cell to a new value.
///
/// Only `entity_id` and `value` are read; any other field is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
	pub entity_id: CellId,
	#[serde(default)]
	pub value: Value,
}

/// A central event type for everything the tracker and its host exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum Event {
	TrackerStarted,
	TrackerShutdown,

	/// External request to change a cell
	Update(UpdateEvent),

	/// A cell's observable state changed
	StateChanged { entity_id: CellId, value: Value },

	RecordAttached {
		record_id: RecordId,
		name: String,
		category: Category,
	},
	RecordDetached {
		record_id: RecordId,
	},
}

impl Event {
	pub fn name(&self) -> &'static str {
		match self {
			Event::TrackerStarted => TRACKER_STARTED_EVENT,
			Event::TrackerShutdown => TRACKER_SHUTDOWN_EVENT,
			Event::Update(_) => UPDATE_EVENT,
			Event::StateChanged { .. } => STATE_CHANGED_EVENT,
			Event::RecordAttached { .. } => RECORD_ATTACHED_EVENT,
			Event::RecordDetached { .. } => RECORD_DETACHED_EVENT,
		}
	}
}

/// Event bus for broadcasting events
#[derive(Debug, Clone)]
pub struct EventBus {
	sender: broadcast::Sender<Event>,
}

impl EventBus {
	/// Create a new event bus with specified capacity
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity.max(1));
		Self { sender }
	}

	/// Emit an event to every subscriber
	pub fn emit(&self, event: Event) {
		// No receivers is not an error
		if let Ok(count) = self.sender.send(event) {
			debug!("Event emitted to {} subscribers", count);
		}
	}

	/// Subscribe to all events
	pub fn subscribe(&self) -> EventSubscriber {
		EventSubscriber {
			receiver: self.sender.subscribe(),
			event_name: None,
		}
	}

	/// Subscribe to one named channel. Shutdown is always delivered.
	pub fn subscribe_to(&self, event_name: &'static str) -> EventSubscriber {
		EventSubscriber {
			receiver: self.sender.subscribe(),
			event_name: Some(event_name),
		}
	}

	/// Get the number of active subscribers
	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1024)
	}
}

/// Event subscriber for receiving events
#[derive(Debug)]
pub struct EventSubscriber {
	receiver: broadcast::Receiver<Event>,
	event_name: Option<&'static str>,
}

impl EventSubscriber {
	/// Receive the next event this subscriber is interested in
	pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
		loop {
			let event = self.receiver.recv().await?;
			if self.wants(&event) {
				return Ok(event);
			}
		}
	}

	/// Try to receive an event without blocking
	pub fn try_recv(&mut self) -> Result<Event, broadcast::error::TryRecvError> {
		loop {
			let event = self.receiver.try_recv()?;
			if self.wants(&event) {
				return Ok(event);
			}
		}
	}

	fn wants(&self, event: &Event) -> bool {
		match self.event_name {
			None => true,
			Some(name) => matches!(event, Event::TrackerShutdown) || event.name() == name,
		}
	}
}
