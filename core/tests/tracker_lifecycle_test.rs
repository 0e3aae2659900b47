//! Attach, detach and restart against the local host and its record store

mod helpers;

use helpers::{glenlivet, padron, RecordingHost};
use pretty_assertions::assert_eq;
use serde_json::json;
use sst_core::domain::MANUFACTURER;
use sst_core::infra::event::UPDATE_EVENT;
use sst_core::{
	CellId, Event, EventBus, LocalHost, RecordId, RecordStore, Tracker, TrackerError, UpdateEvent,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn local_host(dir: &TempDir, events: &EventBus) -> Arc<LocalHost> {
	Arc::new(LocalHost::new(
		RecordStore::new(dir.path().join("records")),
		events.clone(),
	))
}

#[tokio::test]
async fn attach_registers_one_device_and_all_cells() {
	let temp = TempDir::new().unwrap();
	let events = EventBus::default();
	let host = local_host(&temp, &events);
	let mut tracker = Tracker::new(host.clone());

	let id = RecordId::new();
	let device_id = tracker.attach(id, &glenlivet()).await.unwrap();

	let (registered, info) = host.device(id).unwrap().unwrap();
	assert_eq!(registered, device_id);
	assert_eq!(info.manufacturer, MANUFACTURER);
	assert_eq!(info.name, "Glenlivet 18");

	// Four identity cells, amount, then the six whisky attributes
	assert_eq!(host.entity_count().unwrap(), 11);
	assert_eq!(tracker.cells(id).unwrap().len(), 11);

	let abv = host.entity(&CellId::new(id, "abv")).unwrap().unwrap();
	assert_eq!(abv.name, "Glenlivet 18 Abv");
	assert_eq!(abv.state, json!("40.0%"));
	assert_eq!(abv.device_id, device_id);
	assert_eq!(abv.attributes["device_id"], json!(device_id.to_string()));
}

#[tokio::test]
async fn duplicate_attach_keeps_the_first_registration() {
	let host = Arc::new(RecordingHost::default());
	let mut tracker = Tracker::new(host.clone());
	let id = RecordId::new();

	tracker.attach(id, &glenlivet()).await.unwrap();
	let err = tracker.attach(id, &padron()).await.unwrap_err();

	assert!(matches!(err, TrackerError::DuplicateAttach(dup) if dup == id));
	assert!(!err.is_fatal());
	assert_eq!(host.devices.lock().unwrap().len(), 1);
	assert_eq!(tracker.active().len(), 1);
	assert_eq!(
		tracker.active().get(id).unwrap().record.name,
		"Glenlivet 18"
	);
}

#[tokio::test]
async fn invalid_payload_registers_nothing() {
	let host = Arc::new(RecordingHost::default());
	let mut tracker = Tracker::new(host.clone());

	let mut payload = glenlivet();
	payload.remove("image_path");

	let err = tracker.attach(RecordId::new(), &payload).await.unwrap_err();
	assert!(matches!(err, TrackerError::InvalidRecord(_)));
	assert!(host.devices.lock().unwrap().is_empty());
	assert!(tracker.active().is_empty());
}

#[tokio::test]
async fn detach_removes_cells_from_the_host() {
	let temp = TempDir::new().unwrap();
	let events = EventBus::default();
	let host = local_host(&temp, &events);
	let mut tracker = Tracker::new(host.clone());

	let (gone, kept) = (RecordId::new(), RecordId::new());
	tracker.attach(gone, &glenlivet()).await.unwrap();
	tracker.attach(kept, &padron()).await.unwrap();

	let detached = tracker.detach(gone).await.unwrap();
	assert_eq!(detached.cells.len(), 11);

	assert!(host.device(gone).unwrap().is_none());
	assert!(host.entity(&CellId::new(gone, "abv")).unwrap().is_none());
	assert_eq!(host.entity_count().unwrap(), tracker.active().cell_count());
	assert!(tracker.cell(&CellId::new(gone, "abv")).is_none());
}

#[tokio::test]
async fn failed_deregister_keeps_the_record_attached() {
	let host = Arc::new(RecordingHost::default());
	let mut tracker = Tracker::new(host.clone());
	let id = RecordId::new();
	tracker.attach(id, &glenlivet()).await.unwrap();

	*host.fail_deregister.lock().unwrap() = true;
	let err = tracker.detach(id).await.unwrap_err();

	assert!(matches!(err, TrackerError::Host(_)));
	assert!(tracker.active().contains(id));
	assert!(tracker.cell(&CellId::new(id, "abv")).is_some());

	*host.fail_deregister.lock().unwrap() = false;
	tracker.detach(id).await.unwrap();
	assert!(tracker.active().is_empty());
	assert_eq!(host.deregistered.lock().unwrap().clone(), vec![id]);
}

#[tokio::test]
async fn detach_unknown_record_is_reported() {
	let host = Arc::new(RecordingHost::default());
	let mut tracker = Tracker::new(host.clone());

	let err = tracker.detach(RecordId::new()).await.unwrap_err();

	assert!(matches!(err, TrackerError::DetachUnknown(_)));
	assert!(!err.is_fatal());
	assert!(host.deregistered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn attach_and_detach_are_announced() {
	let host = Arc::new(RecordingHost::default());
	let events = EventBus::new(8);
	let mut subscriber = events.subscribe();
	let mut tracker = Tracker::new(host).with_events(events.clone());

	let id = RecordId::new();
	tracker.attach(id, &glenlivet()).await.unwrap();
	tracker.detach(id).await.unwrap();

	assert!(matches!(
		subscriber.try_recv().unwrap(),
		Event::RecordAttached { record_id, .. } if record_id == id
	));
	assert_eq!(
		subscriber.try_recv().unwrap(),
		Event::RecordDetached { record_id: id }
	);
}

#[tokio::test]
async fn updates_survive_a_restart() {
	let temp = TempDir::new().unwrap();
	let events = EventBus::default();
	let id;
	let before;

	{
		let host = local_host(&temp, &events);
		id = host.store().create(&glenlivet()).await.unwrap();

		let mut tracker = Tracker::new(host.clone());
		let report = tracker.restore(host.store().load_all().await.unwrap()).await;
		assert_eq!(report.attached, vec![id]);

		tracker
			.route_update(&CellId::new(id, "abv"), json!("43.0%"))
			.await
			.unwrap();
		before = tracker.cells(id).unwrap().to_vec();
	}

	let host = local_host(&temp, &events);
	let stored = host.store().load_all().await.unwrap();
	assert_eq!(stored.len(), 1);
	assert_eq!(stored[0].1.get("abv"), Some(&json!("43.0%")));

	let mut tracker = Tracker::new(host.clone());
	let report = tracker.restore(stored).await;

	assert!(report.failed.is_empty());
	assert_eq!(tracker.cells(id).unwrap(), before.as_slice());
	assert_eq!(
		tracker.active().get(id).unwrap().device_id,
		LocalHost::device_id_for(id)
	);
}

#[tokio::test]
async fn restore_skips_broken_records() {
	let temp = TempDir::new().unwrap();
	let events = EventBus::default();
	let host = local_host(&temp, &events);

	let good = host.store().create(&padron()).await.unwrap();
	let mut broken = glenlivet();
	broken.insert("category", "Absinthe");
	let bad = host.store().create(&broken).await.unwrap();

	let mut tracker = Tracker::new(host.clone());
	let report = tracker.restore(host.store().load_all().await.unwrap()).await;

	assert_eq!(report.attached, vec![good]);
	assert_eq!(report.failed.len(), 1);
	assert_eq!(report.failed[0].0, bad);
	assert!(matches!(report.failed[0].1, TrackerError::UnknownCategory(_)));
}

#[tokio::test]
async fn host_publishes_state_changes() {
	let temp = TempDir::new().unwrap();
	let events = EventBus::default();
	let host = local_host(&temp, &events);
	let mut tracker = Tracker::new(host.clone());

	let id = RecordId::new();
	tracker.attach(id, &glenlivet()).await.unwrap();

	let mut changes = events.subscribe_to("state_changed");
	let target = CellId::new(id, "amount");
	tracker.route_update(&target, json!(1)).await.unwrap();

	assert_eq!(
		changes.try_recv().unwrap(),
		Event::StateChanged {
			entity_id: target.clone(),
			value: json!(1),
		}
	);
	assert_eq!(host.entity(&target).unwrap().unwrap().state, json!(1));
	assert_eq!(
		host.store().read(id).await.unwrap().unwrap().get("amount"),
		Some(&json!(1))
	);
}

#[tokio::test]
async fn run_loop_consumes_update_events_from_the_bus() {
	let temp = TempDir::new().unwrap();
	let events = EventBus::default();
	let host = local_host(&temp, &events);
	let mut tracker = Tracker::new(host.clone());

	let id = RecordId::new();
	tracker.attach(id, &padron()).await.unwrap();

	let subscriber = events.subscribe_to(UPDATE_EVENT);
	events.emit(Event::Update(UpdateEvent {
		entity_id: CellId::new(id, "strength"),
		value: json!("Full"),
	}));
	events.emit(Event::TrackerShutdown);

	timeout(Duration::from_secs(5), tracker.run(subscriber))
		.await
		.unwrap();

	assert_eq!(
		host.store().read(id).await.unwrap().unwrap().get("strength"),
		Some(&json!("Full"))
	);
}
