//! Update routing against a recording host

mod helpers;

use helpers::{glenlivet, padron, RecordingHost};
use pretty_assertions::assert_eq;
use serde_json::json;
use sst_core::{
	CellId, Event, EventBus, RecordId, RecordPayload, Tracker, TrackerError, UpdateEvent,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

async fn tracker_with(records: &[(RecordId, RecordPayload)]) -> (Tracker, Arc<RecordingHost>) {
	let host = Arc::new(RecordingHost::default());
	let mut tracker = Tracker::new(host.clone());
	for (id, payload) in records {
		tracker.attach(*id, payload).await.unwrap();
	}
	(tracker, host)
}

#[tokio::test]
async fn whisky_scenario() {
	let id = RecordId::new();
	let (mut tracker, host) = tracker_with(&[(id, glenlivet())]).await;

	let abv = CellId::new(id, "abv");
	assert_eq!(abv.as_str(), format!("{id}_abv"));
	assert_eq!(tracker.cell(&abv).unwrap().current_value, json!("40.0%"));

	let devices = host.devices.lock().unwrap().clone();
	assert_eq!(devices.len(), 1);
	assert_eq!(devices[0].model.to_string(), "Whisky");
	assert_eq!(devices[0].manufacturer, "Sip and Smoke Tracker");
	assert_eq!(devices[0].name, "Glenlivet 18");

	tracker.route_update(&abv, json!("43.0%")).await.unwrap();

	assert_eq!(tracker.cell(&abv).unwrap().current_value, json!("43.0%"));

	let (persisted_id, payload) = host.last_persisted().unwrap();
	assert_eq!(persisted_id, id);
	let mut expected = glenlivet();
	expected.insert("abv", "43.0%");
	assert_eq!(payload, expected);

	let notified = host.notified.lock().unwrap().clone();
	assert_eq!(notified.len(), 1);
	assert_eq!(notified[0].cell_id, abv);
}

#[tokio::test]
async fn update_touches_exactly_one_cell() {
	let (a, b) = (RecordId::new(), RecordId::new());
	let (mut tracker, host) = tracker_with(&[(a, glenlivet()), (b, padron())]).await;

	let before_a = tracker.cells(a).unwrap().to_vec();
	let before_b = tracker.cells(b).unwrap().to_vec();

	let target = CellId::new(a, "distillery");
	tracker.route_update(&target, json!("Glenlivet")).await.unwrap();

	let after_a = tracker.cells(a).unwrap();
	let changed: Vec<_> = before_a
		.iter()
		.zip(after_a)
		.filter(|(old, new)| old != new)
		.map(|(_, new)| new.cell_id.clone())
		.collect();
	assert_eq!(changed, vec![target]);
	assert_eq!(tracker.cells(b).unwrap(), before_b.as_slice());
	assert_eq!(host.persist_count(), 1);
}

#[tokio::test]
async fn unknown_entity_is_a_no_op() {
	let id = RecordId::new();
	let (mut tracker, host) = tracker_with(&[(id, glenlivet())]).await;
	let before = tracker.cells(id).unwrap().to_vec();

	let err = tracker
		.route_update(&CellId::from("nobody_abv"), json!("1.0%"))
		.await
		.unwrap_err();

	assert!(matches!(err, TrackerError::NoSuchCell(_)));
	assert!(!err.is_fatal());
	assert_eq!(tracker.cells(id).unwrap(), before.as_slice());
	assert_eq!(host.persist_count(), 0);
	assert!(host.notified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn update_after_detach_reports_no_such_cell() {
	let (gone, kept) = (RecordId::new(), RecordId::new());
	let (mut tracker, host) = tracker_with(&[(gone, glenlivet()), (kept, padron())]).await;

	tracker.detach(gone).await.unwrap();
	assert_eq!(host.deregistered.lock().unwrap().clone(), vec![gone]);

	let err = tracker
		.route_update(&CellId::new(gone, "abv"), json!("43.0%"))
		.await
		.unwrap_err();
	assert!(matches!(err, TrackerError::NoSuchCell(_)));
	assert_eq!(host.persist_count(), 0);

	// The other record keeps working
	tracker
		.route_update(&CellId::new(kept, "strength"), json!("Medium"))
		.await
		.unwrap();
	assert_eq!(
		host.last_persisted().unwrap().1.get("strength"),
		Some(&json!("Medium"))
	);
}

#[tokio::test]
async fn identity_cells_write_their_payload_keys() {
	let id = RecordId::new();
	let (mut tracker, host) = tracker_with(&[(id, glenlivet())]).await;

	tracker
		.route_update(&CellId::new(id, "Image Path"), json!("img://new"))
		.await
		.unwrap();

	let payload = host.last_persisted().unwrap().1;
	assert_eq!(payload.get("image_path"), Some(&json!("img://new")));
	assert!(payload.get("image path").is_none());
	assert_eq!(
		tracker.active().get(id).unwrap().record.image_reference,
		"img://new"
	);

	// Extra metadata follows the new value
	let cell = tracker.cell(&CellId::new(id, "Image Path")).unwrap();
	assert_eq!(cell.extra_attributes()["image_url"], json!("img://new"));
}

#[tokio::test]
async fn invalid_identity_value_changes_nothing() {
	let id = RecordId::new();
	let (mut tracker, host) = tracker_with(&[(id, glenlivet())]).await;

	let image = CellId::new(id, "Image Path");
	let err = tracker.route_update(&image, json!(null)).await.unwrap_err();

	assert!(matches!(err, TrackerError::InvalidValue { .. }));
	assert_eq!(tracker.cell(&image).unwrap().current_value, json!("img://1"));
	assert_eq!(host.persist_count(), 0);
}

#[tokio::test]
async fn failed_persist_leaves_the_cell_unchanged() {
	let id = RecordId::new();
	let (mut tracker, host) = tracker_with(&[(id, glenlivet())]).await;
	*host.fail_persist.lock().unwrap() = true;

	let abv = CellId::new(id, "abv");
	let err = tracker.route_update(&abv, json!("43.0%")).await.unwrap_err();

	assert!(matches!(err, TrackerError::Host(_)));
	assert_eq!(tracker.cell(&abv).unwrap().current_value, json!("40.0%"));
	assert!(host.notified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn values_are_stored_verbatim() {
	let id = RecordId::new();
	let (mut tracker, host) = tracker_with(&[(id, glenlivet())]).await;

	// No unit formatting is applied on update
	tracker
		.route_update(&CellId::new(id, "abv"), json!(43))
		.await
		.unwrap();

	assert_eq!(host.last_persisted().unwrap().1.get("abv"), Some(&json!(43)));
}

#[tokio::test]
async fn event_loop_applies_updates_in_order() {
	let id = RecordId::new();
	let (mut tracker, host) = tracker_with(&[(id, glenlivet())]).await;
	let bus = EventBus::new(16);
	let subscriber = bus.subscribe();

	let abv = CellId::new(id, "abv");
	for value in ["41.0%", "42.0%", "43.0%"] {
		bus.emit(Event::Update(UpdateEvent {
			entity_id: abv.clone(),
			value: json!(value),
		}));
	}
	// A stale event in between must not stop the loop
	bus.emit(Event::Update(UpdateEvent {
		entity_id: CellId::from("stale_abv"),
		value: json!("0.0%"),
	}));
	bus.emit(Event::TrackerShutdown);

	timeout(Duration::from_secs(5), tracker.run(subscriber))
		.await
		.unwrap();

	let values: Vec<_> = host
		.persisted
		.lock()
		.unwrap()
		.iter()
		.map(|(_, payload)| payload.get("abv").cloned().unwrap())
		.collect();
	assert_eq!(values, vec![json!("41.0%"), json!("42.0%"), json!("43.0%")]);
	assert_eq!(tracker.cell(&abv).unwrap().current_value, json!("43.0%"));
}
