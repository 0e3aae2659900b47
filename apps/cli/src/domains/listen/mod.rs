//! Feed update events from stdin through the event bus
//!
//! Each line is either a full bus event (`{"event_type": "update", "data": ...}`)
//! or a bare update (`{"entity_id": "...", "value": ...}`). End of input shuts
//! the tracker down.

use anyhow::Result;
use serde_json::Value;
use sst_core::infra::event::{STATE_CHANGED_EVENT, UPDATE_EVENT};
use sst_core::{CellId, Event, EventBus, EventSubscriber, Tracker, UpdateEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::context::{Context, OutputFormat};
use crate::util::prelude::*;

pub async fn run(ctx: &mut Context) -> Result<()> {
	let format = ctx.format;
	let events = ctx.events.clone();
	let stdin = BufReader::new(tokio::io::stdin());

	info!("Reading update events from stdin");
	apply_lines(&mut ctx.tracker, &events, stdin, |entity_id, value| {
		print_change(format, entity_id, value)
	})
	.await
}

/// Emit every line of `input` on the bus and let `tracker` apply it.
///
/// `on_change` sees every state change the tracker made, including changes
/// still queued on the bus when the input ends.
async fn apply_lines<R, F>(
	tracker: &mut Tracker,
	events: &EventBus,
	input: R,
	on_change: F,
) -> Result<()>
where
	R: AsyncBufRead + Unpin,
	F: FnMut(&CellId, &Value) -> Result<()>,
{
	let updates = events.subscribe_to(UPDATE_EVENT);
	let changes = events.subscribe_to(STATE_CHANGED_EVENT);
	let (stopped_tx, stopped_rx) = oneshot::channel();

	let apply = async {
		tracker.run(updates).await;
		// Every change is on the bus once the loop returns. The watcher is only
		// gone if it already failed.
		let _ = stopped_tx.send(());
	};

	let (read, (), watched) = tokio::join!(
		read_lines(input, events),
		apply,
		watch_changes(changes, stopped_rx, on_change),
	);

	read?;
	watched
}

async fn read_lines<R>(input: R, events: &EventBus) -> Result<()>
where
	R: AsyncBufRead + Unpin,
{
	let mut lines = input.lines();

	let result = async {
		while let Some(line) = lines.next_line().await? {
			let line = line.trim();
			if line.is_empty() {
				continue;
			}
			match parse_event(line) {
				Some(event) => events.emit(event),
				None => warn!("Ignoring line that is not an update event: {}", line),
			}
			tokio::task::yield_now().await;
		}
		Ok::<_, anyhow::Error>(())
	}
	.await;

	// Stop the tracker even when reading failed
	events.emit(Event::TrackerShutdown);
	result
}

fn parse_event(line: &str) -> Option<Event> {
	serde_json::from_str::<Event>(line)
		.ok()
		.or_else(|| serde_json::from_str::<UpdateEvent>(line).ok().map(Event::Update))
}

/// Hand state changes to `on_change` until the tracker loop has stopped
async fn watch_changes<F>(
	mut changes: EventSubscriber,
	mut stopped: oneshot::Receiver<()>,
	mut on_change: F,
) -> Result<()>
where
	F: FnMut(&CellId, &Value) -> Result<()>,
{
	loop {
		tokio::select! {
			biased;
			received = changes.recv() => match received {
				Ok(Event::StateChanged { entity_id, value }) => on_change(&entity_id, &value)?,
				// Shutdown only marks the end of input, updates may still be applying
				Ok(_) => {}
				Err(RecvError::Lagged(missed)) => {
					warn!("{} state changes were not reported", missed);
				}
				Err(RecvError::Closed) => return Ok(()),
			},
			_ = &mut stopped => break,
		}
	}

	// Changes that were queued when the stop signal arrived
	loop {
		match changes.try_recv() {
			Ok(Event::StateChanged { entity_id, value }) => on_change(&entity_id, &value)?,
			Ok(_) => {}
			Err(TryRecvError::Lagged(missed)) => {
				warn!("{} state changes were not reported", missed);
			}
			Err(_) => break,
		}
	}
	Ok(())
}

fn print_change(format: OutputFormat, entity_id: &CellId, value: &Value) -> Result<()> {
	print_output!(format, &(entity_id, value), |(entity_id, value): &(&CellId, &Value)| {
		println!("{} = {}", entity_id, display_value(value));
	});
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use sst_core::{collector, LocalHost, RecordStore};
	use std::sync::Arc;

	#[test]
	fn accepts_bare_updates_and_bus_events() {
		let bare = parse_event(r#"{"entity_id": "abc_abv", "value": "43.0%", "extra": 1}"#);
		let tagged = parse_event(
			r#"{"event_type": "update", "data": {"entity_id": "abc_abv", "value": "43.0%"}}"#,
		);

		let expected = Event::Update(UpdateEvent {
			entity_id: "abc_abv".into(),
			value: json!("43.0%"),
		});
		assert_eq!(bare, Some(expected.clone()));
		assert_eq!(tagged, Some(expected));
	}

	#[test]
	fn rejects_other_lines() {
		assert_eq!(parse_event("not json"), None);
		assert_eq!(parse_event(r#"{"value": 1}"#), None);
	}

	#[tokio::test]
	async fn reports_every_change_when_input_ends_at_once() {
		let temp = tempfile::tempdir().unwrap();
		let events = EventBus::new(64);
		let host = Arc::new(LocalHost::new(RecordStore::new(temp.path()), events.clone()));
		let mut tracker = Tracker::new(host.clone());

		let Value::Object(form) = json!({
			"item_name": "Glenlivet 18",
			"image_path": "img://1",
			"abv": 40,
		}) else {
			unreachable!()
		};
		let payload = collector::start().select("Whisky").unwrap().submit(&form).unwrap();
		let id = host.store().create(&payload).await.unwrap();
		tracker.attach(id, &payload).await.unwrap();

		let abv = CellId::new(id, "abv");
		let input = format!(
			"{{\"entity_id\": \"{abv}\", \"value\": \"41.0%\"}}\n\
			 not an event\n\
			 {{\"entity_id\": \"{abv}\", \"value\": \"42.0%\"}}\n"
		);

		let mut seen = Vec::new();
		apply_lines(&mut tracker, &events, input.as_bytes(), |entity_id, value| {
			seen.push((entity_id.clone(), value.clone()));
			Ok(())
		})
		.await
		.unwrap();

		assert_eq!(
			seen,
			vec![(abv.clone(), json!("41.0%")), (abv.clone(), json!("42.0%"))]
		);
		assert_eq!(
			host.store().read(id).await.unwrap().unwrap().get("abv"),
			Some(&json!("42.0%"))
		);
	}
}
