//! Personal inventory tracker for consumables
//!
//! A record of a chosen category (whisky, rum, wine, cigar, coffee) is
//! materialized into one independently observable cell per attribute. External
//! updates are routed to a single cell and the owning record is written back to
//! durable storage.

pub mod collector;
pub mod common;
pub mod config;
pub mod domain;
pub mod host;
pub mod infra;
pub mod tracker;

pub use common::errors::{HostError, Result, TrackerError};
pub use config::TrackerConfig;
pub use domain::{AttributeCell, Category, CellId, Record, RecordId, RecordPayload};
pub use host::{LocalHost, PresentationHost, RecordStore};
pub use infra::event::{Event, EventBus, EventSubscriber, UpdateEvent};
pub use tracker::Tracker;
