//! Tracker configuration management

pub mod app_config;
pub mod migration;

pub use app_config::{TrackerConfig, DEFAULT_LOG_LEVEL};
pub use migration::Migrate;
pub use sst_config::default_data_dir;
