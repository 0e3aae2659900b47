pub mod errors;

pub use errors::{HostError, Result, TrackerError};
