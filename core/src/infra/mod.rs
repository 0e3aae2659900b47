//! Infrastructure layer - event bus and logging

pub mod event;
pub mod logging;
