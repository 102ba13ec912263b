//! Handlers for each top-level subcommand.

pub mod category;
pub mod client;
pub mod event;
pub mod holiday;
pub mod manager;
pub mod shift;
