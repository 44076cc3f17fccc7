// Export our modules for use in the binary and tests
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod event;
pub mod history;
pub mod map;
pub mod telemetry;
pub mod terminal;
pub mod ui;

pub use domain::{ComplaintRecord, Coordinates, HotspotRecord, Urgency};
