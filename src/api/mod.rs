pub mod backend;
pub mod client;
pub mod types;

pub use backend::PrinterBackend;
pub use client::HttpBackend;
pub use types::{SavedValues, SnapshotResponse, TemperatureReading, Temperatures};
