//! Strawberry Player CLI Library
//!
//! Headless terminal front-end for the playback controller: configuration,
//! catalog providers, a simulated output device, a logging control surface
//! and the interactive key loop.
//!
//! This library exposes the components for testing purposes.

pub mod config;
pub mod error;
pub mod keys;
pub mod player;
pub mod provider;
pub mod sim_device;
pub mod surface;

// Re-export commonly used types for convenience
pub use config::CliConfig;
pub use error::{CliError, Result};
pub use provider::{provider_for, CatalogDocument, FileCatalogProvider, HttpCatalogProvider};
pub use sim_device::{SimulatedClock, SimulatedDevice};
pub use surface::LogSurface;
