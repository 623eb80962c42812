//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the playback adapter:
//! - Logging and tracing bootstrap
//! - Validated adapter configuration
//! - The application-facing playback event bus
//!
//! ## Overview
//!
//! Nothing in here knows about the state machine itself. The playback crate
//! builds on these pieces: it reads its tunables from [`PlaybackConfig`],
//! publishes [`PlaybackEvent`]s through an [`EventBus`] and logs through
//! `tracing` as configured by [`logging::init_logging`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{PlaybackConfig, PlaybackConfigBuilder, VideoOptimisation};
pub use error::{Error, Result};
pub use events::{EventBus, EventSeverity, EventStream, PlaybackEvent, PlaybackState};
pub use logging::{init_logging, LogFormat, LoggingConfig};
