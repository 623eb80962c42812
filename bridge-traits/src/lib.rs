//! # Host Bridge Traits
//!
//! Contracts between the playback core and the host platform.
//!
//! ## Traits
//!
//! - [`NativeEngine`](engine::NativeEngine) - the vendor media engine: imperative
//!   commands, cached getters and a single event slot
//! - [`LicenseClient`](drm::LicenseClient) - out-of-band DRM provisioning
//! - [`LoggerSink`](logging::LoggerSink) - forward structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! The core refuses to start when a required capability is missing:
//!
//! ```ignore
//! let engine = builder.engine.ok_or_else(|| Error::CapabilityMissing {
//!     capability: "NativeEngine".to_string(),
//!     message: "No native engine handle was provided".to_string(),
//! })?;
//! ```
//!
//! ## Error Handling
//!
//! Engine commands return [`BridgeError`](error::BridgeError); license clients
//! report [`DrmError`](drm::DrmError). Implementations should convert vendor
//! exceptions into these rather than panicking.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so handles can be shared between the
//! application thread and the adapter's background tasks.

pub mod drm;
pub mod engine;
pub mod error;
pub mod logging;
pub mod platform;

pub use drm::{DrmError, DrmType, LicenseClient};
pub use engine::{
    NativeDrmType, NativeEngine, NativeEventSink, NativeMediaType, Orientation, RawNativeEvent,
    Rect, VideoType,
};
pub use error::BridgeError;
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
