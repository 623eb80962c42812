//! # Playback Configuration
//!
//! Builder-based configuration for the playback adapter.
//!
//! ## Overview
//!
//! [`PlaybackConfig`] carries the injected native engine handle plus the few
//! tunables the adapter has. The builder validates everything up front so the
//! adapter never starts with a configuration it cannot honour.
//!
//! ## Required Dependencies
//!
//! - `NativeEngine` - the vendor media engine bridge
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{PlaybackConfig, VideoOptimisation};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = PlaybackConfig::builder()
//!     .engine(Arc::new(MyEngine::new()))
//!     .time_update_interval(Duration::from_millis(250))
//!     .video_optimisation(VideoOptimisation::RotationSupport)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! A missing engine is reported as [`Error::CapabilityMissing`] so callers can
//! tell "this platform has no engine" apart from a bad setting:
//!
//! ```
//! use core_runtime::config::PlaybackConfig;
//!
//! let err = PlaybackConfig::builder().build().unwrap_err();
//! assert!(err.is_capability_missing());
//! ```

use crate::error::{Error, Result};
use bridge_traits::NativeEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Interval between `TimeUpdate` notifications while playing.
pub const DEFAULT_TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(200);

/// Upper bound for the time update interval. Anything slower is useless for a
/// progress bar.
pub const MAX_TIME_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

pub const DEFAULT_EVENT_BUFFER_SIZE: usize = crate::events::DEFAULT_EVENT_BUFFER_SIZE;

/// Rendering trade-off requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoOptimisation {
    /// Composited texture rendering; allows rotating the video.
    RotationSupport,
    /// Hardware overlay rendering; smoother, no rotation.
    SmoothPlayback,
}

/// Validated adapter configuration. Use [`PlaybackConfigBuilder`] to construct.
#[derive(Clone)]
pub struct PlaybackConfig {
    pub engine: Arc<dyn NativeEngine>,

    /// Period of the position timer while playing.
    pub time_update_interval: Duration,

    /// Capacity of the application event channel. Slow subscribers that fall
    /// further behind receive `RecvError::Lagged`.
    pub event_buffer_size: usize,

    /// Renderer hint applied once at construction.
    pub video_optimisation: Option<VideoOptimisation>,
}

impl std::fmt::Debug for PlaybackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackConfig")
            .field("engine", &"NativeEngine { ... }")
            .field("time_update_interval", &self.time_update_interval)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("video_optimisation", &self.video_optimisation)
            .finish()
    }
}

impl PlaybackConfig {
    pub fn builder() -> PlaybackConfigBuilder {
        PlaybackConfigBuilder::default()
    }

    /// Checks the tunables:
    /// - time update interval is non-zero and at most 10 s
    /// - event buffer holds at least one event
    pub fn validate(&self) -> Result<()> {
        if self.time_update_interval.is_zero() {
            return Err(Error::Config(
                "Time update interval must be greater than 0ms".to_string(),
            ));
        }

        if self.time_update_interval > MAX_TIME_UPDATE_INTERVAL {
            return Err(Error::Config(format!(
                "Time update interval exceeds maximum of {}ms",
                MAX_TIME_UPDATE_INTERVAL.as_millis()
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn engine_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "NativeEngine".to_string(),
        message: "No native engine handle was provided. \
                  TV hosts: inject the vendor player bridge. \
                  Tests: inject a substitute engine implementation."
            .to_string(),
    }
}

/// Builder for [`PlaybackConfig`].
#[derive(Default)]
pub struct PlaybackConfigBuilder {
    engine: Option<Arc<dyn NativeEngine>>,
    time_update_interval: Option<Duration>,
    event_buffer_size: Option<usize>,
    video_optimisation: Option<VideoOptimisation>,
}

impl PlaybackConfigBuilder {
    /// Sets the native engine handle (required).
    pub fn engine(mut self, engine: Arc<dyn NativeEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Default: 200ms
    pub fn time_update_interval(mut self, interval: Duration) -> Self {
        self.time_update_interval = Some(interval);
        self
    }

    /// Default: 100 events
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn video_optimisation(mut self, optimisation: VideoOptimisation) -> Self {
        self.video_optimisation = Some(optimisation);
        self
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when no engine was injected
    /// - [`Error::Config`] when a tunable is out of range
    pub fn build(self) -> Result<PlaybackConfig> {
        let engine = self.engine.ok_or_else(engine_missing_error)?;

        let config = PlaybackConfig {
            engine,
            time_update_interval: self
                .time_update_interval
                .unwrap_or(DEFAULT_TIME_UPDATE_INTERVAL),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            video_optimisation: self.video_optimisation,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        NativeDrmType, NativeEventSink, NativeMediaType, Orientation, Rect, VideoType,
    };

    struct NullEngine;

    impl NativeEngine for NullEngine {
        fn create(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn start(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn pause(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn stop(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn restart(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn destroy(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn set_media_type(&self, _media_type: NativeMediaType) -> BridgeResult<()> {
            Ok(())
        }
        fn set_video_uri(&self, _uri: &str) -> BridgeResult<()> {
            Ok(())
        }
        fn video_uri(&self) -> Option<String> {
            None
        }
        fn seek_to(&self, _position_ms: u64) -> BridgeResult<()> {
            Ok(())
        }
        fn current_position(&self) -> u64 {
            0
        }
        fn duration(&self) -> Option<u64> {
            None
        }
        fn is_live_stream(&self) -> bool {
            false
        }
        fn volume(&self) -> u8 {
            100
        }
        fn set_volume(&self, _volume: u8) -> BridgeResult<()> {
            Ok(())
        }
        fn muted(&self) -> bool {
            false
        }
        fn set_muted(&self, _muted: bool) -> BridgeResult<()> {
            Ok(())
        }
        fn set_area(&self, _area: Rect) -> BridgeResult<()> {
            Ok(())
        }
        fn set_orientation(&self, _orientation: Orientation) -> BridgeResult<()> {
            Ok(())
        }
        fn set_video_type(&self, _video_type: VideoType) -> BridgeResult<()> {
            Ok(())
        }
        fn video_type(&self) -> VideoType {
            VideoType::SurfaceView
        }
        fn set_drm(&self, _drm: NativeDrmType, _license: Option<&str>) -> BridgeResult<()> {
            Ok(())
        }
        fn set_event_sink(&self, _sink: Option<NativeEventSink>) {}
    }

    fn builder() -> PlaybackConfigBuilder {
        PlaybackConfig::builder().engine(Arc::new(NullEngine))
    }

    #[test]
    fn test_builder_requires_engine() {
        let result = PlaybackConfig::builder().build();

        let err = result.unwrap_err();
        assert!(err.is_capability_missing());
        assert!(err.to_string().contains("NativeEngine"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.time_update_interval, Duration::from_millis(200));
        assert_eq!(config.event_buffer_size, 100);
        assert_eq!(config.video_optimisation, None);
    }

    #[test]
    fn test_builder_overrides() {
        let config = builder()
            .time_update_interval(Duration::from_millis(500))
            .event_buffer_size(8)
            .video_optimisation(VideoOptimisation::RotationSupport)
            .build()
            .unwrap();

        assert_eq!(config.time_update_interval, Duration::from_millis(500));
        assert_eq!(config.event_buffer_size, 8);
        assert_eq!(
            config.video_optimisation,
            Some(VideoOptimisation::RotationSupport)
        );
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let err = builder()
            .time_update_interval(Duration::ZERO)
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("must be greater than 0"));
    }

    #[test]
    fn test_validate_rejects_excessive_interval() {
        let err = builder()
            .time_update_interval(Duration::from_secs(11))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_validate_rejects_empty_buffer() {
        let err = builder().event_buffer_size(0).build().unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_debug_hides_engine() {
        let config = builder().build().unwrap();
        let debug = format!("{:?}", config);

        assert!(debug.contains("NativeEngine { ... }"));
        assert!(debug.contains("time_update_interval"));
    }

    #[test]
    fn test_has_engine() {
        assert!(!PlaybackConfig::builder().has_engine());
        assert!(builder().has_engine());
    }
}
