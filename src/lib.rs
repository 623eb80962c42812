//! Stateful playback for TV media engines.
//!
//! Hosts implement [`NativeEngine`] (and optionally [`LicenseClient`]) for
//! their vendor player, hand it to [`PlaybackConfig`] and drive the result
//! through [`PlaybackController`].
//!
//! ```ignore
//! use tv_playback::{PlaybackConfig, PlaybackController, PrepareOptions, StatefulPlayback};
//!
//! let config = PlaybackConfig::builder().engine(engine).build()?;
//! let playback = StatefulPlayback::new(config)?;
//! let mut events = playback.subscribe();
//!
//! playback.prepare("https://cdn.example.com/live.m3u8", PrepareOptions::default())?;
//! while let Ok(event) = events.recv().await {
//!     println!("{}", event.description());
//! }
//! ```

pub use bridge_traits::{
    BridgeError, ConsoleLogger, DrmError, DrmType, LicenseClient, LogEntry, LogLevel, LoggerSink,
    NativeDrmType, NativeEngine, NativeEventSink, NativeMediaType, Orientation, RawNativeEvent,
    Rect, VideoType,
};
pub use core_playback::{
    detect, AspectRatio, DrmErrorListener, DrmHook, HookState, MediaType, PlaybackController,
    PlaybackError, PrepareOptions, Proportion, StateChange, StatefulPlayback, Transferring,
    Viewport,
};
pub use core_runtime::{
    init_logging, EventBus, EventStream, LogFormat, LoggingConfig, PlaybackConfig,
    PlaybackConfigBuilder, PlaybackEvent, PlaybackState, VideoOptimisation,
};

/// Lower-level building blocks for hosts that need them.
pub mod prelude {
    pub use core_async::{runtime, sync, task, time};
    pub use core_playback::{clamp, native_event, state};
}
