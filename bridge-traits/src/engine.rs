//! Native media engine bridge.
//!
//! The vendor engine exposes an imperative command surface and a single
//! event callback slot. Commands are fire-and-forget: success only means the
//! engine accepted the call, and every outcome is reported later through the
//! event stream. The callback slot is modelled here as a [`NativeEventSink`],
//! a typed channel the adapter installs once and reads from a single task.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};
use core_async::sync::mpsc;

/// Stream container hint passed to the engine before a URI is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeMediaType {
    Auto,
    Dash,
    Hls,
    /// Smooth Streaming.
    Ss,
    Rtmp,
}

impl NativeMediaType {
    /// Wire name understood by the vendor bridge.
    pub fn as_str(&self) -> &'static str {
        match self {
            NativeMediaType::Auto => "auto",
            NativeMediaType::Dash => "dash",
            NativeMediaType::Hls => "hls",
            NativeMediaType::Ss => "ss",
            NativeMediaType::Rtmp => "rtmp",
        }
    }
}

impl fmt::Display for NativeMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render surface backing the video layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoType {
    /// Hardware overlay. Fast, but cannot rotate.
    SurfaceView,
    /// Composited texture. Supports rotation.
    TextureView,
}

impl VideoType {
    pub fn supports_rotation(&self) -> bool {
        matches!(self, VideoType::TextureView)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    #[default]
    Landscape,
    LandscapeInverse,
    Portrait,
    PortraitInverse,
}

impl Orientation {
    pub fn is_landscape(&self) -> bool {
        matches!(self, Orientation::Landscape)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Orientation::Landscape => "LANDSCAPE",
            Orientation::LandscapeInverse => "LANDSCAPE_INVERSE",
            Orientation::Portrait => "PORTRAIT",
            Orientation::PortraitInverse => "PORTRAIT_INVERSE",
        };
        f.write_str(name)
    }
}

/// DRM scheme identifiers accepted by `set_drm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeDrmType {
    PlayReady,
    None,
}

/// Display rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// An untyped event exactly as the engine emitted it: a name plus
/// positional string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNativeEvent {
    pub name: String,
    pub args: Vec<String>,
}

impl RawNativeEvent {
    pub fn new<N, I, A>(name: N, args: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for RawNativeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Sending half of the engine's event slot.
///
/// Engine implementations call [`NativeEventSink::emit`] from whatever thread
/// their vendor callback arrives on. Delivery never blocks; events sent after
/// the adapter went away are dropped.
#[derive(Debug, Clone)]
pub struct NativeEventSink {
    tx: mpsc::UnboundedSender<RawNativeEvent>,
}

impl NativeEventSink {
    /// Creates a connected sink/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RawNativeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns `false` if nobody is listening anymore.
    pub fn emit<I, A>(&self, name: &str, args: I) -> bool
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.send(RawNativeEvent::new(name, args))
    }

    pub fn send(&self, event: RawNativeEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Vendor media engine contract.
///
/// Positions and durations are milliseconds. Volume is an integer percent in
/// `0..=100`. Getters are infallible because the vendor bridge answers them
/// from cached state.
pub trait NativeEngine: PlatformSendSync {
    // Lifecycle

    /// Allocates the native player object. Called exactly once by the adapter.
    fn create(&self) -> Result<()>;
    fn start(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
    fn restart(&self) -> Result<()>;
    /// Releases the native player. The engine confirms with a `destroyed` event.
    fn destroy(&self) -> Result<()>;

    // Media control

    fn set_media_type(&self, media_type: NativeMediaType) -> Result<()>;
    fn set_video_uri(&self, uri: &str) -> Result<()>;
    fn video_uri(&self) -> Option<String>;
    fn seek_to(&self, position_ms: u64) -> Result<()>;
    fn current_position(&self) -> u64;
    /// `None` while unknown.
    fn duration(&self) -> Option<u64>;
    fn is_live_stream(&self) -> bool;

    // Volume

    fn volume(&self) -> u8;
    fn set_volume(&self, volume: u8) -> Result<()>;
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool) -> Result<()>;

    // Geometry

    fn set_area(&self, area: Rect) -> Result<()>;
    fn set_orientation(&self, orientation: Orientation) -> Result<()>;
    fn set_video_type(&self, video_type: VideoType) -> Result<()>;
    fn video_type(&self) -> VideoType;

    // DRM

    fn set_drm(&self, drm: NativeDrmType, license_server: Option<&str>) -> Result<()>;

    /// Installs (or clears with `None`) the single event slot. A new sink
    /// replaces any previous one.
    fn set_event_sink(&self, sink: Option<NativeEventSink>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_wire_names() {
        assert_eq!(NativeMediaType::Ss.as_str(), "ss");
        assert_eq!(NativeMediaType::Auto.to_string(), "auto");
        assert_eq!(
            serde_json::to_string(&NativeMediaType::Hls).unwrap(),
            "\"hls\""
        );
    }

    #[test]
    fn test_video_type_rotation() {
        assert!(!VideoType::SurfaceView.supports_rotation());
        assert!(VideoType::TextureView.supports_rotation());
        assert_eq!(
            serde_json::to_string(&VideoType::TextureView).unwrap(),
            "\"TEXTURE_VIEW\""
        );
    }

    #[test]
    fn test_raw_event_display() {
        let event = RawNativeEvent::new("error", ["5", "decoder died"]);
        assert_eq!(event.to_string(), "error 5 decoder died");
    }

    #[tokio::test]
    async fn test_sink_delivers_in_order() {
        let (sink, mut rx) = NativeEventSink::channel();
        assert!(sink.emit("ready", ["false"]));
        assert!(sink.emit::<_, &str>("idle", []));

        assert_eq!(rx.recv().await.unwrap().name, "ready");
        assert_eq!(rx.recv().await.unwrap().name, "idle");

        drop(rx);
        assert!(sink.is_closed());
        assert!(!sink.emit::<_, &str>("ended", []));
    }
}
