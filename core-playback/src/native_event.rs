//! Native event vocabulary.
//!
//! The engine pushes `(name, ...args)` tuples with string arguments. This
//! module turns them into [`NativeEvent`] values. Unknown names are kept as
//! [`NativeEvent::Unknown`] so newer engine builds never break the adapter.

use std::fmt;

use bridge_traits::RawNativeEvent;

use crate::error::{PlaybackError, Result};

pub const READY: &str = "ready";
pub const TIMELINE_CHANGED: &str = "timeline_changed";
pub const TRACKS_CHANGED: &str = "tracks_changed";
pub const ENDED: &str = "ended";
pub const DESTROYED: &str = "destroyed";
pub const STALLED: &str = "stalled";
pub const FIRST_FRAME: &str = "first_frame";
pub const IDLE: &str = "idle";
pub const POSITION_DISCONTINUITY: &str = "position_discontinuity";
pub const SEEK: &str = "seek";
pub const SEEK_PROCESSED: &str = "seek_processed";
pub const VOLUME_CHANGED: &str = "volume_changed";
pub const PLAYBACK_RATE_CHANGED: &str = "playback_rate_changed";
pub const ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    /// Buffering finished. `starting_playback` tells whether the engine is
    /// about to play or stays paused.
    Ready { starting_playback: bool },
    TimelineChanged,
    TracksChanged,
    Ended,
    Destroyed,
    Stalled,
    FirstFrame,
    Idle,
    PositionDiscontinuity,
    Seek,
    SeekProcessed,
    VolumeChanged { level: u8 },
    PlaybackRateChanged,
    Error {
        code: NativeErrorCode,
        message: Option<String>,
    },
    Unknown { name: String, args: Vec<String> },
}

impl NativeEvent {
    /// Parses a raw engine event.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::MalformedEvent`] when a known event carries arguments
    /// that cannot be interpreted.
    pub fn parse(raw: &RawNativeEvent) -> Result<Self> {
        let name = raw.name.as_str();
        let arg = |index: usize| raw.args.get(index).map(|value| value.trim());

        let event = match name {
            READY => {
                let flag = arg(0).ok_or_else(|| {
                    PlaybackError::malformed(name, "missing starting-playback flag")
                })?;
                NativeEvent::Ready {
                    starting_playback: parse_flag(name, flag)?,
                }
            }
            TIMELINE_CHANGED => NativeEvent::TimelineChanged,
            TRACKS_CHANGED => NativeEvent::TracksChanged,
            ENDED => NativeEvent::Ended,
            DESTROYED => NativeEvent::Destroyed,
            STALLED => NativeEvent::Stalled,
            FIRST_FRAME => NativeEvent::FirstFrame,
            IDLE => NativeEvent::Idle,
            POSITION_DISCONTINUITY => NativeEvent::PositionDiscontinuity,
            SEEK => NativeEvent::Seek,
            SEEK_PROCESSED => NativeEvent::SeekProcessed,
            VOLUME_CHANGED => {
                let level = arg(0)
                    .ok_or_else(|| PlaybackError::malformed(name, "missing volume level"))?;
                NativeEvent::VolumeChanged {
                    level: parse_level(name, level)?,
                }
            }
            PLAYBACK_RATE_CHANGED => NativeEvent::PlaybackRateChanged,
            ERROR => NativeEvent::Error {
                code: NativeErrorCode::parse(arg(0).unwrap_or_default()),
                message: arg(1)
                    .filter(|message| !message.is_empty() && *message != "null")
                    .map(str::to_string),
            },
            _ => NativeEvent::Unknown {
                name: raw.name.clone(),
                args: raw.args.clone(),
            },
        };

        Ok(event)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NativeEvent::Unknown { .. })
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(PlaybackError::malformed(
            name,
            format!("expected a boolean, got `{}`", other),
        )),
    }
}

fn parse_level(name: &str, value: &str) -> Result<u8> {
    let level: f64 = value
        .parse()
        .map_err(|_| PlaybackError::malformed(name, format!("expected a number, got `{}`", value)))?;
    if !level.is_finite() {
        return Err(PlaybackError::malformed(name, "volume is not finite"));
    }
    Ok(level.round().clamp(0.0, 100.0) as u8)
}

/// Error codes reported by the engine's `error` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeErrorCode {
    CantCreateVideoObject,
    Uninitialized,
    MediaError,
    Unknown,
    /// Anything the vendor added later, kept verbatim.
    Other(String),
}

impl NativeErrorCode {
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "1" => NativeErrorCode::CantCreateVideoObject,
            "3" => NativeErrorCode::Uninitialized,
            "5" => NativeErrorCode::MediaError,
            "100" => NativeErrorCode::Unknown,
            other => NativeErrorCode::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            NativeErrorCode::CantCreateVideoObject => "1",
            NativeErrorCode::Uninitialized => "3",
            NativeErrorCode::MediaError => "5",
            NativeErrorCode::Unknown => "100",
            NativeErrorCode::Other(code) => code,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            NativeErrorCode::CantCreateVideoObject => "can't create video object",
            NativeErrorCode::Uninitialized => "player is not initialized",
            NativeErrorCode::MediaError => "media error",
            NativeErrorCode::Unknown | NativeErrorCode::Other(_) => "unknown error",
        }
    }

    /// The single human-readable string surfaced to the application.
    pub fn to_message(&self, message: Option<&str>) -> String {
        format!(
            "Native player error {}: {}",
            self.code(),
            message.unwrap_or_else(|| self.description())
        )
    }
}

impl fmt::Display for NativeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
