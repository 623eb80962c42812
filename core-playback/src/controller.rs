//! Application-facing playback capability.

use std::sync::Arc;

use bridge_traits::{DrmType, LicenseClient, NativeMediaType};
use core_runtime::{EventStream, PlaybackState};
use serde::{Deserialize, Serialize};

use crate::error::{Result, UnsupportedFeature};

/// Container format hint for [`PlaybackController::prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Hls,
    Dash,
    /// Microsoft Smooth Streaming.
    Mss,
    /// Plain file download (mp4, webm, ...).
    Progressive,
}

impl MediaType {
    pub fn to_native(self) -> NativeMediaType {
        match self {
            MediaType::Hls => NativeMediaType::Hls,
            MediaType::Dash => NativeMediaType::Dash,
            MediaType::Mss => NativeMediaType::Ss,
            MediaType::Progressive => NativeMediaType::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareOptions {
    /// Initial position in milliseconds.
    pub start_position: Option<u64>,
    pub media_type: Option<MediaType>,
}

impl PrepareOptions {
    pub fn with_start_position(mut self, position: u64) -> Self {
        self.start_position = Some(position);
        self
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    /// Media type sent to the engine; `Auto` when none was given.
    pub fn native_media_type(&self) -> NativeMediaType {
        self.media_type
            .map_or(NativeMediaType::Auto, MediaType::to_native)
    }
}

/// A finite-state playback device.
///
/// Commands return once the engine accepted them. Their outcome (and every
/// state change) is observed through [`PlaybackController::subscribe`].
/// Positions and durations are milliseconds, volume is percent.
pub trait PlaybackController: Send + Sync {
    fn prepare(&self, url: &str, options: PrepareOptions) -> Result<()>;
    fn play(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
    /// Seeks to `position`, clamped to `[1, duration - 1]`.
    fn set_position(&self, position: u64) -> Result<()>;
    /// Tears the device down. Idempotent.
    fn destroy(&self) -> Result<()>;

    fn state(&self) -> PlaybackState;
    fn subscribe(&self) -> EventStream;

    fn position(&self) -> u64;
    /// `None` for live streams or while unknown.
    fn duration(&self) -> Option<u64>;
    fn url(&self) -> Option<String>;

    fn volume(&self) -> u8;
    /// Sets the volume, clamped to `0..=100`.
    fn set_volume(&self, volume: i64) -> Result<()>;
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool) -> Result<()>;

    fn playback_rate(&self) -> std::result::Result<f64, UnsupportedFeature> {
        Err(UnsupportedFeature::new("Playback rate"))
    }

    fn set_playback_rate(&self, _rate: f64) -> std::result::Result<(), UnsupportedFeature> {
        Err(UnsupportedFeature::new("Playback rate"))
    }

    fn forward(&self, _step: u64) -> std::result::Result<(), UnsupportedFeature> {
        Err(UnsupportedFeature::new("Forward"))
    }

    fn rewind(&self, _step: u64) -> std::result::Result<(), UnsupportedFeature> {
        Err(UnsupportedFeature::new("Rewind"))
    }

    fn attach_drm(&self, client: Arc<dyn LicenseClient>) -> Result<()>;
    /// Destroys the attached hook of type `drm_type`, if any.
    fn detach_drm(&self, drm_type: DrmType);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_mapping() {
        assert_eq!(MediaType::Hls.to_native(), NativeMediaType::Hls);
        assert_eq!(MediaType::Dash.to_native(), NativeMediaType::Dash);
        assert_eq!(MediaType::Mss.to_native(), NativeMediaType::Ss);
        assert_eq!(MediaType::Progressive.to_native(), NativeMediaType::Auto);
    }

    #[test]
    fn test_prepare_options() {
        assert_eq!(
            PrepareOptions::default().native_media_type(),
            NativeMediaType::Auto
        );

        let options = PrepareOptions::default()
            .with_start_position(30_000)
            .with_media_type(MediaType::Mss);
        assert_eq!(options.start_position, Some(30_000));
        assert_eq!(options.native_media_type(), NativeMediaType::Ss);
    }
}
