//! # Playback Error Types

use bridge_traits::{BridgeError, DrmError};
use core_runtime::PlaybackState;
use thiserror::Error;

/// An operation the native engine cannot perform at all.
///
/// Callers are expected to feature-detect instead of retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported feature: {0}")]
pub struct UnsupportedFeature(pub String);

impl UnsupportedFeature {
    pub fn new(feature: impl Into<String>) -> Self {
        Self(feature.into())
    }
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedFeature),

    /// The state machine refused the requested transition.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: PlaybackState,
        to: PlaybackState,
    },

    /// Construction failed earlier; only `destroy` is meaningful now.
    #[error("Playback adapter is {0}")]
    InvalidState(PlaybackState),

    #[error("Native engine error: {0}")]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Drm(#[from] DrmError),

    #[error("Malformed native event `{name}`: {reason}")]
    MalformedEvent { name: String, reason: String },

    #[error(transparent)]
    Config(#[from] core_runtime::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    pub fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// `true` for errors the caller could have avoided by checking state or
    /// capabilities first.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::Unsupported(_)
                | PlaybackError::InvalidTransition { .. }
                | PlaybackError::InvalidState(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
