//! # Playback Adapter
//!
//! Exposes a callback-driven native media engine as a finite-state playback
//! device.
//!
//! ## Overview
//!
//! - [`native_event`]: the engine's event vocabulary and error codes
//! - [`state`]: the state machine with two-phase transitions
//! - [`device`]: [`StatefulPlayback`], the adapter itself
//! - [`drm_hook`]: PlayReady provisioning ahead of `prepare`
//! - [`viewport`]: display area and orientation forwarding
//!
//! Applications program against [`PlaybackController`] and observe the
//! device through [`core_runtime::PlaybackEvent`]s.

pub mod clamp;
pub mod controller;
pub mod device;
pub mod drm_hook;
pub mod error;
pub mod factory;
pub mod native_event;
pub mod position;
mod router;
pub mod state;
pub mod viewport;

pub use controller::{MediaType, PlaybackController, PrepareOptions};
pub use device::StatefulPlayback;
pub use drm_hook::{DrmErrorListener, DrmHook, HookState};
pub use error::{PlaybackError, Result, UnsupportedFeature};
pub use factory::detect;
pub use native_event::{NativeErrorCode, NativeEvent};
pub use state::{StateChange, StateMachine, TransitionIntent, TransitionTicket};
pub use viewport::{AspectRatio, Proportion, Transferring, Viewport};
