//! # Playback Event Bus
//!
//! Typed notification channel between the playback adapter and the owning
//! application, built on a broadcast channel.
//!
//! ## Overview
//!
//! - **PlaybackState**: the adapter's authoritative state
//! - **PlaybackEvent**: everything the application can observe
//! - **EventBus**: broadcast sender owned by the adapter
//! - **EventStream**: a receiver wrapper with optional filtering
//!
//! ```text
//! native engine ──> router ──> state machine ──emit──> EventBus ──> subscribers
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventStream, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut stream = EventStream::new(bus.subscribe())
//!     .filter(|event| !matches!(event, PlaybackEvent::Debug { .. }));
//!
//! bus.emit(PlaybackEvent::Debug { message: "Native idle".into() }).ok();
//! bus.emit(PlaybackEvent::WillPlay).ok();
//!
//! assert_eq!(stream.recv().await.unwrap(), PlaybackEvent::WillPlay);
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber fell behind and missed `n`
//!   events (time updates are the usual culprit). Non-fatal.
//! - **`RecvError::Closed`**: the adapter was dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use core_async::sync::broadcast;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Playback State
// ============================================================================

/// Authoritative adapter state. Exactly one value is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Waiting,
    Seeking,
    Ended,
    Error,
    /// Construction failed. Only `Destroyed` can follow.
    Invalid,
    /// Torn down. Absorbing.
    Destroyed,
}

impl PlaybackState {
    /// `Invalid` and `Destroyed` accept no further ordinary transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackState::Invalid | PlaybackState::Destroyed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Ready => "ready",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Waiting => "waiting",
            PlaybackState::Seeking => "seeking",
            PlaybackState::Ended => "ended",
            PlaybackState::Error => "error",
            PlaybackState::Invalid => "invalid",
            PlaybackState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Notifications published to the application.
///
/// Positions and durations are milliseconds; volume is percent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    WillPlay,
    WillPause,
    WillStop,
    /// Requested (unclamped) target of a seek.
    WillSeek { position: u64 },
    WillChangeVolume { volume: u8 },
    /// The engine finished processing a seek.
    Seeked { position: u64 },
    DurationChanged { duration: Option<u64> },
    LoadedMetadata,
    TimeUpdate { position: u64 },
    VolumeChanged { volume: u8 },
    Ended,
    /// The only error payload that crosses the adapter boundary.
    Error { message: String },
    /// Diagnostic trace (raw native events, ignored events, downgraded errors).
    Debug { message: String },
    StateChanged { from: PlaybackState, to: PlaybackState },
}

impl PlaybackEvent {
    pub fn description(&self) -> &str {
        match self {
            PlaybackEvent::WillPlay => "Playback about to start",
            PlaybackEvent::WillPause => "Playback about to pause",
            PlaybackEvent::WillStop => "Playback about to stop",
            PlaybackEvent::WillSeek { .. } => "Seek requested",
            PlaybackEvent::WillChangeVolume { .. } => "Volume change requested",
            PlaybackEvent::Seeked { .. } => "Seek completed",
            PlaybackEvent::DurationChanged { .. } => "Duration changed",
            PlaybackEvent::LoadedMetadata => "Metadata loaded",
            PlaybackEvent::TimeUpdate { .. } => "Playback position updated",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::Ended => "Playback ended",
            PlaybackEvent::Error { .. } => "Playback error",
            PlaybackEvent::Debug { .. } => "Diagnostic message",
            PlaybackEvent::StateChanged { .. } => "State changed",
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            PlaybackEvent::Error { .. } => EventSeverity::Error,
            PlaybackEvent::Debug { .. } | PlaybackEvent::TimeUpdate { .. } => {
                EventSeverity::Debug
            }
            _ => EventSeverity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast channel for [`PlaybackEvent`]s. Cheap to clone.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlaybackEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event. Fails only when nobody is subscribed.
    pub fn emit(&self, event: PlaybackEvent) -> Result<usize, SendError<PlaybackEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&PlaybackEvent) -> bool + Send + Sync>;

/// Receiver with an optional predicate; non-matching events are skipped.
pub struct EventStream {
    receiver: Receiver<PlaybackEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<PlaybackEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PlaybackEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &PlaybackEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    pub async fn recv(&mut self) -> Result<PlaybackEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive. `None` when nothing matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<PlaybackEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every matching event currently queued.
    pub fn drain(&mut self) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
