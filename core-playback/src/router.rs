//! Native event router.
//!
//! A single task drains the engine's event sink and applies each event to
//! the adapter. Every raw event is first echoed as a `Debug` notification.
//! `error` and `destroyed` are handled in any state; everything else is
//! swallowed once destruction has started. A failure while handling one
//! event moves the adapter to `Error` instead of stopping the router.

use std::sync::Weak;

use bridge_traits::RawNativeEvent;
use core_async::runtime::Handle;
use core_async::sync::{mpsc, CancellationToken};
use core_runtime::{PlaybackEvent, PlaybackState};
use tracing::{trace, warn};

use crate::device::{Inner, Shared};
use crate::error::Result;
use crate::native_event::NativeEvent;

/// Owns the router task. Dropping it stops the task.
#[derive(Debug)]
pub(crate) struct EventRouter {
    token: CancellationToken,
}

impl EventRouter {
    pub(crate) fn spawn(
        handle: &Handle,
        shared: Weak<Shared>,
        mut events: mpsc::UnboundedReceiver<RawNativeEvent>,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        handle.spawn(async move {
            loop {
                core_async::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    received = events.recv() => {
                        let Some(raw) = received else { break };
                        let Some(shared) = shared.upgrade() else { break };
                        shared.route(&raw);
                    }
                }
            }
            trace!("Native event router stopped");
        });

        Self { token }
    }
}

impl Drop for EventRouter {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn describe(raw: &RawNativeEvent) -> String {
    if raw.args.is_empty() {
        format!("Native {}", raw.name)
    } else {
        format!("Native {} {}", raw.name, raw.args.join(", "))
    }
}

impl Shared {
    pub(crate) fn route(&self, raw: &RawNativeEvent) {
        self.debug_message(describe(raw));

        let parsed = NativeEvent::parse(raw);
        let mut inner = self.inner.lock();

        match &parsed {
            Ok(NativeEvent::Error { code, message }) => {
                self.fail(&mut inner, code.to_message(message.as_deref()));
                return;
            }
            Ok(NativeEvent::Destroyed) => {
                if let Err(error) = self.apply_state(&mut inner, PlaybackState::Destroyed) {
                    warn!(%error, "Could not complete destruction");
                }
                return;
            }
            _ => {}
        }

        if inner.machine.is_destroying() {
            self.debug_message(format!("Native {} ignored during destruction", raw.name));
            return;
        }

        if let Err(error) = parsed.and_then(|event| self.interpret(&mut inner, event)) {
            warn!(event = %raw.name, %error, "Failed to handle native event");
            self.fail(&mut inner, error.to_string());
        }
    }

    fn interpret(&self, inner: &mut Inner, event: NativeEvent) -> Result<()> {
        use PlaybackState::*;

        let loading = inner.machine.is_in(Loading);

        match event {
            NativeEvent::Ready { starting_playback } => {
                let to = if starting_playback {
                    Playing
                } else if loading {
                    Ready
                } else {
                    Paused
                };
                self.apply_state(inner, to)?;
            }
            NativeEvent::Idle => self.apply_state(inner, Idle)?,
            NativeEvent::Seek => {
                // Loading already seeks to the start position.
                if !loading {
                    self.apply_state(inner, Seeking)?;
                }
            }
            NativeEvent::SeekProcessed => {
                // The state itself settles with the following `ready`.
                if !loading {
                    self.emit(PlaybackEvent::Seeked {
                        position: self.engine.current_position(),
                    });
                }
            }
            NativeEvent::Stalled => {
                // Stalls during load, during a seek, or while a command issued
                // during load is pending are not buffering.
                if !loading
                    && !inner.machine.is_transitioning_from(Loading)
                    && !inner.machine.is_in(Seeking)
                {
                    self.apply_state(inner, Waiting)?;
                }
            }
            NativeEvent::VolumeChanged { level } => {
                self.emit(PlaybackEvent::VolumeChanged { volume: level });
            }
            NativeEvent::Ended => {
                if loading {
                    // Vendor-specific: the engine reports unplayable media as
                    // an immediate end of stream rather than a decode error.
                    self.fail(inner, "Media ended while loading".to_string());
                } else {
                    self.apply_state(inner, Ended)?;
                }
            }
            NativeEvent::TimelineChanged => {
                if !inner.duration_announced {
                    inner.duration_announced = true;
                    self.emit(PlaybackEvent::DurationChanged {
                        duration: self.duration(),
                    });
                }
            }
            NativeEvent::TracksChanged => {
                if !inner.metadata_announced {
                    inner.metadata_announced = true;
                    self.emit(PlaybackEvent::LoadedMetadata);
                }
            }
            NativeEvent::FirstFrame
            | NativeEvent::PositionDiscontinuity
            | NativeEvent::PlaybackRateChanged => {}
            NativeEvent::Unknown { name, args } => {
                warn!(event = %name, ?args, "Unknown native event");
            }
            NativeEvent::Error { .. } | NativeEvent::Destroyed => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(&RawNativeEvent::new("error", ["5", "boom"])),
            "Native error 5, boom"
        );
        assert_eq!(
            describe(&RawNativeEvent::new::<_, _, &str>("idle", [])),
            "Native idle"
        );
    }
}
