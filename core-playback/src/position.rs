//! Periodic position reporting while playing.

use std::fmt;
use std::sync::Arc;

use bridge_traits::NativeEngine;
use core_async::time::Duration;
use core_async::Ticker;
use core_runtime::{EventBus, PlaybackEvent};

/// Publishes `TimeUpdate` at a fixed interval.
///
/// The adapter starts it on entering `Playing` and stops it on leaving, so
/// the notification stream lives exactly as long as playback does.
pub struct PositionReporter {
    ticker: Ticker,
}

impl PositionReporter {
    pub fn new(engine: Arc<dyn NativeEngine>, bus: EventBus, interval: Duration) -> Self {
        let ticker = Ticker::new(
            interval,
            Arc::new(move || {
                let position = engine.current_position();
                let _ = bus.emit(PlaybackEvent::TimeUpdate { position });
            }),
        );
        Self { ticker }
    }

    /// Reports immediately, then every interval.
    pub fn start(&self) {
        self.ticker.force();
        if !self.ticker.start() {
            tracing::warn!("No async runtime available, periodic time updates disabled");
        }
    }

    pub fn stop(&self) {
        self.ticker.stop();
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn interval(&self) -> Duration {
        self.ticker.period()
    }
}

impl fmt::Debug for PositionReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionReporter")
            .field("interval", &self.interval())
            .field("running", &self.is_running())
            .finish()
    }
}
