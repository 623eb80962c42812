//! Restartable periodic callback driver.
//!
//! A [`Ticker`] invokes its callback every `period` while running. It can be
//! fired once on demand with [`Ticker::force`], and stopping it guarantees that
//! no further invocation starts once [`Ticker::stop`] has returned.
//!
//! # Examples
//!
//! ```rust
//! use core_async::ticker::Ticker;
//! use core_async::time::Duration;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = hits.clone();
//! let ticker = Ticker::new(Duration::from_millis(200), Arc::new(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! }));
//!
//! ticker.force();
//! ticker.start();
//! ticker.stop();
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! # }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::time::{interval_at, Duration, Instant, MissedTickBehavior};

/// Callback invoked on every tick.
pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

pub struct Ticker {
    period: Duration,
    callback: TickCallback,
    handle: Option<Handle>,
    // The token of the active run. Ticks hold this lock while calling back so
    // `stop` cannot return in the middle of an invocation.
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl Ticker {
    /// Creates a stopped ticker bound to the runtime of the calling thread.
    ///
    /// A ticker created outside a runtime can still be forced, but
    /// [`Ticker::start`] is a no-op for it.
    pub fn new(period: Duration, callback: TickCallback) -> Self {
        Self {
            period,
            callback,
            handle: Handle::try_current().ok(),
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Invokes the callback immediately on the calling thread.
    pub fn force(&self) {
        (self.callback)();
    }

    /// Starts (or restarts) periodic invocation. The first tick fires one
    /// period from now.
    ///
    /// Returns `false` when no runtime was available to drive the ticks.
    pub fn start(&self) -> bool {
        let Some(handle) = self.handle.as_ref() else {
            return false;
        };

        let token = CancellationToken::new();
        {
            let mut active = self.active.lock();
            if let Some(previous) = active.replace(token.clone()) {
                previous.cancel();
            }
        }

        let period = self.period;
        let callback = self.callback.clone();
        let active = self.active.clone();
        handle.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let _guard = active.lock();
                        if token.is_cancelled() {
                            break;
                        }
                        callback();
                    }
                }
            }
        });

        true
    }

    /// Stops periodic invocation. Idempotent.
    pub fn stop(&self) {
        if let Some(token) = self.active.lock().take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.lock().is_some()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("period", &self.period)
            .field("running", &self.is_running())
            .finish()
    }
}
