//! Clock primitives for timers and timeouts.
//!
//! Everything here follows Tokio's clock, so tests that start the runtime
//! paused (`#[tokio::test(start_paused = true)]`) control these timers too.

pub use std::time::Duration;

pub use tokio::time::{
    interval, interval_at, sleep, timeout, Instant, Interval, MissedTickBehavior, Sleep,
};
