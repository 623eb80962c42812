//! Async abstraction layer for the playback adapter.
//!
//! Library code in the workspace reaches the executor only through this
//! crate. Tests use Tokio's macros directly.
//!
//! - [`runtime`]: handle lookup and a blocking entry point
//! - [`task`]: detached tasks
//! - [`time`]: Tokio clock re-exports
//! - [`sync`]: channels and cancellation
//! - [`ticker`]: the restartable periodic driver behind position reports
//!
//! ```rust
//! use std::sync::Arc;
//! use core_async::{time::Duration, Ticker};
//!
//! # async fn example() {
//! let ticker = Ticker::new(Duration::from_millis(200), Arc::new(|| println!("tick")));
//! ticker.force();
//! ticker.start();
//! # }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod ticker;
pub mod time;

pub use task::spawn;
pub use tokio::select;
pub use ticker::{TickCallback, Ticker};
pub use time::{sleep, Duration, Instant};
