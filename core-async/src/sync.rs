//! Synchronization primitives.
//!
//! Async-aware channels and locks come from `tokio::sync`; cooperative
//! cancellation comes from `tokio_util`.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{broadcast, CancellationToken};
//!
//! let (tx, mut rx) = broadcast::channel::<u32>(4);
//! tx.send(7).unwrap();
//! assert_eq!(rx.try_recv().unwrap(), 7);
//!
//! let token = CancellationToken::new();
//! token.cancel();
//! assert!(token.is_cancelled());
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard,
};

pub use tokio_util::sync::CancellationToken;
