//! Background tasks.
//!
//! The adapter runs its router, DRM continuations and position ticker as
//! detached tasks. Callers that may be outside a runtime should look up a
//! handle with [`crate::runtime::current_handle`] and use [`spawn_on`].

use std::future::Future;

use tokio::runtime::Handle;

pub use tokio::task::{yield_now, JoinError, JoinHandle};

/// Spawns onto the ambient runtime.
///
/// # Panics
///
/// Outside of a Tokio runtime.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

pub fn spawn_on<F>(handle: &Handle, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    handle.spawn(future)
}
