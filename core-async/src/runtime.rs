//! Runtime utilities wrapping Tokio's executor primitives.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a throwaway current-thread runtime.
///
/// Must not be called from inside an async context.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}

/// Returns the handle of the runtime driving the current thread, if any.
pub fn current_handle() -> Option<Handle> {
    Handle::try_current().ok()
}
