//! Threading bounds shared by every bridge trait.
//!
//! Engine handles are shared between the application thread, the event router
//! task and the position ticker, so implementations must be `Send + Sync`.

/// Marker trait for bridge implementations that can be shared across tasks.
pub trait PlatformSendSync: Send + Sync {}

impl<T> PlatformSendSync for T where T: Send + Sync {}
