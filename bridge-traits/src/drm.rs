//! DRM license client contract.
//!
//! A license client provisions a DRM session out of band: a one-shot `init`,
//! a per-session `prepare`, and the license server URL the engine should use.
//! Failures that happen after `prepare` resolved (license renewal, key
//! rotation) arrive on the error channel returned by `subscribe_errors`.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::PlatformSendSync;
use core_async::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrmType {
    PlayReady,
    Widevine,
    ClearKey,
}

impl fmt::Display for DrmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DrmType::PlayReady => "playready",
            DrmType::Widevine => "widevine",
            DrmType::ClearKey => "clearkey",
        };
        f.write_str(name)
    }
}

/// DRM failures. `Clone` so a single initialization outcome can be handed to
/// every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrmError {
    #[error("DRM initialization failed: {0}")]
    Init(String),

    #[error("DRM preparation failed: {0}")]
    Prepare(String),

    #[error("DRM license error: {0}")]
    License(String),

    #[error("Engine rejected DRM configuration: {0}")]
    Engine(String),

    #[error("DRM hook already destroyed")]
    HookDestroyed,
}

pub type Result<T> = std::result::Result<T, DrmError>;

#[async_trait]
pub trait LicenseClient: PlatformSendSync {
    fn drm_type(&self) -> DrmType;

    /// One-shot initialization. Called at most once per client.
    async fn init(&self) -> Result<()>;

    async fn prepare(&self) -> Result<()>;

    fn license_server(&self) -> Option<String>;

    /// Asynchronous failures reported after provisioning.
    fn subscribe_errors(&self) -> broadcast::Receiver<DrmError>;
}
