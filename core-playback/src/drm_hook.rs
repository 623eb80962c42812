//! PlayReady provisioning hook.
//!
//! Wraps a [`LicenseClient`] and applies its license server to the engine.
//! Initialization runs once per hook and its outcome is shared by every
//! `prepare()` call. Destruction can race a suspended `prepare()`, so every
//! resumption re-checks liveness before touching the engine.

use std::fmt;
use std::sync::Arc;

use bridge_traits::drm::Result as DrmResult;
use bridge_traits::{DrmError, DrmType, LicenseClient, NativeDrmType, NativeEngine};
use core_async::runtime::Handle;
use core_async::sync::broadcast::{self, error::RecvError};
use core_async::sync::CancellationToken;
use core_runtime::logging::redact_url;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::UnsupportedFeature;

/// Receives every DRM failure together with the id of the hook that raised it.
pub type DrmErrorListener = Arc<dyn Fn(Uuid, DrmError) + Send + Sync>;

type SharedInit = Shared<BoxFuture<'static, DrmResult<()>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Created,
    Initializing,
    Ready,
    Destroyed,
}

struct HookInner {
    state: HookState,
    client: Option<Arc<dyn LicenseClient>>,
    init: Option<SharedInit>,
    forwarding: Option<CancellationToken>,
}

pub struct DrmHook {
    id: Uuid,
    drm_type: DrmType,
    engine: Arc<dyn NativeEngine>,
    listener: DrmErrorListener,
    inner: Mutex<HookInner>,
}

impl DrmHook {
    /// Creates the hook and starts client initialization in the background.
    ///
    /// Initialization and error forwarding run on `handle`, so the hook can
    /// be created and prepared from threads outside the runtime.
    ///
    /// # Errors
    ///
    /// [`UnsupportedFeature`] for any client that is not PlayReady.
    pub fn new(
        handle: &Handle,
        engine: Arc<dyn NativeEngine>,
        client: Arc<dyn LicenseClient>,
        listener: DrmErrorListener,
    ) -> Result<Self, UnsupportedFeature> {
        let drm_type = client.drm_type();
        if drm_type != DrmType::PlayReady {
            return Err(UnsupportedFeature::new(format!("{} DRM", drm_type)));
        }

        let id = Uuid::new_v4();
        let init: SharedInit = {
            let client = client.clone();
            async move { client.init().await }.boxed().shared()
        };

        let forwarding = forward_errors(handle, id, client.subscribe_errors(), listener.clone());
        handle.spawn({
            let init = init.clone();
            async move {
                if let Err(error) = init.await {
                    debug!(%error, "DRM client initialization failed");
                }
            }
        });

        debug!(hook = %id, %drm_type, "DRM hook created");
        Ok(Self {
            id,
            drm_type,
            engine,
            listener,
            inner: Mutex::new(HookInner {
                state: HookState::Created,
                client: Some(client),
                init: Some(init),
                forwarding: Some(forwarding),
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn drm_type(&self) -> DrmType {
        self.drm_type
    }

    pub fn state(&self) -> HookState {
        self.inner.lock().state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state() == HookState::Destroyed
    }

    /// Waits for initialization, prepares the client session and points the
    /// engine at the license server.
    ///
    /// A failure while configuring the engine is reported to the listener,
    /// not returned.
    ///
    /// # Errors
    ///
    /// - [`DrmError::HookDestroyed`] if the hook is (or becomes) destroyed
    /// - the client's own `init`/`prepare` failure
    pub async fn prepare(&self) -> DrmResult<()> {
        let (client, init) = {
            let mut inner = self.inner.lock();
            let (Some(client), Some(init)) = (inner.client.clone(), inner.init.clone()) else {
                return Err(DrmError::HookDestroyed);
            };
            if inner.state == HookState::Created {
                inner.state = HookState::Initializing;
            }
            (client, init)
        };

        init.await?;
        self.assert_alive()?;
        client.prepare().await?;
        self.assert_alive()?;

        let license_server = client.license_server();
        info!(
            hook = %self.id,
            license_server = license_server.as_deref().map(redact_url).unwrap_or("<none>"),
            "Applying PlayReady configuration"
        );

        if let Err(error) = self
            .engine
            .set_drm(NativeDrmType::PlayReady, license_server.as_deref())
        {
            warn!(hook = %self.id, %error, "Engine rejected DRM configuration");
            (self.listener)(self.id, DrmError::Engine(error.to_string()));
            return Ok(());
        }

        let mut inner = self.inner.lock();
        if inner.state != HookState::Destroyed {
            inner.state = HookState::Ready;
        }
        Ok(())
    }

    /// Clears DRM on the engine and detaches from the client. Safe to call
    /// at any point, including while `prepare()` is suspended.
    pub fn destroy(&self) {
        let forwarding = {
            let mut inner = self.inner.lock();
            if inner.state == HookState::Destroyed {
                return;
            }
            inner.state = HookState::Destroyed;
            inner.client = None;
            inner.init = None;
            inner.forwarding.take()
        };

        if let Some(token) = forwarding {
            token.cancel();
        }

        if let Err(error) = self.engine.set_drm(NativeDrmType::None, None) {
            warn!(hook = %self.id, %error, "Failed to clear DRM configuration");
        }
        debug!(hook = %self.id, "DRM hook destroyed");
    }

    fn assert_alive(&self) -> DrmResult<()> {
        if self.is_destroyed() {
            return Err(DrmError::HookDestroyed);
        }
        Ok(())
    }
}

impl Drop for DrmHook {
    fn drop(&mut self) {
        if let Some(token) = self.inner.get_mut().forwarding.take() {
            token.cancel();
        }
    }
}

impl fmt::Debug for DrmHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrmHook")
            .field("id", &self.id)
            .field("drm_type", &self.drm_type)
            .field("state", &self.state())
            .finish()
    }
}

fn forward_errors(
    handle: &Handle,
    id: Uuid,
    mut errors: broadcast::Receiver<DrmError>,
    listener: DrmErrorListener,
) -> CancellationToken {
    let token = CancellationToken::new();
    let cancelled = token.clone();
    handle.spawn(async move {
        loop {
            core_async::select! {
                biased;
                _ = cancelled.cancelled() => break,
                received = errors.recv() => match received {
                    Ok(error) => listener(id, error),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(hook = %id, skipped, "DRM error notifications dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    });

    token
}
