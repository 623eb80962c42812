//! # Stateful Playback
//!
//! [`StatefulPlayback`] turns the fire-and-forget [`NativeEngine`] into a
//! finite-state device.
//!
//! ## Overview
//!
//! Commands begin a transition on the [`StateMachine`] and then call the
//! engine. The engine answers later through its event sink; the router task
//! (see `router.rs`) interprets those answers and completes the transition.
//! Everything observable is published on an [`EventBus`].
//!
//! ```text
//! app ──command──> StatefulPlayback ──call──> NativeEngine
//!                        ▲                          │
//!                        └──── router task <──sink──┘
//! ```
//!
//! ## Locking
//!
//! All mutable adapter state sits behind one mutex. Engine calls are
//! synchronous and are issued with the lock held, so "begin transition" and
//! "issue native call" can never interleave with event handling. The lock is
//! never held across an `.await`: DRM preparation runs in a spawned task that
//! re-acquires it and checks its transition ticket before acting.
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{PlaybackController, PrepareOptions, StatefulPlayback};
//! use core_runtime::PlaybackConfig;
//!
//! let config = PlaybackConfig::builder().engine(engine).build()?;
//! let playback = StatefulPlayback::new(config)?;
//! let mut events = playback.subscribe();
//!
//! playback.prepare("https://cdn.example.com/movie.mpd", PrepareOptions::default())?;
//! playback.play()?;
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{DrmError, DrmType, LicenseClient, NativeEngine, NativeEventSink, Rect, VideoType};
use core_async::runtime::{current_handle, Handle};
use core_runtime::logging::redact_url;
use core_runtime::{
    EventBus, EventStream, PlaybackConfig, PlaybackEvent, PlaybackState, VideoOptimisation,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::clamp::{clamp_position, clamp_volume};
use crate::controller::{PlaybackController, PrepareOptions};
use crate::drm_hook::{DrmErrorListener, DrmHook};
use crate::error::{PlaybackError, Result};
use crate::position::PositionReporter;
use crate::router::EventRouter;
use crate::state::{StateChange, StateMachine, TransitionTicket};
use crate::viewport::Viewport;

pub(crate) struct Inner {
    pub(crate) machine: StateMachine,
    pub(crate) muted: bool,
    pub(crate) volume_under_mute: Option<u8>,
    pub(crate) drm_hook: Option<Arc<DrmHook>>,
    pub(crate) duration_announced: bool,
    pub(crate) metadata_announced: bool,
}

/// State shared between the adapter handle, the router task and DRM
/// continuations.
pub(crate) struct Shared {
    pub(crate) engine: Arc<dyn NativeEngine>,
    /// Runtime captured at construction. Commands may arrive from host
    /// threads that are not inside it.
    handle: Handle,
    pub(crate) bus: EventBus,
    pub(crate) inner: Mutex<Inner>,
    reporter: PositionReporter,
}

impl Shared {
    pub(crate) fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine.
        let _ = self.bus.emit(event);
    }

    pub(crate) fn debug_message(&self, message: impl Into<String>) {
        self.emit(PlaybackEvent::Debug {
            message: message.into(),
        });
    }

    pub(crate) fn duration(&self) -> Option<u64> {
        if self.engine.is_live_stream() {
            None
        } else {
            self.engine.duration()
        }
    }

    /// Moves the machine and publishes the change.
    pub(crate) fn apply_state(&self, inner: &mut Inner, to: PlaybackState) -> Result<()> {
        if let Some(change) = inner.machine.set_state(to)? {
            self.on_state_changed(inner, change);
        }
        Ok(())
    }

    fn on_state_changed(&self, inner: &mut Inner, change: StateChange) {
        // The engine may tear itself down without a `destroy()` command.
        if change.to == PlaybackState::Destroyed {
            if let Some(hook) = inner.drm_hook.take() {
                hook.destroy();
            }
        }

        if change.to == PlaybackState::Playing {
            self.reporter.start();
        } else if change.from == PlaybackState::Playing {
            self.reporter.stop();
        }

        self.emit(PlaybackEvent::StateChanged {
            from: change.from,
            to: change.to,
        });
        if change.to == PlaybackState::Ended {
            self.emit(PlaybackEvent::Ended);
        }
    }

    /// Error path shared by native errors, DRM failures and handler faults.
    pub(crate) fn fail(&self, inner: &mut Inner, message: String) {
        if inner.machine.is_destroying() {
            self.debug_message(format!("Error happened in destroyed state: {}", message));
            return;
        }

        inner.machine.abort_transition();
        if !inner.machine.is_in(PlaybackState::Error) {
            if let Err(error) = self.apply_state(inner, PlaybackState::Error) {
                warn!(%error, "Could not enter error state");
            }
        }

        error!(%message, "Playback error");
        self.emit(PlaybackEvent::Error { message });
    }

    /// Maps an engine call failure, dropping the intent the call belonged to.
    fn call(&self, inner: &mut Inner, result: BridgeResult<()>) -> Result<()> {
        result.map_err(|error| {
            inner.machine.abort_transition();
            warn!(%error, "Native call failed");
            PlaybackError::from(error)
        })
    }

    fn load(&self, inner: &mut Inner, url: &str, start_position: Option<u64>) -> Result<()> {
        self.call(inner, self.engine.set_video_uri(url))?;
        if let Some(position) = start_position {
            self.call(inner, self.engine.seek_to(position))?;
        }
        self.apply_state(inner, PlaybackState::Loading)
    }

    /// Resumes a `prepare` that waited for DRM.
    fn finish_prepare(
        &self,
        ticket: TransitionTicket,
        outcome: std::result::Result<(), DrmError>,
        url: &str,
        start_position: Option<u64>,
    ) {
        let mut inner = self.inner.lock();

        if inner.machine.is_destroying() {
            if let Err(error) = outcome {
                self.debug_message(error.to_string());
            }
            return;
        }

        if !inner.machine.is_pending(ticket) {
            debug!("Prepare was superseded while DRM was being prepared");
            if let Err(error) = outcome {
                self.debug_message(error.to_string());
            }
            return;
        }

        match outcome {
            Ok(()) => {
                if let Err(error) = self.load(&mut inner, url, start_position) {
                    self.fail(&mut inner, error.to_string());
                }
            }
            Err(error) => self.fail(&mut inner, error.to_string()),
        }
    }

    fn on_drm_error(&self, hook_id: Uuid, error: DrmError) {
        let mut inner = self.inner.lock();
        let current = inner
            .drm_hook
            .as_ref()
            .is_some_and(|hook| hook.id() == hook_id);

        if !current {
            self.debug_message(format!("Error from detached DRM hook: {}", error));
            return;
        }

        self.fail(&mut inner, error.to_string());
    }

    fn ensure_usable(inner: &Inner) -> Result<()> {
        let state = inner.machine.state();
        if state == PlaybackState::Invalid {
            return Err(PlaybackError::InvalidState(state));
        }
        if inner.machine.is_destroying() {
            return Err(PlaybackError::InvalidState(PlaybackState::Destroyed));
        }
        Ok(())
    }
}

/// Playback adapter over a [`NativeEngine`].
pub struct StatefulPlayback {
    shared: Arc<Shared>,
    viewport: Option<Arc<Viewport>>,
    created: bool,
    _router: Option<EventRouter>,
}

impl StatefulPlayback {
    /// Creates the native player and wires its event slot.
    ///
    /// If the engine fails to create its player the adapter is still
    /// returned, in the `Invalid` state: no further engine call is made and
    /// only [`PlaybackController::destroy`] is meaningful.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::Internal`] when called outside a Tokio runtime.
    pub fn new(config: PlaybackConfig) -> Result<Self> {
        let handle = current_handle().ok_or_else(|| {
            PlaybackError::Internal("StatefulPlayback requires a Tokio runtime".to_string())
        })?;

        let PlaybackConfig {
            engine,
            time_update_interval,
            event_buffer_size,
            video_optimisation,
        } = config;

        let bus = EventBus::new(event_buffer_size);
        let reporter = PositionReporter::new(engine.clone(), bus.clone(), time_update_interval);
        let mut machine = StateMachine::new();

        let created = match engine.create() {
            Ok(()) => true,
            Err(error) => {
                error!(%error, "Failed to create native player");
                machine.invalidate();
                false
            }
        };

        let shared = Arc::new(Shared {
            engine: engine.clone(),
            handle: handle.clone(),
            bus,
            inner: Mutex::new(Inner {
                machine,
                muted: false,
                volume_under_mute: None,
                drm_hook: None,
                duration_announced: false,
                metadata_announced: false,
            }),
            reporter,
        });

        if !created {
            return Ok(Self {
                shared,
                viewport: None,
                created,
                _router: None,
            });
        }

        let (sink, events) = NativeEventSink::channel();
        engine.set_event_sink(Some(sink));
        let router = EventRouter::spawn(&handle, Arc::downgrade(&shared), events);

        let playback = Self {
            shared,
            viewport: Some(Arc::new(Viewport::new(engine, Rect::default()))),
            created,
            _router: Some(router),
        };

        if let Some(optimisation) = video_optimisation {
            if let Err(error) = playback.set_video_optimisation(optimisation) {
                warn!(%error, ?optimisation, "Failed to apply video optimisation");
            }
        }

        info!("Playback adapter created");
        Ok(playback)
    }

    /// Only PlayReady is available on this engine.
    pub fn is_drm_supported(drm_type: DrmType) -> bool {
        drm_type == DrmType::PlayReady
    }

    /// `None` when the native player could not be created.
    pub fn viewport(&self) -> Option<Arc<Viewport>> {
        self.viewport.clone()
    }

    pub fn drm_hook(&self) -> Option<Arc<DrmHook>> {
        self.shared.inner.lock().drm_hook.clone()
    }

    pub fn set_video_optimisation(&self, optimisation: VideoOptimisation) -> Result<()> {
        Shared::ensure_usable(&self.shared.inner.lock())?;

        let video_type = match optimisation {
            VideoOptimisation::RotationSupport => VideoType::TextureView,
            VideoOptimisation::SmoothPlayback => VideoType::SurfaceView,
        };
        debug!(?video_type, "Selecting renderer");
        self.shared.engine.set_video_type(video_type)?;
        Ok(())
    }

    fn weak(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }
}

impl PlaybackController for StatefulPlayback {
    #[instrument(skip(self, options), fields(url = %redact_url(url)))]
    fn prepare(&self, url: &str, options: PrepareOptions) -> Result<()> {
        let shared = &self.shared;
        let mut inner = shared.inner.lock();
        Shared::ensure_usable(&inner)?;

        let ticket = inner.machine.begin_transition(PlaybackState::Loading)?;
        inner.duration_announced = false;
        inner.metadata_announced = false;

        shared.call(
            &mut inner,
            shared.engine.set_media_type(options.native_media_type()),
        )?;

        let Some(hook) = inner.drm_hook.clone() else {
            return shared.load(&mut inner, url, options.start_position);
        };
        drop(inner);

        debug!(hook = %hook.id(), "Waiting for DRM before loading");
        let weak = self.weak();
        let url = url.to_string();
        let start_position = options.start_position;
        shared.handle.spawn(async move {
            let outcome = hook.prepare().await;
            if let Some(shared) = weak.upgrade() {
                shared.finish_prepare(ticket, outcome, &url, start_position);
            }
        });

        Ok(())
    }

    #[instrument(skip(self))]
    fn play(&self) -> Result<()> {
        let shared = &self.shared;
        let mut inner = shared.inner.lock();
        Shared::ensure_usable(&inner)?;

        inner.machine.begin_transition(PlaybackState::Playing)?;
        shared.emit(PlaybackEvent::WillPlay);
        shared.call(&mut inner, shared.engine.start())
    }

    #[instrument(skip(self))]
    fn pause(&self) -> Result<()> {
        let shared = &self.shared;
        let mut inner = shared.inner.lock();
        Shared::ensure_usable(&inner)?;

        inner.machine.begin_transition(PlaybackState::Paused)?;
        shared.emit(PlaybackEvent::WillPause);
        shared.call(&mut inner, shared.engine.pause())
    }

    #[instrument(skip(self))]
    fn stop(&self) -> Result<()> {
        let shared = &self.shared;
        let mut inner = shared.inner.lock();
        Shared::ensure_usable(&inner)?;

        inner.machine.begin_transition(PlaybackState::Idle)?;
        shared.emit(PlaybackEvent::WillStop);
        shared.call(&mut inner, shared.engine.stop())
    }

    #[instrument(skip(self))]
    fn set_position(&self, position: u64) -> Result<()> {
        let shared = &self.shared;
        let mut inner = shared.inner.lock();
        Shared::ensure_usable(&inner)?;

        inner.machine.begin_transition(PlaybackState::Seeking)?;
        let target = clamp_position(position, shared.duration());
        shared.emit(PlaybackEvent::WillSeek { position });
        shared.call(&mut inner, shared.engine.seek_to(target))
    }

    #[instrument(skip(self))]
    fn destroy(&self) -> Result<()> {
        let shared = &self.shared;
        let mut inner = shared.inner.lock();
        if inner.machine.is_destroying() {
            return Ok(());
        }

        inner.machine.begin_transition(PlaybackState::Destroyed)?;
        shared.reporter.stop();
        inner.volume_under_mute = None;

        if inner.machine.is_transitioning_from(PlaybackState::Invalid) {
            return shared.apply_state(&mut inner, PlaybackState::Destroyed);
        }

        if let Some(hook) = inner.drm_hook.take() {
            hook.destroy();
        }

        if let Err(error) = shared.engine.destroy() {
            warn!(%error, "Native destroy failed, completing destruction locally");
            shared.apply_state(&mut inner, PlaybackState::Destroyed)?;
        }
        Ok(())
    }

    fn state(&self) -> PlaybackState {
        self.shared.inner.lock().machine.state()
    }

    fn subscribe(&self) -> EventStream {
        EventStream::new(self.shared.bus.subscribe())
    }

    fn position(&self) -> u64 {
        if !self.created {
            return 0;
        }
        self.shared.engine.current_position()
    }

    fn duration(&self) -> Option<u64> {
        if !self.created {
            return None;
        }
        self.shared.duration()
    }

    fn url(&self) -> Option<String> {
        if !self.created {
            return None;
        }
        self.shared.engine.video_uri()
    }

    fn volume(&self) -> u8 {
        let inner = self.shared.inner.lock();
        if inner.muted {
            if let Some(volume) = inner.volume_under_mute {
                return volume;
            }
        }
        if !self.created {
            return 0;
        }
        self.shared.engine.volume()
    }

    #[instrument(skip(self))]
    fn set_volume(&self, volume: i64) -> Result<()> {
        let shared = &self.shared;
        let mut inner = shared.inner.lock();
        Shared::ensure_usable(&inner)?;

        let volume = clamp_volume(volume);
        if volume == shared.engine.volume() {
            return Ok(());
        }

        if inner.muted {
            inner.volume_under_mute = Some(volume);
            return Ok(());
        }

        shared.emit(PlaybackEvent::WillChangeVolume { volume });
        shared.engine.set_volume(volume)?;
        Ok(())
    }

    fn muted(&self) -> bool {
        self.shared.inner.lock().muted
    }

    #[instrument(skip(self))]
    fn set_muted(&self, muted: bool) -> Result<()> {
        let shared = &self.shared;
        let mut inner = shared.inner.lock();
        Shared::ensure_usable(&inner)?;

        if muted == inner.muted {
            return Ok(());
        }

        if muted {
            let restore = shared.engine.volume();
            shared.engine.set_volume(0)?;
            inner.volume_under_mute = Some(restore);
            inner.muted = true;
        } else {
            if let Some(volume) = inner.volume_under_mute {
                shared.engine.set_volume(volume)?;
            }
            inner.volume_under_mute = None;
            inner.muted = false;
        }
        Ok(())
    }

    #[instrument(skip(self, client), fields(drm_type = %client.drm_type()))]
    fn attach_drm(&self, client: Arc<dyn LicenseClient>) -> Result<()> {
        Shared::ensure_usable(&self.shared.inner.lock())?;

        let weak = self.weak();
        let listener: DrmErrorListener = Arc::new(move |hook_id, error| {
            if let Some(shared) = weak.upgrade() {
                shared.on_drm_error(hook_id, error);
            }
        });
        let hook = Arc::new(DrmHook::new(
            &self.shared.handle,
            self.shared.engine.clone(),
            client,
            listener,
        )?);

        let previous = self.shared.inner.lock().drm_hook.replace(hook);
        if let Some(previous) = previous {
            debug!(hook = %previous.id(), "Replacing attached DRM hook");
            previous.destroy();
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn detach_drm(&self, drm_type: DrmType) {
        let hook = {
            let mut inner = self.shared.inner.lock();
            if inner
                .drm_hook
                .as_ref()
                .is_some_and(|hook| hook.drm_type() == drm_type)
            {
                inner.drm_hook.take()
            } else {
                None
            }
        };

        if let Some(hook) = hook {
            hook.destroy();
        }
    }
}

impl fmt::Debug for StatefulPlayback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("StatefulPlayback")
            .field("state", &inner.machine.state())
            .field("pending", &inner.machine.pending())
            .field("muted", &inner.muted)
            .field("drm_hook", &inner.drm_hook)
            .finish()
    }
}
