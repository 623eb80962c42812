//! Recording bridge mocks shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::drm::Result as DrmResult;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BridgeError, DrmError, DrmType, LicenseClient, NativeDrmType, NativeEngine, NativeEventSink,
    NativeMediaType, Orientation, Rect, VideoType,
};
use core_async::sync::{broadcast, oneshot};
use core_playback::StatefulPlayback;
use core_runtime::{EventStream, PlaybackConfig, PlaybackEvent};
use parking_lot::Mutex;

pub const MEDIA_URL: &str = "https://cdn.example.com/vod/movie.mpd?token=abc";
pub const LICENSE_URL: &str = "https://license.example.com/rightsmanager.asmx?session=1";

// ============================================================================
// Mock NativeEngine
// ============================================================================

struct EngineValues {
    position: u64,
    duration: Option<u64>,
    live: bool,
    volume: u8,
    muted: bool,
    video_type: VideoType,
    uri: Option<String>,
}

/// Records every command as a string and lets tests push native events.
pub struct MockEngine {
    calls: Mutex<Vec<String>>,
    values: Mutex<EngineValues>,
    sink: Mutex<Option<NativeEventSink>>,
    fail_create: AtomicBool,
    fail_destroy: AtomicBool,
    fail_set_drm: AtomicBool,
    fail_set_volume: AtomicBool,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            values: Mutex::new(EngineValues {
                position: 0,
                duration: Some(60_000),
                live: false,
                volume: 50,
                muted: false,
                video_type: VideoType::SurfaceView,
                uri: None,
            }),
            sink: Mutex::new(None),
            fail_create: AtomicBool::new(false),
            fail_destroy: AtomicBool::new(false),
            fail_set_drm: AtomicBool::new(false),
            fail_set_volume: AtomicBool::new(false),
        })
    }

    pub fn failing_create() -> Arc<Self> {
        let engine = Self::new();
        engine.fail_create.store(true, Ordering::SeqCst);
        engine
    }

    pub fn fail_destroy(&self) {
        self.fail_destroy.store(true, Ordering::SeqCst);
    }

    pub fn fail_set_drm(&self) {
        self.fail_set_drm.store(true, Ordering::SeqCst);
    }

    pub fn fail_set_volume(&self) {
        self.fail_set_volume.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn set_position(&self, position: u64) {
        self.values.lock().position = position;
    }

    pub fn set_duration(&self, duration: Option<u64>) {
        self.values.lock().duration = duration;
    }

    pub fn set_live(&self, live: bool) {
        self.values.lock().live = live;
    }

    pub fn set_reported_volume(&self, volume: u8) {
        self.values.lock().volume = volume;
    }

    pub fn has_sink(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Pushes a native event the way the vendor callback would.
    pub fn emit(&self, name: &str, args: &[&str]) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink.emit(name, args.iter().copied());
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

impl NativeEngine for MockEngine {
    fn create(&self) -> BridgeResult<()> {
        self.record("create");
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BridgeError::native("create", "no video object"));
        }
        Ok(())
    }

    fn start(&self) -> BridgeResult<()> {
        self.record("start");
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        self.record("pause");
        Ok(())
    }

    fn stop(&self) -> BridgeResult<()> {
        self.record("stop");
        Ok(())
    }

    fn restart(&self) -> BridgeResult<()> {
        self.record("restart");
        Ok(())
    }

    fn destroy(&self) -> BridgeResult<()> {
        self.record("destroy");
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(BridgeError::native("destroy", "bridge gone"));
        }
        Ok(())
    }

    fn set_media_type(&self, media_type: NativeMediaType) -> BridgeResult<()> {
        self.record(format!("set_media_type({})", media_type));
        Ok(())
    }

    fn set_video_uri(&self, uri: &str) -> BridgeResult<()> {
        self.record(format!("set_video_uri({})", uri));
        self.values.lock().uri = Some(uri.to_string());
        Ok(())
    }

    fn video_uri(&self) -> Option<String> {
        self.values.lock().uri.clone()
    }

    fn seek_to(&self, position_ms: u64) -> BridgeResult<()> {
        self.record(format!("seek_to({})", position_ms));
        Ok(())
    }

    fn current_position(&self) -> u64 {
        self.values.lock().position
    }

    fn duration(&self) -> Option<u64> {
        self.values.lock().duration
    }

    fn is_live_stream(&self) -> bool {
        self.values.lock().live
    }

    fn volume(&self) -> u8 {
        self.values.lock().volume
    }

    fn set_volume(&self, volume: u8) -> BridgeResult<()> {
        self.record(format!("set_volume({})", volume));
        if self.fail_set_volume.load(Ordering::SeqCst) {
            return Err(BridgeError::native("set_volume", "audio output busy"));
        }
        self.values.lock().volume = volume;
        Ok(())
    }

    fn muted(&self) -> bool {
        self.values.lock().muted
    }

    fn set_muted(&self, muted: bool) -> BridgeResult<()> {
        self.record(format!("set_muted({})", muted));
        self.values.lock().muted = muted;
        Ok(())
    }

    fn set_area(&self, area: Rect) -> BridgeResult<()> {
        self.record(format!(
            "set_area({}, {}, {}, {})",
            area.x, area.y, area.width, area.height
        ));
        Ok(())
    }

    fn set_orientation(&self, orientation: Orientation) -> BridgeResult<()> {
        self.record(format!("set_orientation({})", orientation));
        Ok(())
    }

    fn set_video_type(&self, video_type: VideoType) -> BridgeResult<()> {
        self.record(format!("set_video_type({:?})", video_type));
        self.values.lock().video_type = video_type;
        Ok(())
    }

    fn video_type(&self) -> VideoType {
        self.values.lock().video_type
    }

    fn set_drm(&self, drm: NativeDrmType, license_server: Option<&str>) -> BridgeResult<()> {
        self.record(format!(
            "set_drm({:?}, {})",
            drm,
            license_server.unwrap_or("-")
        ));
        if drm == NativeDrmType::PlayReady && self.fail_set_drm.load(Ordering::SeqCst) {
            return Err(BridgeError::native("set_drm", "unsupported key system"));
        }
        Ok(())
    }

    fn set_event_sink(&self, sink: Option<NativeEventSink>) {
        *self.sink.lock() = sink;
    }
}

// ============================================================================
// Mock LicenseClient
// ============================================================================

/// License client whose `init`/`prepare` outcomes are scripted. A gated call
/// stays pending until the test resolves the returned sender.
pub struct MockLicenseClient {
    drm_type: DrmType,
    license_server: Option<String>,
    init_result: Mutex<DrmResult<()>>,
    prepare_result: Mutex<DrmResult<()>>,
    init_gate: Mutex<Option<oneshot::Receiver<DrmResult<()>>>>,
    prepare_gate: Mutex<Option<oneshot::Receiver<DrmResult<()>>>>,
    errors: broadcast::Sender<DrmError>,
    init_calls: AtomicUsize,
    prepare_calls: AtomicUsize,
}

impl MockLicenseClient {
    pub fn new(drm_type: DrmType) -> Self {
        let (errors, _) = broadcast::channel(8);
        Self {
            drm_type,
            license_server: Some(LICENSE_URL.to_string()),
            init_result: Mutex::new(Ok(())),
            prepare_result: Mutex::new(Ok(())),
            init_gate: Mutex::new(None),
            prepare_gate: Mutex::new(None),
            errors,
            init_calls: AtomicUsize::new(0),
            prepare_calls: AtomicUsize::new(0),
        }
    }

    pub fn playready() -> Arc<Self> {
        Arc::new(Self::new(DrmType::PlayReady))
    }

    pub fn with_prepare_error(self, message: &str) -> Self {
        *self.prepare_result.lock() = Err(DrmError::Prepare(message.to_string()));
        self
    }

    pub fn with_init_error(self, message: &str) -> Self {
        *self.init_result.lock() = Err(DrmError::Init(message.to_string()));
        self
    }

    pub fn gate_init(&self) -> oneshot::Sender<DrmResult<()>> {
        let (tx, rx) = oneshot::channel();
        *self.init_gate.lock() = Some(rx);
        tx
    }

    pub fn gate_prepare(&self) -> oneshot::Sender<DrmResult<()>> {
        let (tx, rx) = oneshot::channel();
        *self.prepare_gate.lock() = Some(rx);
        tx
    }

    pub fn raise(&self, error: DrmError) {
        let _ = self.errors.send(error);
    }

    pub fn error_subscribers(&self) -> usize {
        self.errors.receiver_count()
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn prepare_calls(&self) -> usize {
        self.prepare_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LicenseClient for MockLicenseClient {
    fn drm_type(&self) -> DrmType {
        self.drm_type
    }

    async fn init(&self) -> DrmResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.init_gate.lock().take();
        match gate {
            Some(gate) => gate
                .await
                .unwrap_or_else(|_| Err(DrmError::Init("gate dropped".into()))),
            None => self.init_result.lock().clone(),
        }
    }

    async fn prepare(&self) -> DrmResult<()> {
        self.prepare_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.prepare_gate.lock().take();
        match gate {
            Some(gate) => gate
                .await
                .unwrap_or_else(|_| Err(DrmError::Prepare("gate dropped".into()))),
            None => self.prepare_result.lock().clone(),
        }
    }

    fn license_server(&self) -> Option<String> {
        self.license_server.clone()
    }

    fn subscribe_errors(&self) -> broadcast::Receiver<DrmError> {
        self.errors.subscribe()
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn playback(engine: &Arc<MockEngine>) -> StatefulPlayback {
    let config = PlaybackConfig::builder()
        .engine(engine.clone())
        .build()
        .expect("valid config");
    StatefulPlayback::new(config).expect("inside runtime")
}

/// Lets the router and any spawned continuation run to quiescence.
pub async fn settle() {
    for _ in 0..32 {
        core_async::task::yield_now().await;
    }
}

/// Queued events without `Debug` traces and time updates.
pub fn significant(stream: &mut EventStream) -> Vec<PlaybackEvent> {
    stream
        .drain()
        .into_iter()
        .filter(|event| {
            !matches!(
                event,
                PlaybackEvent::Debug { .. } | PlaybackEvent::TimeUpdate { .. }
            )
        })
        .collect()
}

pub fn debug_messages(events: &[PlaybackEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::Debug { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

pub fn error_messages(events: &[PlaybackEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::Error { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}
