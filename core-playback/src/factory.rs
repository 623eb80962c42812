//! Platform detection entry point.

use core_runtime::PlaybackConfigBuilder;
use tracing::info;

use crate::device::StatefulPlayback;
use crate::error::Result;

/// Creates the adapter when the host injected a native engine.
///
/// Returns `Ok(None)` when no engine is present, meaning this platform has no
/// native player. Invalid tunables are still reported as errors.
///
/// ```ignore
/// let builder = PlaybackConfig::builder().engine(engine);
/// let playback = core_playback::detect(builder)?.expect("engine injected");
/// ```
pub fn detect(builder: PlaybackConfigBuilder) -> Result<Option<StatefulPlayback>> {
    if !builder.has_engine() {
        info!("No native engine injected, platform not detected");
        return Ok(None);
    }

    let config = builder.build()?;
    StatefulPlayback::new(config).map(Some)
}
