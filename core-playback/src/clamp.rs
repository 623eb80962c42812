//! Numeric clamps shared by every playback controller.

/// Lowest position ever sent to the engine. Seeking to 0 makes some engines
/// restart the stream instead of seeking.
pub const MIN_POSITION_MS: u64 = 1;

pub const MAX_VOLUME: u8 = 100;

/// Clamps a seek target to `[1, duration - 1]`.
///
/// With an unknown or live duration only the lower bound applies.
pub fn clamp_position(requested: u64, duration: Option<u64>) -> u64 {
    let upper = duration.map_or(u64::MAX, |duration| duration.saturating_sub(1));
    requested.min(upper).max(MIN_POSITION_MS)
}

/// Clamps a volume request to an integer percent.
pub fn clamp_volume(requested: i64) -> u8 {
    requested.clamp(0, i64::from(MAX_VOLUME)) as u8
}
