//! Volume arithmetic
//!
//! Every volume applied to a playing track goes through [`effective_volume`],
//! so the composition order (base, then master, then intensity) is fixed in
//! one place.

use crate::config::TrackKey;

/// Clamp a value into `[0.0, 1.0]`.
///
/// Non-finite inputs (NaN, ±∞) map to `0.0`.
pub fn clamp01(x: f32) -> f32 {
    if !x.is_finite() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

/// Compose the volume actually applied to a track.
///
/// Returns `0.0` when muted, otherwise `clamp01(base * master * intensity)`.
pub fn effective_volume(base: f32, master: f32, intensity: f32, muted: bool) -> f32 {
    if muted {
        return 0.0;
    }
    clamp01(base * master * intensity)
}

/// Target of a volume change: the master volume or a single track's base volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeTarget {
    /// Master volume shared by every track
    All,
    /// Base volume of one track
    Track(TrackKey),
}

impl From<&str> for VolumeTarget {
    fn from(value: &str) -> Self {
        if value == "all" {
            VolumeTarget::All
        } else {
            VolumeTarget::Track(value.to_string())
        }
    }
}

impl From<String> for VolumeTarget {
    fn from(value: String) -> Self {
        if value == "all" {
            VolumeTarget::All
        } else {
            VolumeTarget::Track(value)
        }
    }
}
