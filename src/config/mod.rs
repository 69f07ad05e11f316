//! Music configuration
//!
//! The track table is a JSON document preloaded by the game (`music_config`):
//!
//! ```json
//! {
//!   "defaultVolume": 0.3,
//!   "crossfadeMs": 800,
//!   "tracks": {
//!     "castle_theme": { "file": "castle.mp3", "volume": 0.5 },
//!     "lava_theme": { "file": "lava.mp3", "loop": false }
//!   }
//! }
//! ```
//!
//! Tracks without `volume` use `defaultVolume`; tracks without `loop` loop.

use crate::volume::clamp01;
use crate::{MusicError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Identifier of a track (and of its audio resource).
pub type TrackKey = String;

/// Base volume used when neither the track nor the config provides one.
pub const DEFAULT_TRACK_VOLUME: f32 = 0.3;

fn default_track_volume() -> f32 {
    DEFAULT_TRACK_VOLUME
}

/// One entry of the track table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDefinition {
    /// Audio file, relative to the game's audio asset directory
    pub file: String,
    /// Base volume in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    /// Whether the track loops (defaults to `true`)
    #[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
    pub looped: Option<bool>,
}

impl TrackDefinition {
    /// Create a looping track using the config's default volume.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            volume: None,
            looped: None,
        }
    }

    /// Set the base volume of the track.
    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Set whether the track loops.
    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = Some(looped);
        self
    }
}

/// Track table plus global defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicConfig {
    /// Fallback base volume for tracks that omit `volume`
    #[serde(default = "default_track_volume")]
    pub default_volume: f32,
    /// Default crossfade duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crossfade_ms: Option<u64>,
    /// Track definitions by key
    #[serde(default)]
    pub tracks: BTreeMap<TrackKey, TrackDefinition>,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            default_volume: DEFAULT_TRACK_VOLUME,
            crossfade_ms: None,
            tracks: BTreeMap::new(),
        }
    }
}

impl MusicConfig {
    /// Create an empty configuration with the default volume.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from its JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: MusicConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            MusicError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Serialize the configuration back to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if let Some((key, _)) = self.tracks.iter().find(|(_, def)| def.file.trim().is_empty()) {
            return Err(MusicError::Config(format!(
                "Track '{}' has no audio file",
                key
            )));
        }
        Ok(())
    }

    /// Set the fallback base volume.
    pub fn default_volume(mut self, volume: f32) -> Self {
        self.default_volume = volume;
        self
    }

    /// Set the default crossfade duration.
    pub fn crossfade_ms(mut self, ms: u64) -> Self {
        self.crossfade_ms = Some(ms);
        self
    }

    /// Add or replace a track definition.
    pub fn track(mut self, key: impl Into<TrackKey>, def: TrackDefinition) -> Self {
        self.tracks.insert(key.into(), def);
        self
    }

    /// Whether the table has no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Look up a track definition.
    pub fn get(&self, key: &str) -> Option<&TrackDefinition> {
        self.tracks.get(key)
    }

    /// Base volume of a track: its own `volume`, else `default_volume`, clamped.
    pub fn base_volume(&self, key: &str) -> f32 {
        let volume = self
            .tracks
            .get(key)
            .and_then(|def| def.volume)
            .unwrap_or(self.default_volume);
        clamp01(volume)
    }

    /// Whether a track loops; unspecified or unknown tracks loop.
    pub fn looped(&self, key: &str) -> bool {
        self.tracks
            .get(key)
            .and_then(|def| def.looped)
            .unwrap_or(true)
    }
}
