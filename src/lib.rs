//! Goblins & Heroes music and sound effects
//!
//! Background music controller for the Goblins & Heroes platformer. The
//! controller owns a table of named tracks loaded from a JSON configuration,
//! keeps at most one track current, and switches between tracks with instant
//! starts, fade-ins or crossfades. Mute, master volume and an intensity
//! multiplier compose into the effective volume of the playing track and are
//! persisted through a [`SettingsStore`].
//!
//! The crate never talks to an audio device directly. Everything the
//! controller needs from the game engine is expressed by the traits in
//! [`host`]: a playback primitive ([`SoundHandle`]), a resource and
//! configuration provider ([`AudioHost`]) and durable key-value storage.
//! Window visibility and the first user gesture are forwarded to the
//! handle's [`HostSignals`], which outlives any single host binding.
//! Volume ramps are advanced explicitly from the host's per-frame update.
//!
//! # Features
//! - Lazily created, cached playback handles (one per track key)
//! - Fade-in, fade-out and crossfade driven by frame updates
//! - Master/per-track volume, mute and intensity with persistence
//! - Automatic pause/resume on visibility changes and audio unlock on first input
//! - Level/door progress and context-driven track selection
//! - Offline synthesis of the game's sound effect cues with WAV export
//!
//! # Crate feature flags
//! - `sfx` (default): Sound effect synthesis and WAV export (`sfx`)
//! - `streaming` (opt-in): rodio-backed [`AudioHost`] implementation and SFX
//!   player (`backend`); implies `sfx`
//!
//! # Quick start
//! ```no_run
//! use goblins_music::{DoorPath, MemoryStore, MusicContext, MusicHandle};
//! use std::time::Duration;
//! # fn host() -> Box<dyn goblins_music::AudioHost> { unimplemented!() }
//!
//! let music = MusicHandle::new(Box::new(MemoryStore::new()));
//! music.bind(host());
//! music
//!     .lock()
//!     .play_for_context(MusicContext::new(2, Some(DoorPath::B)), Some(Duration::from_millis(600)));
//!
//! // once per frame
//! music.lock().update(Duration::from_millis(16));
//! ```

#![warn(missing_docs)]

pub mod config; // Track table and JSON loading
pub mod controller; // Music controller and shared handle
pub mod host; // Engine-facing traits and settings stores
pub mod progress; // Level index / door path bookkeeping
pub mod ramp; // Frame-driven volume ramps
pub mod volume; // Volume arithmetic

#[cfg(feature = "streaming")]
pub mod backend; // rodio playback backend
#[cfg(feature = "sfx")]
pub mod sfx; // Sound effect synthesis

/// Error types for music and sound effect operations
#[derive(thiserror::Error, Debug)]
pub enum MusicError {
    /// Invalid or unusable music configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error while parsing JSON documents
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Durable settings storage is unavailable or rejected a write
    #[error("Settings storage error: {0}")]
    Storage(String),

    /// A playback primitive failed
    #[error("Playback error: {0}")]
    Playback(String),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFile(String),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for MusicError {
    /// Converts a String into `MusicError::Other`.
    ///
    /// Prefer the specific variants (`Config`, `Storage`, `Playback`, ...) when
    /// the failure has a known origin.
    fn from(msg: String) -> Self {
        MusicError::Other(msg)
    }
}

impl From<&str> for MusicError {
    fn from(msg: &str) -> Self {
        MusicError::Other(msg.to_string())
    }
}

/// Result type for music operations
pub type Result<T> = std::result::Result<T, MusicError>;

// Public API exports
pub use config::{MusicConfig, TrackDefinition, TrackKey, DEFAULT_TRACK_VOLUME};
pub use controller::{
    ContextTracks, ControllerOptions, MusicContext, MusicController, MusicHandle,
    DEFAULT_CROSSFADE_MS,
};
pub use host::{
    AudioHost, HostId, HostSignals, InteractionObserver, JsonFileStore, MemoryStore, NullStore,
    PlaybackState, SettingsStore, SoundHandle, VisibilityObserver,
};
pub use progress::{DoorPath, LevelProgress};
pub use ramp::{RampCompletion, RampScheduler, RampStep, VolumeRamp};
pub use volume::{clamp01, effective_volume, VolumeTarget};

#[cfg(feature = "streaming")]
pub use backend::{RodioHost, RodioSound, SfxPlayer};
#[cfg(feature = "sfx")]
pub use sfx::{render_cue, render_tones, write_wav, SfxCue, Tone, Waveform, SFX_SAMPLE_RATE};
