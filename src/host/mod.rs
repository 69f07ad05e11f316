//! Engine-facing interfaces
//!
//! The controller consumes the game engine only through these traits:
//!
//! - [`SoundHandle`]: one loopable, volume-controllable playback instance
//! - [`AudioHost`]: resource lookup, handle creation, audio unlock and the
//!   music configuration source
//! - [`SettingsStore`]: durable string storage for persisted settings
//! - [`HostSignals`]: visibility / first-interaction events, owned by the
//!   shared handle rather than by any one host
//!
//! Every trait is `Send` so the controller can sit behind a shared
//! [`MusicHandle`](crate::MusicHandle) reachable from host callbacks.

pub mod signals;
pub mod store;

pub use signals::HostSignals;
pub use store::{JsonFileStore, MemoryStore, NullStore};

use crate::config::MusicConfig;
use crate::Result;

/// Playback state reported by a [`SoundHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Not started, or stopped
    #[default]
    Stopped,
    /// Currently playing
    Playing,
    /// Paused (can resume)
    Paused,
}

/// A playback instance for one audio resource.
///
/// `volume`/`set_volume` are infallible; the transport calls may fail, and the
/// controller logs and ignores those failures.
pub trait SoundHandle: Send {
    /// Start playback from the beginning
    fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the position
    fn pause(&mut self) -> Result<()>;

    /// Resume from pause
    fn resume(&mut self) -> Result<()>;

    /// Stop playback
    fn stop(&mut self) -> Result<()>;

    /// Current transport state
    fn state(&self) -> PlaybackState;

    /// Current volume in `[0, 1]`
    fn volume(&self) -> f32;

    /// Set the volume; callers pass values already clamped to `[0, 1]`
    fn set_volume(&mut self, volume: f32);

    /// Returns true while playing
    fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Returns true while paused
    fn is_paused(&self) -> bool {
        self.state() == PlaybackState::Paused
    }
}

/// Identity of a host surface (a scene, a window, a test fixture).
///
/// Binding the controller to the same id twice is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(pub u64);

/// Callback fired with `true` when the host becomes hidden and `false` when visible.
pub type VisibilityObserver = Box<dyn FnMut(bool) + Send>;

/// One-shot callback fired on the first user interaction.
pub type InteractionObserver = Box<dyn FnOnce() + Send>;

/// The game engine surface the controller is bound to.
pub trait AudioHost: Send {
    /// Identity used for idempotent binding
    fn id(&self) -> HostId;

    /// The preloaded music configuration, if any
    fn music_config(&self) -> Option<MusicConfig>;

    /// Whether the audio resource `key` is loaded
    fn has_audio(&self, key: &str) -> bool;

    /// Create a playback handle for `key`, initially stopped at volume 0
    fn create_sound(&mut self, key: &str, looped: bool) -> Result<Box<dyn SoundHandle>>;

    /// Lift autoplay restrictions after a user gesture
    fn unlock_audio(&mut self) -> Result<()>;
}

/// Durable key-value storage for persisted settings.
///
/// Implementations may be unavailable (sandboxed storage); callers treat
/// every error as "no value" and carry on.
pub trait SettingsStore: Send {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}
