//! Music controller
//!
//! [`MusicController`] keeps the track table, the cached playback handles and
//! the global modifiers (mute, master volume, intensity). At most one track is
//! *current*. Transitions switch the current track eagerly: after
//! [`crossfade`](MusicController::crossfade) or a fading
//! [`stop`](MusicController::stop) the bookkeeping already reflects the new
//! state while the audible fade is still running in the ramp scheduler.
//!
//! [`MusicHandle`] is the shared form constructed once at startup and handed
//! to scenes. It owns the process-level [`HostSignals`]; its visibility and
//! first-interaction observers call back into the controller through a weak
//! reference and keep working across host rebinds.
//!
//! Nothing here returns an error. Missing tracks are logged and ignored,
//! storage and playback failures are logged at debug level and swallowed.

mod context;

pub use context::{ContextTracks, MusicContext};

use crate::config::{MusicConfig, TrackKey, DEFAULT_TRACK_VOLUME};
use crate::host::{AudioHost, HostId, HostSignals, PlaybackState, SettingsStore, SoundHandle};
use crate::ramp::{RampCompletion, RampScheduler, VolumeRamp};
use crate::volume::{clamp01, effective_volume, VolumeTarget};
use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Crossfade duration used when the configuration does not set `crossfadeMs`.
pub const DEFAULT_CROSSFADE_MS: u64 = 800;

/// Persistence keys and context track names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Storage key of the mute flag (`"1"` / `"0"`)
    pub muted_key: String,
    /// Storage key of the master volume
    pub volume_key: String,
    /// Storage key of the intensity multiplier
    pub intensity_key: String,
    /// Level/branch to track mapping used by `play_for_context`
    pub context_tracks: ContextTracks,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            muted_key: "musicMuted".into(),
            volume_key: "musicVolume".into(),
            intensity_key: "musicIntensity".into(),
            context_tracks: ContextTracks::default(),
        }
    }
}

#[derive(Clone, Copy)]
enum Setting {
    Muted,
    Volume,
    Intensity,
}

/// Background music state and transitions
pub struct MusicController {
    options: ControllerOptions,
    store: Box<dyn SettingsStore>,
    host: Option<Box<dyn AudioHost>>,
    host_id: Option<HostId>,
    config: Option<MusicConfig>,
    sounds: HashMap<TrackKey, Box<dyn SoundHandle>>,
    base_volumes: HashMap<TrackKey, f32>,
    current: Option<TrackKey>,
    ramps: RampScheduler,
    muted: bool,
    master_volume: f32,
    intensity: f32,
    unlocked: bool,
    hidden: bool,
    visibility_watched: bool,
    interaction_watched: bool,
}

impl MusicController {
    /// Create an unbound controller with default options
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        Self::with_options(store, ControllerOptions::default())
    }

    /// Create an unbound controller
    pub fn with_options(store: Box<dyn SettingsStore>, options: ControllerOptions) -> Self {
        MusicController {
            options,
            store,
            host: None,
            host_id: None,
            config: None,
            sounds: HashMap::new(),
            base_volumes: HashMap::new(),
            current: None,
            ramps: RampScheduler::new(),
            muted: false,
            master_volume: 1.0,
            intensity: 1.0,
            unlocked: false,
            hidden: false,
            visibility_watched: false,
            interaction_watched: false,
        }
    }

    /// Bind to a host surface without registering lifecycle observers.
    ///
    /// Re-binding to the same [`HostId`] is a no-op and returns `false`. A new
    /// host replaces the old one; cached handles, volumes, config and the
    /// current track are kept. The config is read from the host while none is
    /// loaded; persisted settings are re-read on every effective bind.
    ///
    /// [`MusicHandle::bind`] calls this and also wires the visibility and
    /// first-interaction observers into its [`HostSignals`].
    pub fn attach(&mut self, host: Box<dyn AudioHost>) -> bool {
        let id = host.id();
        if self.host_id == Some(id) {
            return false;
        }

        if self.config.is_none() {
            match host.music_config() {
                Some(config) if !config.is_empty() => {
                    info!("[music] loaded config with {} tracks", config.tracks.len());
                    self.config = Some(config);
                }
                Some(_) => debug!("[music] config has no tracks"),
                None => debug!("[music] no music config available"),
            }
        }

        self.load_settings();
        self.host = Some(host);
        self.host_id = Some(id);
        true
    }

    /// Whether the controller is bound to `id`
    pub fn is_bound_to(&self, id: HostId) -> bool {
        self.host_id == Some(id)
    }

    /// Id of the bound host
    pub fn host_id(&self) -> Option<HostId> {
        self.host_id
    }

    fn load_settings(&mut self) {
        if let Some(muted) = self.read_setting(Setting::Muted) {
            self.muted = muted == "1";
        }
        if let Some(volume) = self.read_setting(Setting::Volume).and_then(|v| parse_unit(&v)) {
            self.master_volume = volume;
        }
        if let Some(intensity) = self.read_setting(Setting::Intensity).and_then(|v| parse_unit(&v)) {
            self.intensity = intensity;
        }
    }

    fn setting_key(&self, setting: Setting) -> &str {
        match setting {
            Setting::Muted => &self.options.muted_key,
            Setting::Volume => &self.options.volume_key,
            Setting::Intensity => &self.options.intensity_key,
        }
    }

    fn read_setting(&self, setting: Setting) -> Option<String> {
        let key = self.setting_key(setting);
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                debug!("[music] could not read '{}': {}", key, err);
                None
            }
        }
    }

    fn persist(&mut self, setting: Setting) {
        let (key, value) = match setting {
            Setting::Muted => (&self.options.muted_key, if self.muted { "1" } else { "0" }.to_string()),
            Setting::Volume => (&self.options.volume_key, self.master_volume.to_string()),
            Setting::Intensity => (&self.options.intensity_key, self.intensity.to_string()),
        };
        if let Err(err) = self.store.set(key, &value) {
            debug!("[music] could not persist '{}': {}", key, err);
        }
    }

    // Track resolution

    fn lookup_base_volume(&self, key: &str) -> f32 {
        self.config
            .as_ref()
            .map_or(DEFAULT_TRACK_VOLUME, |c| c.base_volume(key))
    }

    fn lookup_loop(&self, key: &str) -> bool {
        self.config.as_ref().map_or(true, |c| c.looped(key))
    }

    /// Check the resource exists and cache its base volume
    fn ensure_loaded(&mut self, key: &str) -> bool {
        let Some(host) = self.host.as_ref() else {
            warn!("[music] no host bound, cannot play \"{}\"", key);
            return false;
        };
        if !host.has_audio(key) {
            warn!("[music] audio key \"{}\" is not loaded", key);
            return false;
        }
        if !self.base_volumes.contains_key(key) {
            let volume = self.lookup_base_volume(key);
            self.base_volumes.insert(key.to_string(), volume);
        }
        true
    }

    /// Create the playback handle for `key` once; later calls reuse it
    fn ensure_sound(&mut self, key: &str) -> bool {
        if self.sounds.contains_key(key) {
            return true;
        }
        let looped = self.lookup_loop(key);
        let Some(host) = self.host.as_mut() else {
            return false;
        };
        match host.create_sound(key, looped) {
            Ok(mut sound) => {
                sound.set_volume(0.0);
                self.sounds.insert(key.to_string(), sound);
                true
            }
            Err(err) => {
                warn!("[music] failed to create sound \"{}\": {}", key, err);
                false
            }
        }
    }

    fn compute_volume(&self, key: Option<&str>) -> f32 {
        let base = match key {
            Some(key) => self
                .base_volumes
                .get(key)
                .copied()
                .unwrap_or_else(|| self.lookup_base_volume(key)),
            None => self
                .config
                .as_ref()
                .map_or(DEFAULT_TRACK_VOLUME, |c| c.default_volume),
        };
        effective_volume(base, self.master_volume, self.intensity, self.muted)
    }

    /// Re-apply the effective volume to the current handle.
    ///
    /// A fade-in still running on the current handle is finished at the new
    /// volume.
    fn apply_volume(&mut self) {
        let Some(key) = self.current.clone() else {
            return;
        };
        let volume = self.compute_volume(Some(&key));
        self.ramps.cancel(&key);
        if let Some(sound) = self.sounds.get_mut(&key) {
            sound.set_volume(volume);
        }
    }

    fn sound_state(&self, key: &str) -> PlaybackState {
        self.sounds
            .get(key)
            .map_or(PlaybackState::Stopped, |s| s.state())
    }

    fn start_sound(&mut self, key: &str, volume: f32) {
        if let Some(sound) = self.sounds.get_mut(key) {
            sound.set_volume(clamp01(volume));
            if let Err(err) = sound.play() {
                debug!("[music] play \"{}\" failed: {}", key, err);
            }
        }
    }

    fn stop_sound(&mut self, key: &str) {
        self.ramps.cancel(key);
        if let Some(sound) = self.sounds.get_mut(key) {
            if let Err(err) = sound.stop() {
                debug!("[music] stop \"{}\" failed: {}", key, err);
            }
        }
    }

    /// Ramp `key` from its present volume to silence, then stop it
    fn fade_out_sound(&mut self, key: &str, duration: Duration) {
        if duration.is_zero() {
            self.stop_sound(key);
            return;
        }
        let from = self.sounds.get(key).map_or(0.0, |s| s.volume());
        self.ramps
            .start(VolumeRamp::new(key, from, 0.0, duration).then(RampCompletion::Stop));
    }

    // Transport

    /// Play a track, optionally fading in.
    ///
    /// Replaying the current, already playing track only re-applies its volume.
    /// Any other current track is stopped immediately first. The track becomes
    /// current right away, not when the fade-in ends.
    pub fn play(&mut self, key: &str, fade_in: Option<Duration>) {
        if !self.ensure_loaded(key) || !self.ensure_sound(key) {
            return;
        }

        if self.current.as_deref() == Some(key) && self.sound_state(key) == PlaybackState::Playing {
            self.apply_volume();
            return;
        }

        if let Some(previous) = self.current.clone() {
            if previous != key && self.sound_state(&previous) != PlaybackState::Stopped {
                self.stop(None);
            }
        }

        let fade = fade_in.unwrap_or(Duration::ZERO);
        let target = self.compute_volume(Some(key));
        self.ramps.cancel(key);

        if fade.is_zero() {
            self.start_sound(key, target);
        } else {
            self.start_sound(key, 0.0);
            self.ramps.start(VolumeRamp::new(key, 0.0, target, fade));
        }

        debug!("[music] play \"{}\" (fade-in {:?})", key, fade);
        self.current = Some(key.to_string());
    }

    /// Crossfade from the current track to `key` over `duration`.
    ///
    /// The incoming track starts at volume 0 and ramps to its effective
    /// volume; a playing outgoing track ramps from its present volume to 0 and
    /// is then stopped. `key` is current as soon as this returns.
    pub fn crossfade(&mut self, key: &str, duration: Duration) {
        if !self.ensure_loaded(key) || !self.ensure_sound(key) {
            return;
        }

        if self.current.as_deref() == Some(key) {
            self.apply_volume();
            return;
        }

        let target = self.compute_volume(Some(key));
        self.ramps.cancel(key);
        self.start_sound(key, 0.0);

        if let Some(previous) = self.current.take() {
            match self.sound_state(&previous) {
                PlaybackState::Playing => self.fade_out_sound(&previous, duration),
                PlaybackState::Paused => self.stop_sound(&previous),
                PlaybackState::Stopped => {}
            }
        }

        if duration.is_zero() {
            if let Some(sound) = self.sounds.get_mut(key) {
                sound.set_volume(target);
            }
        } else {
            self.ramps.start(VolumeRamp::new(key, 0.0, target, duration));
        }

        debug!("[music] crossfade to \"{}\" over {:?}", key, duration);
        self.current = Some(key.to_string());
    }

    /// Crossfade using the configured `crossfadeMs`
    pub fn crossfade_default(&mut self, key: &str) {
        let ms = self
            .config
            .as_ref()
            .and_then(|c| c.crossfade_ms)
            .unwrap_or(DEFAULT_CROSSFADE_MS);
        self.crossfade(key, Duration::from_millis(ms));
    }

    /// Stop the current track, optionally fading out.
    ///
    /// The current track is cleared immediately; with a fade the sound keeps
    /// ramping down until the ramp completes.
    pub fn stop(&mut self, fade_out: Option<Duration>) {
        let Some(key) = self.current.take() else {
            return;
        };
        self.fade_out_sound(&key, fade_out.unwrap_or(Duration::ZERO));
        debug!("[music] stop \"{}\"", key);
    }

    /// Pause the current track if it is playing
    pub fn pause(&mut self) {
        let Some(key) = self.current.clone() else {
            return;
        };
        if let Some(sound) = self.sounds.get_mut(&key) {
            if sound.is_playing() {
                if let Err(err) = sound.pause() {
                    debug!("[music] pause \"{}\" failed: {}", key, err);
                }
            }
        }
    }

    /// Resume the current track if it is paused
    pub fn resume(&mut self) {
        let Some(key) = self.current.clone() else {
            return;
        };
        if let Some(sound) = self.sounds.get_mut(&key) {
            if sound.is_paused() {
                if let Err(err) = sound.resume() {
                    debug!("[music] resume \"{}\" failed: {}", key, err);
                }
            }
        }
    }

    /// Play the track for a level/branch
    pub fn play_for_context(&mut self, ctx: MusicContext, fade_in: Option<Duration>) {
        let key = self.options.context_tracks.resolve(ctx).to_string();
        self.play(&key, fade_in);
    }

    /// Track key `play_for_context` would pick
    pub fn track_for_context(&self, ctx: MusicContext) -> &str {
        self.options.context_tracks.resolve(ctx)
    }

    // Volume

    /// Set the master volume (`VolumeTarget::All`) or one track's base volume.
    ///
    /// The value is clamped to `[0, 1]`. Only the master volume is persisted.
    pub fn set_volume(&mut self, target: impl Into<VolumeTarget>, volume: f32) {
        let volume = clamp01(volume);
        match target.into() {
            VolumeTarget::All => {
                self.master_volume = volume;
                self.persist(Setting::Volume);
                self.apply_volume();
            }
            VolumeTarget::Track(key) => {
                let is_current = self.current.as_deref() == Some(key.as_str());
                self.base_volumes.insert(key, volume);
                if is_current {
                    self.apply_volume();
                }
            }
        }
    }

    /// Mute music
    pub fn mute(&mut self) {
        self.muted = true;
        self.persist(Setting::Muted);
        self.apply_volume();
    }

    /// Unmute music
    pub fn unmute(&mut self) {
        self.muted = false;
        self.persist(Setting::Muted);
        self.apply_volume();
    }

    /// Flip the mute flag, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        if self.muted {
            self.unmute();
        } else {
            self.mute();
        }
        self.muted
    }

    /// Set the intensity multiplier in `[0, 1]`
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = clamp01(intensity);
        self.persist(Setting::Intensity);
        self.apply_volume();
    }

    // Frame loop and lifecycle

    /// Advance fades by one frame.
    ///
    /// Does nothing while the host is hidden.
    pub fn update(&mut self, delta: Duration) {
        if self.hidden {
            return;
        }
        for step in self.ramps.advance(delta) {
            let Some(sound) = self.sounds.get_mut(&step.target) else {
                continue;
            };
            sound.set_volume(clamp01(step.value));
            if step.finished && step.on_complete == RampCompletion::Stop {
                if let Err(err) = sound.stop() {
                    debug!("[music] stop \"{}\" failed: {}", step.target, err);
                }
            }
        }
    }

    /// Visibility change: pause when hidden, resume when visible
    pub fn handle_visibility(&mut self, hidden: bool) {
        self.hidden = hidden;
        if hidden {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// First user interaction: unlock audio once
    pub fn unlock(&mut self) {
        if self.unlocked {
            return;
        }
        if let Some(host) = self.host.as_mut() {
            if let Err(err) = host.unlock_audio() {
                debug!("[music] audio unlock failed: {}", err);
            }
        }
        self.unlocked = true;
    }

    /// Mark observers as registered, returning which ones still needed it
    fn claim_observers(&mut self) -> (bool, bool) {
        let claim = (!self.visibility_watched, !self.interaction_watched);
        self.visibility_watched = true;
        self.interaction_watched = true;
        claim
    }

    // Queries

    /// Key of the current track
    pub fn current_key(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Effective volume `key` would play at right now
    pub fn effective_volume_for(&self, key: &str) -> f32 {
        self.compute_volume(Some(key))
    }

    /// Cached (or configured) base volume of `key`
    pub fn base_volume(&self, key: &str) -> f32 {
        self.base_volumes
            .get(key)
            .copied()
            .unwrap_or_else(|| self.lookup_base_volume(key))
    }

    /// Master volume
    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Intensity multiplier
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Mute flag
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Whether audio has been unlocked
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Whether the host last reported itself hidden
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether a fade is running on `key`
    pub fn is_fading(&self, key: &str) -> bool {
        self.ramps.is_active(key)
    }

    /// Whether a playback handle exists for `key`
    pub fn has_sound(&self, key: &str) -> bool {
        self.sounds.contains_key(key)
    }

    /// Transport state of `key`'s handle, if created
    pub fn playback_state(&self, key: &str) -> Option<PlaybackState> {
        self.sounds.get(key).map(|s| s.state())
    }

    /// Present volume of `key`'s handle, if created
    pub fn sound_volume(&self, key: &str) -> Option<f32> {
        self.sounds.get(key).map(|s| s.volume())
    }

    /// Loaded configuration
    pub fn config(&self) -> Option<&MusicConfig> {
        self.config.as_ref()
    }

    /// Options in use
    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }
}

fn parse_unit(value: &str) -> Option<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .map(clamp01)
}

/// Shared music controller.
///
/// Cloning is cheap; all clones drive the same controller.
#[derive(Clone)]
pub struct MusicHandle {
    inner: Arc<Mutex<MusicController>>,
    signals: HostSignals,
}

impl MusicHandle {
    /// Create a shared controller with default options
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        Self::from_controller(MusicController::new(store))
    }

    /// Create a shared controller with custom options
    pub fn with_options(store: Box<dyn SettingsStore>, options: ControllerOptions) -> Self {
        Self::from_controller(MusicController::with_options(store, options))
    }

    /// Share an existing controller
    pub fn from_controller(controller: MusicController) -> Self {
        Self::from_parts(controller, HostSignals::new())
    }

    /// Share an existing controller, listening to an existing event source
    pub fn from_parts(controller: MusicController, signals: HostSignals) -> Self {
        MusicHandle {
            inner: Arc::new(Mutex::new(controller)),
            signals,
        }
    }

    /// Bind to a host surface.
    ///
    /// Same-host binds are ignored. The first effective bind also registers the
    /// visibility and first-interaction observers on [`signals`](Self::signals);
    /// they are never registered again and stay valid for every later host.
    /// Observers take the controller lock, so do not notify the signals while
    /// holding [`lock`](Self::lock).
    pub fn bind(&self, host: Box<dyn AudioHost>) {
        let (watch_visibility, watch_interaction) = {
            let mut controller = self.inner.lock();
            if controller.is_bound_to(host.id()) {
                return;
            }
            controller.claim_observers()
        };

        if watch_visibility {
            let weak = Arc::downgrade(&self.inner);
            self.signals.watch_visibility(Box::new(move |hidden| {
                if let Some(inner) = weak.upgrade() {
                    inner.lock().handle_visibility(hidden);
                }
            }));
        }

        if watch_interaction {
            let weak = Arc::downgrade(&self.inner);
            self.signals.watch_first_interaction(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.lock().unlock();
                }
            }));
        }

        self.inner.lock().attach(host);
    }

    /// Event source for window visibility and the first user interaction
    pub fn signals(&self) -> &HostSignals {
        &self.signals
    }

    /// Lock the controller for a sequence of calls
    pub fn lock(&self) -> MutexGuard<'_, MusicController> {
        self.inner.lock()
    }
}
