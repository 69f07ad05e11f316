//! rodio playback backend
//!
//! [`RodioHost`] streams configured track files from an asset directory
//! through rodio sinks. Window focus and input are not host concerns: the
//! embedding process forwards them to
//! [`MusicHandle::signals`](crate::MusicHandle::signals).

use crate::config::MusicConfig;
use crate::host::{AudioHost, HostId, PlaybackState, SoundHandle};
use crate::sfx::{render_cue, SfxCue, SFX_SAMPLE_RATE};
use crate::volume::clamp01;
use crate::{MusicError, Result};
use log::{debug, warn};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HOST_ID: AtomicU64 = AtomicU64::new(1);

/// Resolve the file backing `key`, if the config names it and it exists
pub fn track_path(asset_dir: &Path, config: Option<&MusicConfig>, key: &str) -> Option<PathBuf> {
    let def = config?.get(key)?;
    let path = asset_dir.join(&def.file);
    path.is_file().then_some(path)
}

/// [`AudioHost`] backed by a rodio output stream
pub struct RodioHost {
    id: HostId,
    stream: OutputStreamHandle,
    asset_dir: PathBuf,
    config: Option<MusicConfig>,
}

impl RodioHost {
    /// Create a host playing files under `asset_dir`
    pub fn new(
        stream: OutputStreamHandle,
        asset_dir: impl Into<PathBuf>,
        config: Option<MusicConfig>,
    ) -> Self {
        RodioHost {
            id: HostId(NEXT_HOST_ID.fetch_add(1, Ordering::Relaxed)),
            stream,
            asset_dir: asset_dir.into(),
            config,
        }
    }

    /// Directory track files are resolved against
    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }
}

impl AudioHost for RodioHost {
    fn id(&self) -> HostId {
        self.id
    }

    fn music_config(&self) -> Option<MusicConfig> {
        self.config.clone()
    }

    fn has_audio(&self, key: &str) -> bool {
        track_path(&self.asset_dir, self.config.as_ref(), key).is_some()
    }

    fn create_sound(&mut self, key: &str, looped: bool) -> Result<Box<dyn SoundHandle>> {
        let path = track_path(&self.asset_dir, self.config.as_ref(), key)
            .ok_or_else(|| MusicError::AudioFile(format!("No audio file for \"{}\"", key)))?;
        debug!("[music] sound \"{}\" -> {}", key, path.display());
        Ok(Box::new(RodioSound::new(self.stream.clone(), path, looped)))
    }

    fn unlock_audio(&mut self) -> Result<()> {
        // Native output has no autoplay gate.
        Ok(())
    }
}

/// One track file played through its own sink
pub struct RodioSound {
    stream: OutputStreamHandle,
    path: PathBuf,
    looped: bool,
    sink: Option<Sink>,
    state: PlaybackState,
    volume: f32,
}

impl RodioSound {
    /// Wrap `path`; nothing is decoded until the first `play`
    pub fn new(stream: OutputStreamHandle, path: PathBuf, looped: bool) -> Self {
        RodioSound {
            stream,
            path,
            looped,
            sink: None,
            state: PlaybackState::Stopped,
            volume: 0.0,
        }
    }

    fn open_sink(&self) -> Result<Sink> {
        let file = File::open(&self.path)?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| {
            MusicError::AudioFile(format!("Failed to decode {}: {}", self.path.display(), e))
        })?;
        let sink = Sink::try_new(&self.stream)
            .map_err(|e| MusicError::AudioDevice(format!("Failed to create sink: {}", e)))?;
        sink.set_volume(self.volume);
        if self.looped {
            sink.append(decoder.repeat_infinite());
        } else {
            sink.append(decoder);
        }
        Ok(sink)
    }
}

impl SoundHandle for RodioSound {
    fn play(&mut self) -> Result<()> {
        // Always from the top: drop whatever the old sink still holds
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.sink = Some(self.open_sink()?);
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| MusicError::Playback("Sound was never started".into()))?;
        sink.pause();
        self.state = PlaybackState::Paused;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| MusicError::Playback("Sound was never started".into()))?;
        sink.play();
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.state = PlaybackState::Stopped;
        Ok(())
    }

    fn state(&self) -> PlaybackState {
        match (&self.sink, self.state) {
            // A one-shot track that ran out is stopped
            (Some(sink), PlaybackState::Playing) if sink.empty() => PlaybackState::Stopped,
            (_, state) => state,
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = clamp01(volume);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }
}

/// Fire-and-forget player for [`SfxCue`]s
pub struct SfxPlayer {
    stream: OutputStreamHandle,
    volume: f32,
}

impl SfxPlayer {
    /// Create a player at unity gain
    pub fn new(stream: OutputStreamHandle) -> Self {
        SfxPlayer { stream, volume: 1.0 }
    }

    /// Gain applied to every cue
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp01(volume);
    }

    /// Render and start `cue`; it plays to the end on a detached sink
    pub fn play(&self, cue: SfxCue) -> Result<()> {
        let samples = render_cue(cue, SFX_SAMPLE_RATE);
        let sink = Sink::try_new(&self.stream).map_err(|e| {
            warn!("[sfx] no output for \"{}\": {}", cue, e);
            MusicError::AudioDevice(format!("Failed to create sink: {}", e))
        })?;
        sink.set_volume(self.volume);
        sink.append(SamplesBuffer::new(1, SFX_SAMPLE_RATE, samples));
        sink.detach();
        Ok(())
    }
}
