#![allow(dead_code)]

use goblins_music::{
    AudioHost, HostId, MemoryStore, MusicConfig, MusicError, PlaybackState, SettingsStore,
    SoundHandle, TrackDefinition,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub type Shared<T> = Arc<Mutex<T>>;

/// Everything a mock sound has been asked to do
#[derive(Debug, Default)]
pub struct SoundLog {
    pub state: PlaybackState,
    pub volume: f32,
    pub looped: bool,
    pub plays: usize,
    pub stops: usize,
    pub pauses: usize,
    pub resumes: usize,
}

pub struct MockSound {
    log: Shared<SoundLog>,
    failing: bool,
}

impl MockSound {
    fn check(&self) -> goblins_music::Result<()> {
        if self.failing {
            Err(MusicError::Playback("mock failure".into()))
        } else {
            Ok(())
        }
    }
}

impl SoundHandle for MockSound {
    fn play(&mut self) -> goblins_music::Result<()> {
        let mut log = self.log.lock();
        log.plays += 1;
        log.state = PlaybackState::Playing;
        drop(log);
        self.check()
    }

    fn pause(&mut self) -> goblins_music::Result<()> {
        let mut log = self.log.lock();
        log.pauses += 1;
        log.state = PlaybackState::Paused;
        drop(log);
        self.check()
    }

    fn resume(&mut self) -> goblins_music::Result<()> {
        let mut log = self.log.lock();
        log.resumes += 1;
        log.state = PlaybackState::Playing;
        drop(log);
        self.check()
    }

    fn stop(&mut self) -> goblins_music::Result<()> {
        let mut log = self.log.lock();
        log.stops += 1;
        log.state = PlaybackState::Stopped;
        drop(log);
        self.check()
    }

    fn state(&self) -> PlaybackState {
        self.log.lock().state
    }

    fn volume(&self) -> f32 {
        self.log.lock().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.lock().volume = volume;
    }
}

/// Host-side state shared between the test and the mock host
#[derive(Default)]
pub struct MockWorld {
    pub sounds: HashMap<String, Shared<SoundLog>>,
    pub created: Vec<String>,
    pub unlocks: usize,
}

impl MockWorld {
    pub fn sound(&self, key: &str) -> Shared<SoundLog> {
        Arc::clone(self.sounds.get(key).expect("sound was never created"))
    }
}

pub struct MockHost {
    id: u64,
    config: Option<MusicConfig>,
    keys: Vec<String>,
    world: Shared<MockWorld>,
    failing: bool,
}

impl MockHost {
    pub fn new(id: u64, config: Option<MusicConfig>, keys: &[&str]) -> (Self, Shared<MockWorld>) {
        let world = Arc::new(Mutex::new(MockWorld::default()));
        let host = MockHost {
            id,
            config,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            world: Arc::clone(&world),
            failing: false,
        };
        (host, world)
    }

    /// A second surface sharing the same world
    pub fn sibling(&self, id: u64, config: Option<MusicConfig>) -> Self {
        MockHost {
            id,
            config,
            keys: self.keys.clone(),
            world: Arc::clone(&self.world),
            failing: self.failing,
        }
    }

    /// Sounds created by this host fail every transport call
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

impl AudioHost for MockHost {
    fn id(&self) -> HostId {
        HostId(self.id)
    }

    fn music_config(&self) -> Option<MusicConfig> {
        self.config.clone()
    }

    fn has_audio(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    fn create_sound(
        &mut self,
        key: &str,
        looped: bool,
    ) -> goblins_music::Result<Box<dyn SoundHandle>> {
        let log = Arc::new(Mutex::new(SoundLog {
            looped,
            ..SoundLog::default()
        }));
        let mut world = self.world.lock();
        world.created.push(key.to_string());
        world.sounds.insert(key.to_string(), Arc::clone(&log));
        Ok(Box::new(MockSound {
            log,
            failing: self.failing,
        }))
    }

    fn unlock_audio(&mut self) -> goblins_music::Result<()> {
        self.world.lock().unlocks += 1;
        Ok(())
    }
}

/// Settings store the test can inspect after handing it to the controller
#[derive(Clone, Default)]
pub struct SharedStore(pub Shared<MemoryStore>);

impl SharedStore {
    pub fn with_values(values: &[(&str, &str)]) -> Self {
        SharedStore(Arc::new(Mutex::new(MemoryStore::with_values(
            values.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        ))))
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.0.lock().get(key).ok().flatten()
    }
}

impl SettingsStore for SharedStore {
    fn get(&self, key: &str) -> goblins_music::Result<Option<String>> {
        self.0.lock().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> goblins_music::Result<()> {
        self.0.lock().set(key, value)
    }
}

/// Config from the two-track scenario: `a` uses the default volume,
/// `b` is louder and does not loop.
pub fn scenario_config() -> MusicConfig {
    MusicConfig::from_json_str(
        r#"{
            "defaultVolume": 0.3,
            "tracks": {
                "a": { "file": "a.mp3" },
                "b": { "file": "b.mp3", "volume": 0.8, "loop": false }
            }
        }"#,
    )
    .expect("scenario config parses")
}

/// Config with the five level themes
pub fn game_config() -> MusicConfig {
    MusicConfig::new()
        .default_volume(0.5)
        .crossfade_ms(400)
        .track("castle_theme", TrackDefinition::new("castle.mp3"))
        .track("crypt_theme", TrackDefinition::new("crypt.mp3"))
        .track("crystals_theme", TrackDefinition::new("crystals.mp3"))
        .track("throne_theme", TrackDefinition::new("throne.mp3"))
        .track("lava_theme", TrackDefinition::new("lava.mp3"))
}

pub const GAME_KEYS: [&str; 5] = [
    "castle_theme",
    "crypt_theme",
    "crystals_theme",
    "throne_theme",
    "lava_theme",
];
