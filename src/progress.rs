//! Level progress
//!
//! The game keeps two values across scene restarts: the level index (1-based)
//! and the accumulated door path, one `A`/`B` letter per door taken. Level 2's
//! branch is the first letter, level 3's branch the second, and so on.

use crate::controller::MusicContext;
use crate::{MusicError, Result};
use std::fmt;

/// Highest level; it holds the boss fight.
pub const FINAL_LEVEL: u32 = 3;

/// Door choice at the end of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DoorPath {
    /// Left door (default branch)
    #[default]
    A,
    /// Right door
    B,
}

impl DoorPath {
    /// Parse a path letter; only `A` and `B` are accepted
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(DoorPath::A),
            'B' => Some(DoorPath::B),
            _ => None,
        }
    }

    /// Path letter
    pub fn as_char(self) -> char {
        match self {
            DoorPath::A => 'A',
            DoorPath::B => 'B',
        }
    }
}

impl fmt::Display for DoorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Level index plus the doors taken to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelProgress {
    level_index: u32,
    path: Vec<DoorPath>,
}

impl Default for LevelProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelProgress {
    /// Start of a new game: level 1, no doors taken
    pub fn new() -> Self {
        LevelProgress {
            level_index: 1,
            path: Vec::new(),
        }
    }

    /// Build progress from stored values.
    ///
    /// Level indices below 1 are raised to 1. Letters other than `A`/`B` are an
    /// error.
    pub fn parse(level_index: u32, path: &str) -> Result<Self> {
        let path = path
            .chars()
            .map(|c| {
                DoorPath::from_char(c)
                    .ok_or_else(|| MusicError::Config(format!("Invalid door path letter '{}'", c)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(LevelProgress {
            level_index: level_index.max(1),
            path,
        })
    }

    /// Current level (1-based)
    pub fn level_index(&self) -> u32 {
        self.level_index
    }

    /// Doors taken so far
    pub fn path(&self) -> &[DoorPath] {
        &self.path
    }

    /// Doors taken so far as the stored string form, e.g. `"AB"`
    pub fn path_string(&self) -> String {
        self.path.iter().map(|p| p.as_char()).collect()
    }

    /// Branch of the current level: `A` on level 1, otherwise the door taken
    /// to enter it (missing letters default to `A`).
    pub fn path_choice(&self) -> DoorPath {
        if self.level_index <= 1 {
            return DoorPath::A;
        }
        let idx = (self.level_index - 2) as usize;
        self.path.get(idx).copied().unwrap_or_default()
    }

    /// Whether the current level is the last one
    pub fn is_final_level(&self) -> bool {
        self.level_index >= FINAL_LEVEL
    }

    /// Progress after walking through `choice` at the end of this level
    pub fn enter_door(&self, choice: DoorPath) -> LevelProgress {
        let mut path = self.path.clone();
        path.push(choice);
        LevelProgress {
            level_index: self.level_index + 1,
            path,
        }
    }

    /// Music selection context for the current level
    pub fn music_context(&self) -> MusicContext {
        MusicContext::new(self.level_index, Some(self.path_choice()))
    }
}
