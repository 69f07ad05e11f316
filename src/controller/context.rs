//! Context-driven track selection
//!
//! Level 1 plays the castle theme. Level 2 and every other index (including 0)
//! have an `A` and a `B` track; anything other than an explicit `B` picks the
//! `A` track.

use crate::config::TrackKey;
use crate::progress::DoorPath;

/// Where the player is, as far as music is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MusicContext {
    /// Level index (1-based)
    pub level_index: u32,
    /// Branch taken into this level
    pub path: Option<DoorPath>,
}

impl MusicContext {
    /// Create a context
    pub fn new(level_index: u32, path: Option<DoorPath>) -> Self {
        Self { level_index, path }
    }
}

/// Track keys for each level/branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTracks {
    /// Level 1 (and the menus)
    pub castle: TrackKey,
    /// Level 2, branch A
    pub level2_a: TrackKey,
    /// Level 2, branch B
    pub level2_b: TrackKey,
    /// Level 3 and beyond (and level 0), branch A
    pub final_a: TrackKey,
    /// Level 3 and beyond (and level 0), branch B
    pub final_b: TrackKey,
}

impl Default for ContextTracks {
    fn default() -> Self {
        Self {
            castle: "castle_theme".into(),
            level2_a: "crypt_theme".into(),
            level2_b: "crystals_theme".into(),
            final_a: "throne_theme".into(),
            final_b: "lava_theme".into(),
        }
    }
}

impl ContextTracks {
    /// Track key for a context
    pub fn resolve(&self, ctx: MusicContext) -> &str {
        let branch_b = ctx.path == Some(DoorPath::B);
        match ctx.level_index {
            1 => &self.castle,
            2 if branch_b => &self.level2_b,
            2 => &self.level2_a,
            _ if branch_b => &self.final_b,
            _ => &self.final_a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_ignores_path() {
        let tracks = ContextTracks::default();
        for path in [None, Some(DoorPath::A), Some(DoorPath::B)] {
            assert_eq!(tracks.resolve(MusicContext::new(1, path)), "castle_theme");
        }
    }

    #[test]
    fn test_level_two_branches() {
        let tracks = ContextTracks::default();
        assert_eq!(tracks.resolve(MusicContext::new(2, Some(DoorPath::B))), "crystals_theme");
        assert_eq!(tracks.resolve(MusicContext::new(2, Some(DoorPath::A))), "crypt_theme");
        assert_eq!(tracks.resolve(MusicContext::new(2, None)), "crypt_theme");
    }

    #[test]
    fn test_final_levels_branch() {
        let tracks = ContextTracks::default();
        assert_eq!(tracks.resolve(MusicContext::new(3, Some(DoorPath::B))), "lava_theme");
        assert_eq!(tracks.resolve(MusicContext::new(3, None)), "throne_theme");
        assert_eq!(tracks.resolve(MusicContext::new(7, Some(DoorPath::A))), "throne_theme");
    }

    #[test]
    fn test_level_zero_falls_through_to_final_tracks() {
        let tracks = ContextTracks::default();
        assert_eq!(tracks.resolve(MusicContext::new(0, None)), "throne_theme");
        assert_eq!(tracks.resolve(MusicContext::new(0, Some(DoorPath::A))), "throne_theme");
        assert_eq!(tracks.resolve(MusicContext::new(0, Some(DoorPath::B))), "lava_theme");
    }
}
