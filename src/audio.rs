//! Audio boundary
//!
//! Playback and track unlocking belong to the host. The engine only names
//! what should be heard; a missing or silent sink is always acceptable.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Bubble launched
    Fire,
    /// Projectile hit a side wall
    Bounce,
    /// Projectile made contact
    Land,
    /// One bubble popped
    Pop,
    /// Bubbles fell off the board
    Drop,
    /// Ceiling moved down / pressure row added
    Advance,
    /// Dropped bomb detonated
    Bomb,
    /// Chest opened
    Chest,
    /// Stage or round won
    ClearStage,
}

impl SoundEffect {
    /// Asset name the host resolves
    pub fn asset(self) -> &'static str {
        match self {
            SoundEffect::Fire => "fire.wav",
            SoundEffect::Bounce => "bounce.wav",
            SoundEffect::Land => "land.wav",
            SoundEffect::Pop => "pop.wav",
            SoundEffect::Drop => "drop.wav",
            SoundEffect::Advance => "advance.wav",
            SoundEffect::Bomb => "bomb.mp3",
            SoundEffect::Chest => "chest.wav",
            SoundEffect::ClearStage => "clearstage.mp3",
        }
    }
}

/// Host audio collaborator
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Make bonus track `track` (1-based) available in the playlist
    fn unlock_bonus_track(&mut self, track: u32);

    /// (Re)start background music
    fn start_playlist(&mut self) {}
}

/// Sink that plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}

    fn unlock_bonus_track(&mut self, _track: u32) {}
}

/// Sink that records requests instead of playing them
#[derive(Debug, Default, Clone)]
pub struct AudioLog {
    pub played: Vec<SoundEffect>,
    pub unlocked: Vec<u32>,
    pub playlist_starts: u32,
    muted: bool,
}

impl AudioLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Muted sinks ignore effects but still record unlocks
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn count(&self, effect: SoundEffect) -> usize {
        self.played.iter().filter(|e| **e == effect).count()
    }
}

impl AudioSink for AudioLog {
    fn play(&mut self, effect: SoundEffect) {
        if !self.muted {
            self.played.push(effect);
        }
    }

    fn unlock_bonus_track(&mut self, track: u32) {
        if !self.unlocked.contains(&track) {
            self.unlocked.push(track);
        }
    }

    fn start_playlist(&mut self) {
        self.playlist_starts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_log_mute() {
        let mut log = AudioLog::new();
        log.play(SoundEffect::Pop);
        log.set_muted(true);
        log.play(SoundEffect::Pop);
        log.unlock_bonus_track(2);
        log.unlock_bonus_track(2);
        assert_eq!(log.count(SoundEffect::Pop), 1);
        assert_eq!(log.unlocked, vec![2]);
    }
}
