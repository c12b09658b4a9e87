//! Named sound effects and the game-side front of the mixer.

use std::sync::Arc;

use audio::{AudioSource, Mixer, SoundBank, VoiceHandle};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    RocketLaunch,
    Explosion,
    JetFlyby,
    GunBurst,
    Wind,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 5] = [
        SoundEffect::RocketLaunch,
        SoundEffect::Explosion,
        SoundEffect::JetFlyby,
        SoundEffect::GunBurst,
        SoundEffect::Wind,
    ];

    /// Path relative to the media directory.
    pub fn path(self) -> &'static str {
        match self {
            SoundEffect::RocketLaunch => "sounds/rocket.wav",
            SoundEffect::Explosion => "sounds/explosion.wav",
            SoundEffect::JetFlyby => "sounds/jet.wav",
            SoundEffect::GunBurst => "sounds/gun_burst.wav",
            SoundEffect::Wind => "sounds/wind_loop.wav",
        }
    }

    /// How many voices may play this effect at once.
    pub fn max_refs(self) -> Option<u32> {
        match self {
            SoundEffect::RocketLaunch | SoundEffect::Explosion => None,
            SoundEffect::JetFlyby | SoundEffect::Wind => Some(1),
            SoundEffect::GunBurst => Some(2),
        }
    }

    pub fn volume(self) -> f32 {
        match self {
            SoundEffect::RocketLaunch => 0.1,
            SoundEffect::Explosion | SoundEffect::GunBurst | SoundEffect::Wind => 0.5,
            SoundEffect::JetFlyby => 1.0,
        }
    }

    /// Inclusive pitch range a play picks from.
    pub fn pitch_range(self) -> (f32, f32) {
        match self {
            SoundEffect::Explosion => (0.5, 1.0),
            SoundEffect::Wind => (0.6, 0.6),
            _ => (0.9, 1.1),
        }
    }
}

pub struct Sfx {
    mixer: Mixer,
    bank: SoundBank,
}

impl Sfx {
    pub fn new(mixer: Mixer, bank: SoundBank) -> Self {
        Self { mixer, bank }
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn source(&mut self, effect: SoundEffect) -> Arc<AudioSource> {
        self.bank.source(effect.path(), effect.max_refs())
    }

    /// Decode every effect up front so the first play doesn't hitch.
    pub fn preload(&mut self) {
        for effect in SoundEffect::ALL {
            self.source(effect);
        }
    }

    /// One-shot at the effect's volume with a random pitch from its range.
    pub fn play(&mut self, effect: SoundEffect, pan: f32, rng: &mut impl Rng) -> Option<VoiceHandle> {
        let source = self.source(effect);
        let (lo, hi) = effect.pitch_range();
        let pitch = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        self.mixer.play(&source, effect.volume(), pan, pitch, false)
    }

    pub fn play_looped(&mut self, effect: SoundEffect, pan: f32) -> Option<VoiceHandle> {
        let source = self.source(effect);
        let (pitch, _) = effect.pitch_range();
        self.mixer.play_looped(&source, effect.volume(), pan, pitch)
    }

    /// Release voices whose one-shots have run out.
    pub fn collect_finished(&self) {
        self.mixer.collect_finished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn silent_sfx() -> Sfx {
        Sfx::new(Mixer::default(), SoundBank::new("/nonexistent-media"))
    }

    #[test]
    fn jet_sound_is_capped_at_one_voice() {
        let mut sfx = silent_sfx();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sfx.play(SoundEffect::JetFlyby, 0.0, &mut rng).is_some());
        assert!(sfx.play(SoundEffect::JetFlyby, 0.0, &mut rng).is_none());
    }

    #[test]
    fn gun_burst_allows_two_voices() {
        let mut sfx = silent_sfx();
        let mut rng = StdRng::seed_from_u64(2);
        sfx.preload();
        // Silent clips finish on the first render, so keep them unrendered.
        assert!(sfx.play(SoundEffect::GunBurst, 0.0, &mut rng).is_some());
        assert!(sfx.play(SoundEffect::GunBurst, 0.0, &mut rng).is_some());
        assert!(sfx.play(SoundEffect::GunBurst, 0.0, &mut rng).is_none());
        assert!(sfx.play(SoundEffect::Explosion, 0.0, &mut rng).is_some());
    }
}
