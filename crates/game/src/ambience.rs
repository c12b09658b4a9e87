//! Background wind: a looping voice whose loudness, pitch and pan follow a
//! slowly varying wind speed and a wandering direction.

use audio::{Mixer, VoiceHandle};
use glam::Vec2;
use rand::Rng;

use crate::sfx::{SoundEffect, Sfx};

const BASE_SPEED: f32 = 300.0;
const GUST: f32 = 100.0;
/// Largest per-tick change of the wind direction in radians.
const ANGLE_DRIFT: f32 = 0.02;

#[derive(Debug, Clone, Default)]
pub struct Wind {
    pub speed: f32,
    pub angle: f32,
    voice: Option<VoiceHandle>,
}

impl Wind {
    /// Start the wind loop. Without a voice the wind still blows silently.
    pub fn start(sfx: &mut Sfx) -> Self {
        let voice = sfx.play_looped(SoundEffect::Wind, 0.0);
        if voice.is_none() {
            log::warn!("No voice for the wind loop, ambience will be silent");
        }
        Self {
            speed: BASE_SPEED,
            angle: 0.0,
            voice,
        }
    }

    pub fn voice(&self) -> Option<VoiceHandle> {
        self.voice
    }

    /// Wind velocity in pixels per second.
    pub fn velocity(&self) -> Vec2 {
        Vec2::from_angle(self.angle) * self.speed
    }

    /// Recompute the wind for game time `t` and retune the loop.
    pub fn update(&mut self, t: f32, rng: &mut impl Rng, mixer: Option<&Mixer>) {
        self.speed = BASE_SPEED + (t * 0.05).sin() * (t * 0.051).cos() * (t * 0.0511).cos() * GUST;
        self.angle += rng.gen_range(-ANGLE_DRIFT..=ANGLE_DRIFT);

        let (Some(voice), Some(mixer)) = (self.voice, mixer) else {
            return;
        };
        mixer.set_volume(voice, self.speed / 500.0);
        mixer.set_pitch(voice, self.speed / 400.0);
        mixer.set_pan(voice, -self.angle.cos() * 0.25);
    }
}
