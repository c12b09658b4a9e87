//! Short-lived visual units: explosion flashes and the craters they leave.

use glam::Vec2;

use super::Body;
use crate::render::{Canvas, DrawPass, SpriteId, WHITE};

/// Lifetime of an explosion flash in seconds.
pub const EXPLOSION_DURATION: f32 = 0.3;
const EXPLOSION_FRAMES: f32 = 4.0;
/// Sprites are drawn from their top-left corner, explosions from their centre.
const HALF_SPRITE: Vec2 = Vec2::new(16.0, 16.0);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Explosion {
    pub time: f32,
}

impl Explosion {
    pub fn update(&mut self, body: &mut Body, dt: f32) {
        self.time += dt;
        if self.time >= EXPLOSION_DURATION {
            body.kill();
        }
    }

    fn frame(&self) -> u8 {
        let t = (self.time / EXPLOSION_DURATION).clamp(0.0, 1.0);
        ((t * EXPLOSION_FRAMES) as u8).min(EXPLOSION_FRAMES as u8 - 1)
    }

    pub fn draw(&self, body: &Body, pass: DrawPass, canvas: &mut dyn Canvas, offset: Vec2) {
        if pass == DrawPass::Top {
            canvas.draw_sprite(
                SpriteId::Explosion(self.frame()),
                body.pos - HALF_SPRITE - offset,
                WHITE,
                false,
            );
        }
    }
}

/// Scorch mark on the floor. Never updates, never dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crater;

impl Crater {
    pub fn draw(&self, body: &Body, pass: DrawPass, canvas: &mut dyn Canvas, offset: Vec2) {
        if pass == DrawPass::Floor {
            canvas.draw_sprite(SpriteId::Crater, body.pos - HALF_SPRITE - offset, WHITE, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{DrawCall, RecordingCanvas};
    use engine_core::{Capabilities, Faction};

    #[test]
    fn explosion_burns_out() {
        let mut explosion = Explosion::default();
        let mut body = Body::new(Vec2::ZERO, Faction::Player, Capabilities::NONE, 1.0);
        explosion.update(&mut body, 0.2);
        assert!(body.alive);
        explosion.update(&mut body, 0.2);
        assert!(!body.alive);
        assert_eq!(explosion.frame(), 3);
    }

    #[test]
    fn crater_only_draws_on_the_floor() {
        let body = Body::new(Vec2::new(100.0, 100.0), Faction::Player, Capabilities::CRATER, 1.0);
        let mut canvas = RecordingCanvas::default();
        for pass in DrawPass::ALL {
            Crater.draw(&body, pass, &mut canvas, Vec2::new(10.0, 0.0));
        }
        assert_eq!(
            canvas.calls,
            vec![DrawCall::Sprite(SpriteId::Crater, Vec2::new(74.0, 84.0))]
        );
    }
}
