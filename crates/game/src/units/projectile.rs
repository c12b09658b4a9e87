//! Rockets (homing on a fixed point) and grenades (lobbed, fused).

use engine_core::Faction;
use glam::Vec2;
use rand::Rng;

use super::{Blast, Body, UpdateContext};
use crate::render::{Canvas, DrawPass, SpriteId, SHADOW, WHITE};

pub const ROCKET_ACCELERATION: f32 = 100.0;
pub const ROCKET_MAX_SPEED: f32 = 300.0;
/// The rocket detonates once this close to its target.
pub const ROCKET_TERMINAL_DISTANCE: f32 = 10.0;

/// Seconds from throw to detonation.
pub const GRENADE_FUSE: f32 = 1.0;
/// Peak of the visual arc in pixels.
const GRENADE_ARC: f32 = 32.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Rocket {
    pub target: Vec2,
    pub speed: f32,
}

impl Rocket {
    pub fn new(target: Vec2, speed: f32) -> Self {
        Self { target, speed }
    }

    pub fn update(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        self.speed = (self.speed + ROCKET_ACCELERATION * ctx.dt).min(ROCKET_MAX_SPEED);

        let to = self.target - body.pos;
        let dist = to.length();
        body.pos += to.normalize_or_zero() * (self.speed * ctx.dt).min(dist);

        if body.pos.distance(self.target) < ROCKET_TERMINAL_DISTANCE && body.kill() {
            ctx.explode(body.pos, Blast::Large, body.faction);
        }
    }

    pub fn draw(&self, body: &Body, pass: DrawPass, canvas: &mut dyn Canvas, offset: Vec2) {
        if pass != DrawPass::Top {
            return;
        }
        let dir = self.target - body.pos;
        canvas.draw_rotated_sprite(SpriteId::Rocket, body.pos - offset, dir.y.atan2(dir.x), WHITE);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grenade {
    /// Where it was thrown from.
    pub from: Vec2,
    pub target: Vec2,
    /// Fuse time elapsed, detonates past [`GRENADE_FUSE`].
    pub time: f32,
    spin: f32,
}

impl Grenade {
    pub fn new(from: Vec2, target: Vec2, fuse_elapsed: f32, rng: &mut impl Rng) -> Self {
        Self {
            from,
            target,
            time: fuse_elapsed,
            spin: rng.gen_range(-20.0..=20.0),
        }
    }

    pub fn update(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        self.time += ctx.dt;
        body.pos = self.from.lerp(self.target, self.time.min(GRENADE_FUSE));
        if self.time > GRENADE_FUSE && body.kill() {
            ctx.explode(self.target, Blast::Small, body.faction);
        }
    }

    pub fn draw(&self, body: &Body, pass: DrawPass, canvas: &mut dyn Canvas, offset: Vec2) {
        let angle = self.time * self.spin;
        let pos = body.pos - offset;
        match pass {
            DrawPass::Bottom => canvas.draw_rotated_sprite(SpriteId::Grenade, pos, angle, SHADOW),
            DrawPass::Top => {
                let height = (self.time * std::f32::consts::PI).sin() * GRENADE_ARC;
                canvas.draw_rotated_sprite(
                    SpriteId::Grenade,
                    pos - Vec2::new(0.0, height),
                    angle,
                    WHITE,
                );
            }
            DrawPass::Floor | DrawPass::Structure => {}
        }
    }
}

/// Body for a projectile fired by `faction`.
pub fn projectile_body(pos: Vec2, faction: Faction) -> Body {
    Body::new(pos, faction, engine_core::Capabilities::NONE, 1.0)
}
