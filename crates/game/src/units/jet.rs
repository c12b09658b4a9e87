//! Bomber jet: flies a straight line over its target, dropping grenades.

use engine_core::Faction;
use glam::Vec2;
use rand::Rng;

use super::{Body, Spawn, UpdateContext};
use crate::render::{Canvas, DrawPass, SpriteId, SHADOW, WHITE};
use crate::sfx::SoundEffect;

pub const ACCELERATION: f32 = 100.0;
pub const MAX_SPEED: f32 = 200.0;
/// Grenades are released while within this distance of the target.
pub const DROP_RADIUS: f32 = 150.0;
/// Fuse time already spent when a dropped grenade leaves the jet.
pub const DROPPED_FUSE: f32 = 0.5;
/// The shadow sits this far below the jet sprite.
const ALTITUDE: f32 = 32.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Jet {
    pub dir: Vec2,
    pub speed: f32,
    pub target: Vec2,
    time: f32,
    drop_timer: f32,
}

impl Jet {
    /// A jet at `from` heading straight across `target`.
    pub fn new(from: Vec2, target: Vec2) -> Self {
        Self {
            dir: (target - from).try_normalize().unwrap_or(Vec2::X),
            speed: 0.0,
            target,
            time: 0.0,
            drop_timer: 0.0,
        }
    }

    pub fn update(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        if self.time == 0.0 {
            ctx.play(SoundEffect::JetFlyby, body.pos);
        }

        self.speed = (self.speed + ACCELERATION * ctx.dt).min(MAX_SPEED);
        self.time += ctx.dt;
        body.pos += self.dir * self.speed * ctx.dt;

        self.drop_timer -= ctx.dt;
        if body.pos.distance(self.target) < DROP_RADIUS && self.drop_timer < 0.0 {
            self.drop_timer = ctx.rng.gen_range(0.05..=0.1);
            ctx.spawn(Spawn::Grenade {
                pos: body.pos,
                target: body.pos,
                faction: Faction::Cpu,
                fuse: DROPPED_FUSE,
            });
        }

        let p = body.pos;
        if p.x < 0.0 || p.y < 0.0 || p.x > ctx.bounds.x || p.y > ctx.bounds.y {
            body.kill();
        }
    }

    pub fn draw(&self, body: &Body, pass: DrawPass, canvas: &mut dyn Canvas, offset: Vec2) {
        let frame = (self.time * 10.0) as u8 % 2;
        let angle = self.dir.y.atan2(self.dir.x);
        let pos = body.pos - offset;
        match pass {
            DrawPass::Bottom => canvas.draw_rotated_sprite(SpriteId::Jet(frame), pos, angle, SHADOW),
            DrawPass::Top => canvas.draw_rotated_sprite(
                SpriteId::Jet(frame),
                pos - Vec2::new(0.0, ALTITUDE),
                angle,
                WHITE,
            ),
            DrawPass::Floor | DrawPass::Structure => {}
        }
    }
}
