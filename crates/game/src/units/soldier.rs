//! Infantry: walk to the nearest player building and shoot it down.

use engine_core::Faction;
use glam::Vec2;
use rand::Rng;

use super::{Body, Command, Spawn, UpdateContext, BUILDING_CENTER};
use crate::render::{Canvas, DrawPass, SpriteId, WHITE};
use crate::sfx::SoundEffect;

pub const MAX_HEALTH: f32 = 40.0;
pub const SPEED: f32 = 10.0;
/// Stops and opens fire this close to the target's centre.
pub const ENGAGE_RANGE: f32 = 32.0;
pub const BULLET_DAMAGE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoldierState {
    Stand,
    Run,
    Shoot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Soldier {
    pub state: SoldierState,
    pub target: Option<hecs::Entity>,
    /// Throws grenades instead of firing bursts.
    pub grenadier: bool,
    shoot_timer: f32,
    anim: f32,
    mirrored: bool,
}

impl Soldier {
    pub fn new(grenadier: bool) -> Self {
        Self {
            state: SoldierState::Stand,
            target: None,
            grenadier,
            shoot_timer: 0.0,
            anim: 0.0,
            mirrored: false,
        }
    }

    pub fn update(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        let dt = ctx.dt;
        self.anim = (self.anim + dt) % 1.0;
        self.shoot_timer -= dt;

        match self.state {
            SoldierState::Stand => {
                self.target = ctx
                    .nearest_anywhere(body.pos, |b| b.capabilities.is_player_structure())
                    .map(|(e, _)| e);
                if self.target.is_some() {
                    self.state = SoldierState::Run;
                }
            }
            SoldierState::Run => {
                let Some(target) = ctx.live_body(self.target) else {
                    self.lose_target();
                    return;
                };
                let aim = target.pos + BUILDING_CENTER;
                let vel = (aim - body.pos).normalize_or_zero() * SPEED;
                self.mirrored = vel.x > 0.0;
                body.pos += vel * dt;
                if body.pos.distance(aim) < ENGAGE_RANGE {
                    self.state = SoldierState::Shoot;
                }
            }
            SoldierState::Shoot => {
                let (Some(entity), Some(target)) = (self.target, ctx.live_body(self.target)) else {
                    self.lose_target();
                    return;
                };
                if self.shoot_timer < 0.0 {
                    if self.grenadier {
                        ctx.spawn(Spawn::Grenade {
                            pos: body.pos,
                            target: target.pos + BUILDING_CENTER,
                            faction: Faction::Cpu,
                            fuse: 0.0,
                        });
                        self.shoot_timer = ctx.rng.gen_range(2.0..=4.0);
                    } else {
                        ctx.push(Command::Damage {
                            target: entity,
                            amount: BULLET_DAMAGE,
                            faction: Faction::Cpu,
                        });
                        ctx.play(SoundEffect::GunBurst, body.pos);
                        self.shoot_timer = ctx.rng.gen_range(1.0..=3.0);
                    }
                }
            }
        }
    }

    fn lose_target(&mut self) {
        self.target = None;
        self.state = SoldierState::Stand;
    }

    pub fn draw(&self, body: &Body, pass: DrawPass, canvas: &mut dyn Canvas, offset: Vec2) {
        if pass != DrawPass::Bottom {
            return;
        }
        let frame = match self.state {
            SoldierState::Stand => 5,
            SoldierState::Run => (self.anim * 8.0) as u8 % 4,
            SoldierState::Shoot if self.shoot_timer < 0.5 => 4 + (self.anim * 16.0) as u8 % 2,
            SoldierState::Shoot => 5,
        };
        canvas.draw_sprite(
            SpriteId::Soldier(frame),
            body.pos + Vec2::new(-5.0, -4.0) - offset,
            WHITE,
            self.mirrored,
        );
    }
}
