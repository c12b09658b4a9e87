//! Deployable drone: waits on its pad, climbs, flies a sortie, comes home.

use engine_core::Faction;
use glam::Vec2;
use hecs::Entity;
use rand::Rng;

use super::{Blast, Body, Command, Spawn, UpdateContext, BUILDING_CENTER};
use crate::render::{Canvas, DrawPass, SpriteId, SHADOW, WHITE};
use crate::sfx::SoundEffect;

/// Cruising height (visual only).
pub const CEILING: f32 = 24.0;
/// Climb and descent rate (px/s).
pub const CLIMB_RATE: f32 = 16.0;
pub const MAX_SPEED: f32 = 100.0;
pub const ACCELERATION: f32 = 100.0;
/// Target search radius around the drone.
pub const SEARCH_RADIUS: f32 = 300.0;
pub const FIRING_RANGE: f32 = 120.0;
pub const HEAL_RANGE: f32 = 40.0;
/// Health restored per second while in heal range.
pub const HEAL_RATE: f32 = 40.0;
/// Health a repair drone can hand out per sortie.
pub const HEALTHPOINTS: f32 = 100.0;
pub const ROCKETS: u32 = 1;
/// Pad position relative to the deployer's corner.
pub const DOCK_OFFSET: Vec2 = BUILDING_CENTER;

/// Within this distance of the pad the drone snaps onto it.
const ARRIVE_DISTANCE: f32 = 2.0;
/// Speed cap shrinks linearly inside this distance of a hover point.
const BRAKING_DISTANCE: f32 = 64.0;
/// Largest per-axis velocity handed out at the top of the climb.
const WOBBLE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroneState {
    Wait,
    Start,
    Attack,
    Repair,
    Return,
    Land,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drone {
    pub state: DroneState,
    /// Deployer this drone belongs to.
    pub origin: Entity,
    pub target: Option<Entity>,
    pub velocity: Vec2,
    pub height: f32,
    pub rockets: u32,
    pub healthpoints: f32,
    pub repair: bool,
    anim: f32,
}

impl Drone {
    pub fn new(origin: Entity, repair: bool) -> Self {
        Self {
            state: DroneState::Wait,
            origin,
            target: None,
            velocity: Vec2::ZERO,
            height: 0.0,
            rockets: ROCKETS,
            healthpoints: HEALTHPOINTS,
            repair,
            anim: 0.0,
        }
    }

    pub fn update(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        let dt = ctx.dt;
        self.anim += dt;

        if !ctx.is_alive(Some(self.origin)) {
            if self.state == DroneState::Wait {
                // Docked drones go down with their pad.
                body.kill();
            } else {
                self.self_destruct(body, ctx);
            }
            return;
        }

        match self.state {
            DroneState::Wait => {
                if ctx.is_alive(self.target) {
                    ctx.push(Command::DroneLaunched {
                        deployer: self.origin,
                    });
                    self.state = DroneState::Start;
                } else {
                    self.target = None;
                }
            }
            DroneState::Start => {
                self.height += CLIMB_RATE * dt;
                if self.height >= CEILING {
                    self.height = CEILING;
                    self.velocity = Vec2::new(
                        ctx.rng.gen_range(-WOBBLE..=WOBBLE),
                        ctx.rng.gen_range(-WOBBLE..=WOBBLE),
                    );
                    self.state = if self.repair {
                        DroneState::Repair
                    } else {
                        DroneState::Attack
                    };
                }
            }
            DroneState::Attack => self.update_attack(body, ctx),
            DroneState::Repair => self.update_repair(body, ctx),
            DroneState::Return => self.update_return(body, ctx),
            DroneState::Land => {
                self.height -= CLIMB_RATE * dt;
                if self.height <= 0.0 {
                    self.height = 0.0;
                    ctx.push(Command::DroneDocked {
                        deployer: self.origin,
                    });
                    self.rockets = ROCKETS;
                    self.healthpoints = HEALTHPOINTS;
                    self.target = None;
                    self.state = DroneState::Wait;
                }
            }
        }
    }

    fn update_attack(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        let is_enemy = |b: &Body| b.capabilities.is_soldier();
        let target = match ctx.live_body(self.target).filter(is_enemy) {
            Some(b) => Some(b),
            None => {
                self.target = None;
                ctx.nearest_within(body.pos, SEARCH_RADIUS, is_enemy)
                    .map(|(e, b)| {
                        self.target = Some(e);
                        b
                    })
            }
        };
        let Some(target) = target.filter(|_| self.rockets > 0) else {
            self.head_home();
            return;
        };

        self.steer(body, target.pos, ctx.dt, false);
        if body.pos.distance(target.pos) <= FIRING_RANGE {
            ctx.spawn(Spawn::Rocket {
                pos: body.pos,
                target: target.pos,
                speed: self.velocity.length(),
            });
            ctx.play(SoundEffect::RocketLaunch, body.pos);
            self.rockets -= 1;
            self.head_home();
        }
    }

    fn update_repair(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        let needs_repair = |b: &Body| b.capabilities.is_player_structure() && !b.health.is_full();
        let target = match ctx.live_body(self.target).filter(needs_repair) {
            Some(b) => self.target.zip(Some(b)),
            None => {
                self.target = None;
                ctx.nearest_within(body.pos, SEARCH_RADIUS, needs_repair)
            }
        };
        let Some((target, patient)) = target.filter(|_| self.healthpoints > 0.0) else {
            self.head_home();
            return;
        };
        self.target = Some(target);

        let aim = patient.pos + BUILDING_CENTER;
        self.steer(body, aim, ctx.dt, true);
        if body.pos.distance(aim) <= HEAL_RANGE {
            let missing = patient.health.max - patient.health.current;
            let amount = (HEAL_RATE * ctx.dt).min(self.healthpoints).min(missing);
            self.healthpoints -= amount;
            ctx.push(Command::Heal { target, amount });
            if self.healthpoints <= 0.0 || amount >= missing {
                self.head_home();
            }
        }
    }

    fn update_return(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        let Some(origin) = ctx.body(self.origin) else {
            return;
        };
        let pad = origin.pos + DOCK_OFFSET;
        if body.pos.distance(pad) < ARRIVE_DISTANCE {
            body.pos = pad;
            self.velocity = Vec2::ZERO;
            self.state = DroneState::Land;
            return;
        }
        self.steer(body, pad, ctx.dt, true);
    }

    /// Accelerate toward `dest` with a capped speed. With `brake` the cap
    /// falls off in proportion to the remaining distance.
    fn steer(&mut self, body: &mut Body, dest: Vec2, dt: f32, brake: bool) {
        let to = dest - body.pos;
        let dist = to.length();
        self.velocity += to.normalize_or_zero() * ACCELERATION * dt;
        let cap = if brake {
            MAX_SPEED * (dist / BRAKING_DISTANCE).min(1.0)
        } else {
            MAX_SPEED
        };
        self.velocity = self.velocity.clamp_length_max(cap);
        let step = self.velocity * dt;
        if brake && step.length() >= dist {
            body.pos = dest;
        } else {
            body.pos += step;
        }
    }

    fn head_home(&mut self) {
        self.target = None;
        self.state = DroneState::Return;
    }

    fn self_destruct(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        if body.kill() {
            log::debug!("Drone lost its deployer, self-destructing at {:?}", body.pos);
            ctx.explode(body.pos, Blast::Small, Faction::Player);
        }
    }

    pub fn draw(&self, body: &Body, pass: DrawPass, canvas: &mut dyn Canvas, offset: Vec2) {
        let angle = self.velocity.y.atan2(self.velocity.x);
        let frame = (self.anim * 10.0) as u8 % 2;
        let pos = body.pos - offset;
        match pass {
            DrawPass::Bottom => {
                canvas.draw_rotated_sprite(SpriteId::Drone(frame), pos, angle, SHADOW)
            }
            DrawPass::Top => canvas.draw_rotated_sprite(
                SpriteId::Drone(frame),
                pos - Vec2::new(0.0, self.height),
                angle,
                WHITE,
            ),
            DrawPass::Floor | DrawPass::Structure => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::structure::{Structure, StructureKind};
    use crate::units::test_support::{soldier_body, Harness};
    use crate::units::{Behavior, Soldier};
    use engine_core::Capabilities;

    const DT: f32 = 0.05;

    fn deployer(h: &mut Harness, pos: Vec2) -> Entity {
        let kind = StructureKind::drone_deployer(false);
        let body = Body::new(pos, Faction::Player, kind.capabilities(), kind.max_health());
        h.add(body, Behavior::Structure(Structure::new(kind, 1.0)))
    }

    fn drone_body(pos: Vec2) -> Body {
        Body::new(pos, Faction::Player, Capabilities::NONE, 1.0)
    }

    fn step(h: &mut Harness, drone: &mut Drone, body: &mut Body) -> Vec<Command> {
        h.with_ctx(DT, |ctx| drone.update(body, ctx));
        h.take_commands()
    }

    #[test]
    fn waits_forever_without_a_target() {
        let mut h = Harness::new();
        let pad = deployer(&mut h, Vec2::new(320.0, 320.0));
        let mut drone = Drone::new(pad, false);
        let mut body = drone_body(Vec2::new(336.0, 336.0));
        for _ in 0..1000 {
            assert!(step(&mut h, &mut drone, &mut body).is_empty());
        }
        assert_eq!(drone.state, DroneState::Wait);
        assert!(body.alive);
        assert_eq!(body.pos, Vec2::new(336.0, 336.0));
    }

    #[test]
    fn assigned_target_launches_and_frees_the_pad() {
        let mut h = Harness::new();
        let pad = deployer(&mut h, Vec2::new(320.0, 320.0));
        let soldier = h.add(soldier_body(Vec2::new(400.0, 320.0)), Behavior::Soldier(Soldier::new(false)));
        let mut drone = Drone::new(pad, false);
        drone.target = Some(soldier);
        let mut body = drone_body(Vec2::new(336.0, 336.0));

        let commands = step(&mut h, &mut drone, &mut body);
        assert_eq!(commands, vec![Command::DroneLaunched { deployer: pad }]);
        assert_eq!(drone.state, DroneState::Start);
    }

    #[test]
    fn full_attack_sortie_fires_once_and_docks() {
        let mut h = Harness::new();
        let pad = deployer(&mut h, Vec2::new(320.0, 320.0));
        let soldier = h.add(soldier_body(Vec2::new(600.0, 336.0)), Behavior::Soldier(Soldier::new(false)));
        let mut drone = Drone::new(pad, false);
        drone.target = Some(soldier);
        let mut body = drone_body(Vec2::new(336.0, 336.0));

        let mut rockets = 0;
        let mut docked = false;
        let mut seen = vec![DroneState::Wait];
        for _ in 0..2000 {
            for command in step(&mut h, &mut drone, &mut body) {
                match command {
                    Command::Spawn(Spawn::Rocket { target, .. }) => {
                        rockets += 1;
                        assert_eq!(target, Vec2::new(600.0, 336.0));
                    }
                    Command::DroneDocked { deployer } => {
                        assert_eq!(deployer, pad);
                        docked = true;
                    }
                    _ => {}
                }
            }
            if seen.last() != Some(&drone.state) {
                seen.push(drone.state);
            }
            if docked {
                break;
            }
        }

        assert_eq!(rockets, 1);
        assert!(docked);
        assert_eq!(
            seen,
            vec![
                DroneState::Wait,
                DroneState::Start,
                DroneState::Attack,
                DroneState::Return,
                DroneState::Land,
                DroneState::Wait,
            ]
        );
        assert_eq!(drone.rockets, ROCKETS);
        assert_eq!(drone.height, 0.0);
        assert_eq!(body.pos, Vec2::new(336.0, 336.0));
    }

    #[test]
    fn losing_the_deployer_mid_flight_self_destructs_that_tick() {
        let mut h = Harness::new();
        let pad = deployer(&mut h, Vec2::new(320.0, 320.0));
        let mut drone = Drone::new(pad, false);
        drone.state = DroneState::Return;
        drone.height = CEILING;
        let mut body = drone_body(Vec2::new(400.0, 400.0));

        h.kill(pad);
        let commands = step(&mut h, &mut drone, &mut body);
        assert!(!body.alive);
        assert_eq!(
            commands,
            vec![Command::Explode {
                pos: Vec2::new(400.0, 400.0),
                blast: Blast::Small,
                faction: Faction::Player,
            }]
        );
    }

    #[test]
    fn docked_drone_is_removed_quietly_with_its_pad() {
        let mut h = Harness::new();
        let pad = deployer(&mut h, Vec2::new(320.0, 320.0));
        let mut drone = Drone::new(pad, false);
        let mut body = drone_body(Vec2::new(336.0, 336.0));
        h.kill(pad);
        assert!(step(&mut h, &mut drone, &mut body).is_empty());
        assert!(!body.alive);
    }

    #[test]
    fn lost_target_without_replacement_returns() {
        let mut h = Harness::new();
        let pad = deployer(&mut h, Vec2::new(320.0, 320.0));
        let soldier = h.add(soldier_body(Vec2::new(800.0, 320.0)), Behavior::Soldier(Soldier::new(false)));
        let mut drone = Drone::new(pad, false);
        drone.state = DroneState::Attack;
        drone.target = Some(soldier);
        let mut body = drone_body(Vec2::new(336.0, 336.0));

        step(&mut h, &mut drone, &mut body);
        assert_eq!(drone.state, DroneState::Attack);

        h.kill(soldier);
        step(&mut h, &mut drone, &mut body);
        assert_eq!(drone.state, DroneState::Return);
        assert_eq!(drone.target, None);
    }

    #[test]
    fn return_never_reacquires() {
        let mut h = Harness::new();
        let pad = deployer(&mut h, Vec2::new(320.0, 320.0));
        h.add(soldier_body(Vec2::new(360.0, 360.0)), Behavior::Soldier(Soldier::new(false)));
        let mut drone = Drone::new(pad, false);
        drone.state = DroneState::Return;
        let mut body = drone_body(Vec2::new(500.0, 500.0));

        for _ in 0..20 {
            step(&mut h, &mut drone, &mut body);
            assert!(drone.target.is_none());
            assert_ne!(drone.state, DroneState::Attack);
        }
    }

    #[test]
    fn repair_drone_spends_its_budget_then_returns() {
        let mut h = Harness::new();
        let pad = deployer(&mut h, Vec2::new(320.0, 320.0));
        let wall_kind = StructureKind::Wall;
        let wall = h.add(
            Body::new(Vec2::new(352.0, 320.0), Faction::Player, wall_kind.capabilities(), 200.0),
            Behavior::Structure(Structure::new(wall_kind, 1.0)),
        );
        h.set_health(wall, 10.0);

        let mut drone = Drone::new(pad, true);
        drone.state = DroneState::Repair;
        drone.height = CEILING;
        let mut body = drone_body(Vec2::new(368.0, 336.0));

        let mut healed = 0.0;
        for _ in 0..200 {
            for command in step(&mut h, &mut drone, &mut body) {
                if let Command::Heal { target, amount } = command {
                    assert_eq!(target, wall);
                    healed += amount;
                }
            }
            if drone.state != DroneState::Repair {
                break;
            }
        }
        assert!((healed - HEALTHPOINTS).abs() < 1e-3);
        assert_eq!(drone.state, DroneState::Return);
        assert!(drone.target.is_none());
    }
}
