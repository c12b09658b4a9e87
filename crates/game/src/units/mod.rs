//! Units: the shared body record, the closed set of behaviours, and the
//! context a behaviour sees while it updates.
//!
//! Every unit is a hecs entity carrying a [`Body`] and a [`Behavior`]. A
//! behaviour never mutates another entity directly. It reads the world
//! through [`UpdateContext`] and queues [`Command`]s that the simulation
//! applies once the behaviour's update has returned.

pub mod drone;
pub mod effect;
pub mod jet;
pub mod projectile;
pub mod soldier;
pub mod structure;

use engine_core::{Capabilities, Faction, Health};
use glam::Vec2;
use hecs::{Entity, World};
use rand::rngs::StdRng;

use crate::render::{Canvas, DrawPass};
use crate::sfx::SoundEffect;
use crate::spatial::SpatialIndex;

pub use drone::{Drone, DroneState};
pub use effect::{Crater, Explosion};
pub use jet::Jet;
pub use projectile::{Grenade, Rocket};
pub use soldier::{Soldier, SoldierState};
pub use structure::{Deployer, Structure, StructureKind};

/// Offset from a building's top-left corner to its centre.
pub const BUILDING_CENTER: Vec2 = Vec2::new(16.0, 16.0);

/// State every unit has, whatever its behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub alive: bool,
    pub faction: Faction,
    pub capabilities: Capabilities,
    pub health: Health,
}

impl Body {
    pub fn new(pos: Vec2, faction: Faction, capabilities: Capabilities, max_health: f32) -> Self {
        Self {
            pos,
            alive: true,
            faction,
            capabilities,
            health: Health::new(max_health),
        }
    }

    /// Mark dead. Returns `true` only for the call that actually killed it.
    pub fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    pub fn in_radius(&self, center: Vec2, radius: f32) -> bool {
        self.pos.distance(center) < radius
    }
}

/// Size class of an explosion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blast {
    Large,
    Small,
}

impl Blast {
    pub fn radius(self) -> f32 {
        match self {
            Blast::Large => 24.0,
            Blast::Small => 16.0,
        }
    }

    pub fn damage(self) -> f32 {
        match self {
            Blast::Large => 50.0,
            Blast::Small => 25.0,
        }
    }
}

/// New units a behaviour asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spawn {
    Rocket {
        pos: Vec2,
        target: Vec2,
        speed: f32,
    },
    Grenade {
        pos: Vec2,
        target: Vec2,
        faction: Faction,
        fuse: f32,
    },
    /// A drone belonging to the unit that asked for it.
    Drone { pos: Vec2, repair: bool },
}

/// Effects queued during an update and applied right after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Spawn(Spawn),
    Damage {
        target: Entity,
        amount: f32,
        faction: Faction,
    },
    Heal {
        target: Entity,
        amount: f32,
    },
    Explode {
        pos: Vec2,
        blast: Blast,
        faction: Faction,
    },
    /// A deployer hands its drone something to attack or repair.
    AssignDroneTarget {
        drone: Entity,
        target: Entity,
    },
    /// A drone left its pad.
    DroneLaunched {
        deployer: Entity,
    },
    /// A drone is back on its pad.
    DroneDocked {
        deployer: Entity,
    },
    PlaySound {
        effect: SoundEffect,
        pos: Vec2,
    },
}

/// What a behaviour may see and do during its update.
pub struct UpdateContext<'a> {
    pub dt: f32,
    pub world: &'a World,
    pub spatial: &'a SpatialIndex,
    /// World size in pixels.
    pub bounds: Vec2,
    pub rng: &'a mut StdRng,
    pub commands: &'a mut Vec<Command>,
}

impl UpdateContext<'_> {
    /// Current body of another unit, if it still exists.
    pub fn body(&self, entity: Entity) -> Option<Body> {
        self.world.get::<&Body>(entity).ok().map(|b| *b)
    }

    /// Liveness check performed before every weak-reference dereference.
    pub fn is_alive(&self, entity: Option<Entity>) -> bool {
        entity
            .and_then(|e| self.body(e))
            .is_some_and(|b| b.alive)
    }

    /// Body of `entity` if it is alive.
    pub fn live_body(&self, entity: Option<Entity>) -> Option<Body> {
        entity.and_then(|e| self.body(e)).filter(|b| b.alive)
    }

    /// Nearest live unit within `radius` of `pos` accepted by `accept`.
    pub fn nearest_within(
        &self,
        pos: Vec2,
        radius: f32,
        accept: impl Fn(&Body) -> bool,
    ) -> Option<(Entity, Body)> {
        let mut best: Option<(Entity, Body, f32)> = None;
        for entity in self.spatial.candidates(pos, radius) {
            let Some(body) = self.body(entity) else { continue };
            if !body.alive || !accept(&body) {
                continue;
            }
            let d = body.pos.distance_squared(pos);
            if d < radius * radius && best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((entity, body, d));
            }
        }
        best.map(|(e, b, _)| (e, b))
    }

    /// Nearest live unit anywhere in the world accepted by `accept`.
    pub fn nearest_anywhere(&self, pos: Vec2, accept: impl Fn(&Body) -> bool) -> Option<(Entity, Body)> {
        let mut query = self.world.query::<&Body>();
        query
            .iter()
            .filter(|&(_, body)| body.alive && accept(body))
            .map(|(e, body)| (e, *body, body.pos.distance_squared(pos)))
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(e, b, _)| (e, b))
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn spawn(&mut self, spawn: Spawn) {
        self.push(Command::Spawn(spawn));
    }

    pub fn explode(&mut self, pos: Vec2, blast: Blast, faction: Faction) {
        self.push(Command::Explode {
            pos,
            blast,
            faction,
        });
    }

    pub fn play(&mut self, effect: SoundEffect, pos: Vec2) {
        self.push(Command::PlaySound { effect, pos });
    }
}

/// The closed set of unit behaviours.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Drone(Drone),
    Rocket(Rocket),
    Grenade(Grenade),
    Jet(Jet),
    Soldier(Soldier),
    Structure(Structure),
    Explosion(Explosion),
    Crater(Crater),
}

impl Behavior {
    /// Advance one tick. The only place unit state changes.
    pub fn update(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        match self {
            Behavior::Drone(d) => d.update(body, ctx),
            Behavior::Rocket(r) => r.update(body, ctx),
            Behavior::Grenade(g) => g.update(body, ctx),
            Behavior::Jet(j) => j.update(body, ctx),
            Behavior::Soldier(s) => s.update(body, ctx),
            Behavior::Structure(s) => s.update(body, ctx),
            Behavior::Explosion(e) => e.update(body, ctx.dt),
            Behavior::Crater(_) => {}
        }
    }

    /// Apply damage from `faction`. Friendly fire never lands.
    pub fn damage(&mut self, body: &mut Body, amount: f32, faction: Faction) {
        if faction == body.faction || !body.alive {
            return;
        }
        match self {
            Behavior::Soldier(_) => {
                body.health.take_damage(amount);
                if body.health.is_dead() {
                    body.kill();
                }
            }
            Behavior::Structure(s) => s.on_damage(body, amount),
            Behavior::Drone(_)
            | Behavior::Rocket(_)
            | Behavior::Grenade(_)
            | Behavior::Jet(_)
            | Behavior::Explosion(_)
            | Behavior::Crater(_) => {}
        }
    }

    pub fn heal(&mut self, body: &mut Body, amount: f32) {
        if !body.alive {
            return;
        }
        body.health.heal(amount);
        if let Behavior::Structure(s) = self {
            s.on_heal();
        }
    }

    /// Draw hook for one pass. Reads state only.
    pub fn draw(&self, body: &Body, pass: DrawPass, canvas: &mut dyn Canvas, offset: Vec2) {
        match self {
            Behavior::Drone(d) => d.draw(body, pass, canvas, offset),
            Behavior::Rocket(r) => r.draw(body, pass, canvas, offset),
            Behavior::Grenade(g) => g.draw(body, pass, canvas, offset),
            Behavior::Jet(j) => j.draw(body, pass, canvas, offset),
            Behavior::Soldier(s) => s.draw(body, pass, canvas, offset),
            Behavior::Structure(s) => s.draw(body, pass, canvas, offset),
            Behavior::Explosion(e) => e.draw(body, pass, canvas, offset),
            Behavior::Crater(c) => c.draw(body, pass, canvas, offset),
        }
    }

    pub fn as_drone(&self) -> Option<&Drone> {
        match self {
            Behavior::Drone(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_drone_mut(&mut self) -> Option<&mut Drone> {
        match self {
            Behavior::Drone(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_deployer_mut(&mut self) -> Option<&mut Deployer> {
        match self {
            Behavior::Structure(Structure {
                kind: StructureKind::DroneDeployer(d),
                ..
            }) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use rand::SeedableRng;

    /// A world plus index that unit tests can populate and update against.
    pub struct Harness {
        pub world: World,
        pub spatial: SpatialIndex,
        pub rng: StdRng,
        pub commands: Vec<Command>,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                world: World::new(),
                spatial: SpatialIndex::new(100, 100),
                rng: StdRng::seed_from_u64(42),
                commands: Vec::new(),
            }
        }

        pub fn add(&mut self, body: Body, behavior: Behavior) -> Entity {
            let e = self.world.spawn((body, behavior));
            self.spatial.add(crate::level::cell_of(body.pos), e);
            e
        }

        pub fn kill(&mut self, e: Entity) {
            if let Ok(mut body) = self.world.get::<&mut Body>(e) {
                body.kill();
            }
        }

        pub fn set_health(&mut self, e: Entity, current: f32) {
            if let Ok(mut body) = self.world.get::<&mut Body>(e) {
                body.health.current = current;
            }
        }

        /// Run `f` with a context over this harness.
        pub fn with_ctx<R>(&mut self, dt: f32, f: impl FnOnce(&mut UpdateContext<'_>) -> R) -> R {
            let mut ctx = UpdateContext {
                dt,
                world: &self.world,
                spatial: &self.spatial,
                bounds: Vec2::splat(3200.0),
                rng: &mut self.rng,
                commands: &mut self.commands,
            };
            f(&mut ctx)
        }

        pub fn take_commands(&mut self) -> Vec<Command> {
            std::mem::take(&mut self.commands)
        }
    }

    pub fn soldier_body(pos: Vec2) -> Body {
        Body::new(pos, Faction::Cpu, Capabilities::SOLDIER, soldier::MAX_HEALTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_reports_only_first_transition() {
        let mut body = Body::new(Vec2::ZERO, Faction::Player, Capabilities::NONE, 10.0);
        assert!(body.kill());
        assert!(!body.kill());
        assert!(!body.alive);
    }

    #[test]
    fn friendly_fire_never_lands() {
        let mut soldier = Behavior::Soldier(Soldier::new(false));
        let mut body = test_support::soldier_body(Vec2::ZERO);
        soldier.damage(&mut body, 1000.0, Faction::Cpu);
        assert_eq!(body.health.current, soldier::MAX_HEALTH);
        assert!(body.alive);

        let mut core = Behavior::Structure(Structure::new(StructureKind::ComputeCore, 1.0));
        let mut core_body = Body::new(Vec2::ZERO, Faction::Player, Capabilities::COMPUTE_CORE, 1000.0);
        core.damage(&mut core_body, 400.0, Faction::Player);
        assert_eq!(core_body.health.current, 1000.0);
    }

    #[test]
    fn heal_is_clamped_for_every_behaviour() {
        let behaviours = [
            Behavior::Soldier(Soldier::new(true)),
            Behavior::Structure(Structure::new(StructureKind::Wall, 1.0)),
            Behavior::Crater(Crater),
        ];
        for mut b in behaviours {
            let mut body = Body::new(Vec2::ZERO, Faction::Player, Capabilities::NONE, 50.0);
            body.health.current = 10.0;
            b.heal(&mut body, 1e6);
            assert_eq!(body.health.current, 50.0);
        }
    }

    #[test]
    fn enemy_damage_kills_soldier() {
        let mut soldier = Behavior::Soldier(Soldier::new(false));
        let mut body = test_support::soldier_body(Vec2::ZERO);
        soldier.damage(&mut body, 25.0, Faction::Player);
        assert!(body.alive);
        soldier.damage(&mut body, 25.0, Faction::Player);
        assert!(!body.alive);
        assert_eq!(body.health.current, 0.0);
    }

    #[test]
    fn nearest_within_ignores_dead_and_far_units() {
        let mut h = test_support::Harness::new();
        let near = h.add(test_support::soldier_body(Vec2::new(110.0, 100.0)), Behavior::Soldier(Soldier::new(false)));
        let dead = h.add(test_support::soldier_body(Vec2::new(101.0, 100.0)), Behavior::Soldier(Soldier::new(false)));
        h.add(test_support::soldier_body(Vec2::new(900.0, 100.0)), Behavior::Soldier(Soldier::new(false)));
        h.kill(dead);

        let found = h.with_ctx(0.1, |ctx| ctx.nearest_within(Vec2::new(100.0, 100.0), 300.0, |b| b.capabilities.is_soldier()));
        assert_eq!(found.map(|(e, _)| e), Some(near));
    }
}
