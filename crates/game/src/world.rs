//! The simulation: owns every unit and advances the game one tick at a time.
//!
//! A tick runs in a fixed order: camera, wind, production, waves, then every
//! unit that was alive when the tick began, then the end-of-tick sweep that
//! purges dead units from the index and the world.

use engine_core::{Capabilities, Faction};
use glam::{IVec2, Vec2};
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ambience::Wind;
use crate::camera::{Camera, Controls};
use crate::config::GameConfig;
use crate::economy::{
    BuildError, Buildable, Economy, PlaceError, COMPUTE_PER_CORE, SILICON_PER_REFINERY,
};
use crate::hud::Hud;
use crate::level::{self, cell_of, cell_origin, Level, FLOOR_TILE};
use crate::render::{self, Canvas};
use crate::sfx::{SoundEffect, Sfx};
use crate::spatial::SpatialIndex;
use crate::units::projectile::projectile_body;
use crate::units::{
    Blast, Body, Behavior, Command, Crater, Drone, DroneState, Explosion, Grenade, Jet, Rocket,
    Soldier, Spawn, Structure, StructureKind, UpdateContext, BUILDING_CENTER,
};
use crate::waves::{WaveDirector, WaveSpawn};

/// Soldiers appear this far from the main compute core.
pub const SOLDIER_SPAWN_DISTANCE: f32 = 300.0;
/// Jets cross the main core's row within this many pixels.
const JET_SPREAD: f32 = 100.0;

pub struct Simulation {
    pub world: World,
    /// Every unit in spawn order. Owns nothing; the world does.
    units: Vec<Entity>,
    pub spatial: SpatialIndex,
    pub level: Level,
    pub economy: Economy,
    pub waves: WaveDirector,
    pub camera: Camera,
    pub controls: Controls,
    rng: StdRng,
    elapsed: f32,
    max_step: f32,
    main_core: Option<Entity>,
    sfx: Option<Sfx>,
    wind: Wind,
    commands: Vec<Command>,
}

impl Simulation {
    /// Build a simulation over `level`, turning its unit-bearing structure
    /// codes into live units.
    pub fn new(level: Level, config: &GameConfig, mut sfx: Option<Sfx>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let wind = sfx.as_mut().map(Wind::start).unwrap_or_default();

        let mut sim = Self {
            world: World::new(),
            units: Vec::new(),
            spatial: SpatialIndex::new(level.width(), level.height()),
            level,
            economy: Economy::new(config.starting_silicon),
            waves: WaveDirector::new(),
            camera: Camera::new(Vec2::new(500.0, 500.0), config.view_size()),
            controls: Controls::default(),
            rng,
            elapsed: 0.0,
            max_step: config.max_frame_delta,
            main_core: None,
            sfx,
            wind,
            commands: Vec::new(),
        };
        sim.populate_from_level();
        if let Some(core) = sim.main_core_body() {
            sim.camera.look_at(core.pos + BUILDING_CENTER);
        }
        sim
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Units alive at the end of the last tick (plus anything spawned since).
    pub fn units(&self) -> &[Entity] {
        &self.units
    }

    pub fn main_core(&self) -> Option<Entity> {
        self.main_core
    }

    pub fn sfx(&self) -> Option<&Sfx> {
        self.sfx.as_ref()
    }

    pub fn body(&self, entity: Entity) -> Option<Body> {
        self.world.get::<&Body>(entity).ok().map(|b| *b)
    }

    pub fn behavior(&self, entity: Entity) -> Option<Behavior> {
        self.world.get::<&Behavior>(entity).ok().map(|b| (*b).clone())
    }

    fn main_core_body(&self) -> Option<Body> {
        self.main_core
            .and_then(|e| self.body(e))
            .filter(|b| b.alive)
    }

    /// The game is over once the main compute core is gone.
    pub fn is_lost(&self) -> bool {
        self.main_core_body().is_none()
    }

    // ── Spawning ────────────────────────────────────────────────────────

    fn spawn(&mut self, body: Body, behavior: Behavior) -> Entity {
        let entity = self.world.spawn((body, behavior));
        self.spatial.add(cell_of(body.pos), entity);
        self.units.push(entity);
        entity
    }

    pub fn spawn_structure(&mut self, kind: StructureKind, cell: IVec2) -> Entity {
        let anim_speed = self.rng.gen_range(0.8..=1.2);
        let structure = Structure::new(kind, anim_speed);
        let body = structure.body(cell_origin(cell));
        log::debug!("Spawned {} at {:?}", structure.kind.name(), cell);
        self.spawn(body, Behavior::Structure(structure))
    }

    pub fn spawn_soldier(&mut self, pos: Vec2, grenadier: bool) -> Entity {
        let body = Body::new(
            pos,
            Faction::Cpu,
            Capabilities::SOLDIER,
            crate::units::soldier::MAX_HEALTH,
        );
        self.spawn(body, Behavior::Soldier(Soldier::new(grenadier)))
    }

    pub fn spawn_jet(&mut self, from: Vec2, target: Vec2) -> Entity {
        self.spawn(
            projectile_body(from, Faction::Cpu),
            Behavior::Jet(Jet::new(from, target)),
        )
    }

    /// Drone parked on `deployer`'s pad.
    pub fn spawn_drone(&mut self, deployer: Entity, pos: Vec2, repair: bool) -> Entity {
        let drone = self.spawn(
            Body::new(pos, Faction::Player, Capabilities::NONE, 1.0),
            Behavior::Drone(Drone::new(deployer, repair)),
        );
        if let Ok(mut behavior) = self.world.get::<&mut Behavior>(deployer) {
            if let Some(pad) = behavior.as_deployer_mut() {
                pad.drone = Some(drone);
            }
        }
        drone
    }

    fn apply_spawn(&mut self, source: Entity, spawn: Spawn) {
        match spawn {
            Spawn::Rocket { pos, target, speed } => {
                let faction = self.body(source).map_or(Faction::Player, |b| b.faction);
                self.spawn(
                    projectile_body(pos, faction),
                    Behavior::Rocket(Rocket::new(target, speed)),
                );
            }
            Spawn::Grenade {
                pos,
                target,
                faction,
                fuse,
            } => {
                let grenade = Grenade::new(pos, target, fuse, &mut self.rng);
                self.spawn(projectile_body(pos, faction), Behavior::Grenade(grenade));
            }
            Spawn::Drone { pos, repair } => {
                self.spawn_drone(source, pos, repair);
            }
        }
    }

    fn spawn_wave(&mut self, spawn: WaveSpawn) {
        let Some(core) = self.main_core_body() else {
            return;
        };
        let target = core.pos + BUILDING_CENTER;
        match spawn {
            WaveSpawn::Soldier { grenadier } => {
                let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
                let pos = target + Vec2::from_angle(angle) * SOLDIER_SPAWN_DISTANCE;
                self.spawn_soldier(pos, grenadier);
            }
            WaveSpawn::Jet { from_left } => {
                let width = self.level.pixel_size().x;
                let x = if from_left { 1.0 } else { width - 1.0 };
                let y = target.y + self.rng.gen_range(-JET_SPREAD..=JET_SPREAD);
                self.spawn_jet(Vec2::new(x, y), target);
            }
        }
    }

    /// Turn unit-bearing level codes into units and clear them from the
    /// grid. The first compute core found becomes the main core; a level
    /// without one gets a core in its centre.
    pub fn populate_from_level(&mut self) {
        let placements: Vec<_> = self
            .level
            .structures()
            .filter(|(_, s)| s.is_unit())
            .collect();

        for (cell, structure) in placements {
            let kind = match structure {
                level::Structure::Wall => StructureKind::Wall,
                level::Structure::ComputeCore => StructureKind::ComputeCore,
                level::Structure::SiliconRefinery => StructureKind::SiliconRefinery,
                level::Structure::DroneDeployer => StructureKind::drone_deployer(false),
                _ => continue,
            };
            self.level.set_structure(cell, None);
            let is_core = kind == StructureKind::ComputeCore;
            let entity = self.spawn_structure(kind, cell);
            if is_core && self.main_core.is_none() {
                self.main_core = Some(entity);
            }
        }

        if self.main_core.is_none() {
            let center = IVec2::new(self.level.width() / 2, self.level.height() / 2);
            log::info!("Level has no compute core, placing one at {:?}", center);
            self.main_core = Some(self.spawn_structure(StructureKind::ComputeCore, center));
        }
        log::info!("Level populated with {} units", self.units.len());
    }

    // ── Tick ────────────────────────────────────────────────────────────

    /// Advance the whole game by `dt` seconds (clamped to the step cap).
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, self.max_step);
        self.elapsed += dt;

        self.camera.update(self.controls, dt);
        self.wind
            .update(self.elapsed, &mut self.rng, self.sfx.as_ref().map(Sfx::mixer));

        let compute_rate = self.compute_rate();
        let silicon_rate = self.silicon_rate();
        self.economy.tick(dt, compute_rate, silicon_rate);

        for spawn in self.waves.update(self.elapsed, dt, &mut self.rng) {
            self.spawn_wave(spawn);
        }

        self.update_units(dt);
        self.sweep();

        if let Some(sfx) = &self.sfx {
            sfx.collect_finished();
        }
    }

    /// Update every unit alive at the start of the pass. Units spawned
    /// during the pass wait for the next tick.
    fn update_units(&mut self, dt: f32) {
        let bounds = self.level.pixel_size();
        let snapshot = self.units.clone();

        for entity in snapshot {
            let Ok((body, behavior)) = self.world.query_one_mut::<(&Body, &Behavior)>(entity)
            else {
                continue;
            };
            if !body.alive {
                continue;
            }
            let mut body = *body;
            let mut behavior = behavior.clone();
            let before = body.pos;

            let mut ctx = UpdateContext {
                dt,
                world: &self.world,
                spatial: &self.spatial,
                bounds,
                rng: &mut self.rng,
                commands: &mut self.commands,
            };
            behavior.update(&mut body, &mut ctx);

            if let Ok((stored_body, stored_behavior)) =
                self.world.query_one_mut::<(&mut Body, &mut Behavior)>(entity)
            {
                *stored_body = body;
                *stored_behavior = behavior;
            }
            self.spatial.relocate(entity, before, body.pos);

            for command in std::mem::take(&mut self.commands) {
                self.apply(entity, command);
            }
        }
    }

    /// Carry out one command queued by `source`.
    fn apply(&mut self, source: Entity, command: Command) {
        match command {
            Command::Spawn(spawn) => self.apply_spawn(source, spawn),
            Command::Damage {
                target,
                amount,
                faction,
            } => self.damage(target, amount, faction),
            Command::Heal { target, amount } => self.heal(target, amount),
            Command::Explode {
                pos,
                blast,
                faction,
            } => self.explode(pos, blast, faction),
            Command::AssignDroneTarget { drone, target } => {
                if let Ok(mut behavior) = self.world.get::<&mut Behavior>(drone) {
                    if let Some(drone) = behavior.as_drone_mut() {
                        if drone.state == DroneState::Wait {
                            drone.target = Some(target);
                        }
                    }
                }
            }
            Command::DroneLaunched { deployer } => {
                if let Ok(mut behavior) = self.world.get::<&mut Behavior>(deployer) {
                    if let Some(pad) = behavior.as_deployer_mut() {
                        pad.available = pad.available.saturating_sub(1);
                    }
                }
            }
            Command::DroneDocked { deployer } => {
                if let Ok(mut behavior) = self.world.get::<&mut Behavior>(deployer) {
                    if let Some(pad) = behavior.as_deployer_mut() {
                        pad.available += 1;
                    }
                }
            }
            Command::PlaySound { effect, pos } => self.play_at(effect, pos),
        }
    }

    /// Remove dead units from the index and the world.
    fn sweep(&mut self) {
        let dead: Vec<(Entity, Vec2)> = self
            .world
            .query::<&Body>()
            .iter()
            .filter(|(_, body)| !body.alive)
            .map(|(entity, body)| (entity, body.pos))
            .collect();

        for (entity, pos) in dead {
            self.spatial.remove(cell_of(pos), entity);
            // The handle came from the query above, so it is still spawned.
            let _ = self.world.despawn(entity);
        }
        let world = &self.world;
        self.units.retain(|&e| world.contains(e));
    }

    // ── Interactions ────────────────────────────────────────────────────

    pub fn damage(&mut self, target: Entity, amount: f32, faction: Faction) {
        if let Ok((body, behavior)) = self.world.query_one_mut::<(&mut Body, &mut Behavior)>(target)
        {
            behavior.damage(body, amount, faction);
        }
    }

    pub fn heal(&mut self, target: Entity, amount: f32) {
        if let Ok((body, behavior)) = self.world.query_one_mut::<(&mut Body, &mut Behavior)>(target)
        {
            behavior.heal(body, amount);
        }
    }

    /// Damage everything in the blast radius, show the flash, scorch the
    /// floor and make some noise.
    pub fn explode(&mut self, pos: Vec2, blast: Blast, faction: Faction) {
        let radius = blast.radius();
        let world = &self.world;
        let victims: Vec<Entity> = self
            .spatial
            .candidates(pos, radius)
            .filter(|&e| {
                world
                    .get::<&Body>(e)
                    .is_ok_and(|b| b.alive && b.in_radius(pos, radius))
            })
            .collect();
        for victim in victims {
            self.damage(victim, blast.damage(), faction);
        }

        self.spawn(
            Body::new(pos, faction, Capabilities::NONE, 1.0),
            Behavior::Explosion(Explosion::default()),
        );

        let cell = cell_of(pos);
        if self.level.contains(cell) && self.level.structure(cell).is_none() && !self.has_crater(cell) {
            self.spawn(
                Body::new(pos, Faction::Player, Capabilities::CRATER, 1.0),
                Behavior::Crater(Crater),
            );
        }

        self.play_at(SoundEffect::Explosion, pos);
    }

    fn has_crater(&self, cell: IVec2) -> bool {
        self.spatial
            .query(cell)
            .iter()
            .any(|&e| self.body(e).is_some_and(|b| b.capabilities.is_crater()))
    }

    fn play_at(&mut self, effect: SoundEffect, pos: Vec2) {
        if let Some(sfx) = &mut self.sfx {
            let pan = self.camera.pan(pos.x);
            sfx.play(effect, pan, &mut self.rng);
        }
    }

    // ── Economy ─────────────────────────────────────────────────────────

    fn count_live(&self, wanted: Capabilities) -> usize {
        self.world
            .query::<&Body>()
            .iter()
            .filter(|(_, b)| b.alive && b.capabilities.contains(wanted))
            .count()
    }

    /// Compute generated per second by live compute cores.
    pub fn compute_rate(&self) -> f32 {
        self.count_live(Capabilities::COMPUTE_CORE) as f32 * COMPUTE_PER_CORE
    }

    pub fn silicon_rate(&self) -> f32 {
        self.count_live(Capabilities::SILICON_REFINERY) as f32 * SILICON_PER_REFINERY
    }

    pub fn start_build(&mut self, item: Buildable) -> Result<(), BuildError> {
        self.economy.start_build(item)
    }

    /// Place one ready unit of `item` in `cell`. Floors go into the level's
    /// tile layer and return no entity.
    pub fn place(&mut self, item: Buildable, cell: IVec2) -> Result<Option<Entity>, PlaceError> {
        if !self.level.contains(cell) {
            return Err(PlaceError::OutOfBounds);
        }
        if item != Buildable::Floor && self.is_occupied(cell) {
            return Err(PlaceError::Occupied);
        }
        self.economy.take_ready(item)?;

        let kind = match item {
            Buildable::Floor => {
                self.level.set_tile(cell, FLOOR_TILE);
                return Ok(None);
            }
            Buildable::Wall => StructureKind::Wall,
            Buildable::ComputeCore => StructureKind::ComputeCore,
            Buildable::SiliconRefinery => StructureKind::SiliconRefinery,
            Buildable::DroneDeployer => StructureKind::drone_deployer(false),
            Buildable::RepairDeployer => StructureKind::drone_deployer(true),
        };
        log::info!("Placed {} at {:?}", item.name(), cell);
        Ok(Some(self.spawn_structure(kind, cell)))
    }

    fn is_occupied(&self, cell: IVec2) -> bool {
        let blocked_by_level = self
            .level
            .structure(cell)
            .is_some_and(|s| s != level::Structure::Crater);
        blocked_by_level
            || self.spatial.query(cell).iter().any(|&e| {
                self.body(e)
                    .is_some_and(|b| b.alive && b.capabilities.is_player_structure())
            })
    }

    // ── Presentation ────────────────────────────────────────────────────

    pub fn hud(&self) -> Hud {
        Hud {
            silicon: self.economy.silicon,
            compute_rate: self.compute_rate(),
            wave: self.waves.next_wave(),
            wave_countdown: self.waves.countdown(self.elapsed),
        }
    }

    /// Draw the visible world and the HUD.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        render::draw_world(canvas, &self.world, &self.level, &self.spatial, &self.camera);
        self.hud().draw(canvas, &self.economy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingCanvas;
    use crate::render::SpriteId;
    use crate::units::SoldierState;

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(1234),
            ..GameConfig::default()
        }
    }

    fn empty_sim() -> Simulation {
        Simulation::new(Level::new(100, 100), &config(), None)
    }

    fn count(sim: &Simulation, pred: impl Fn(&Behavior) -> bool) -> usize {
        sim.units()
            .iter()
            .filter(|&&e| sim.behavior(e).is_some_and(|b| pred(&b)))
            .count()
    }

    #[test]
    fn level_codes_become_units() {
        let mut level = Level::new(20, 20);
        level.set_structure(IVec2::new(3, 3), Some(level::Structure::Wall));
        level.set_structure(IVec2::new(5, 5), Some(level::Structure::ComputeCore));
        level.set_structure(IVec2::new(7, 7), Some(level::Structure::House));
        let sim = Simulation::new(level, &config(), None);

        assert_eq!(sim.units().len(), 2);
        assert_eq!(sim.level.structure(IVec2::new(3, 3)), None);
        assert_eq!(sim.level.structure(IVec2::new(7, 7)), Some(level::Structure::House));
        let core = sim.body(sim.main_core().unwrap()).unwrap();
        assert_eq!(core.pos, Vec2::new(160.0, 160.0));
        assert!(!sim.is_lost());
    }

    #[test]
    fn empty_level_gets_a_central_core() {
        let sim = empty_sim();
        let core = sim.body(sim.main_core().unwrap()).unwrap();
        assert_eq!(core.pos, Vec2::new(1600.0, 1600.0));
        assert!(core.capabilities.is_compute_core());
        assert_eq!(sim.compute_rate(), 1.0);
    }

    #[test]
    fn units_spawned_mid_tick_wait_for_the_next_one() {
        let mut sim = empty_sim();
        // Right over its target, so the first update drops a grenade.
        sim.spawn_jet(Vec2::new(600.0, 600.0), Vec2::new(640.0, 600.0));
        sim.tick(0.05);

        let grenades: Vec<_> = sim
            .units()
            .iter()
            .filter_map(|&e| match sim.behavior(e) {
                Some(Behavior::Grenade(g)) => Some(g),
                _ => None,
            })
            .collect();
        assert_eq!(grenades.len(), 1);
        assert_eq!(grenades[0].time, crate::units::jet::DROPPED_FUSE);
    }

    #[test]
    fn explosion_hurts_enemies_and_scorches_once() {
        let mut sim = empty_sim();
        let near = sim.spawn_soldier(Vec2::new(400.0, 400.0), false);
        let far = sim.spawn_soldier(Vec2::new(460.0, 400.0), false);

        sim.explode(Vec2::new(410.0, 400.0), Blast::Small, Faction::Player);
        sim.explode(Vec2::new(405.0, 402.0), Blast::Small, Faction::Player);

        assert!(!sim.body(near).unwrap().alive);
        assert_eq!(sim.body(far).unwrap().health.current, 40.0);
        assert_eq!(count(&sim, |b| matches!(b, Behavior::Crater(_))), 1);
        assert_eq!(count(&sim, |b| matches!(b, Behavior::Explosion(_))), 2);

        sim.tick(0.1);
        assert!(sim.body(near).is_none());
        assert!(!sim.spatial.query(cell_of(Vec2::new(400.0, 400.0))).contains(&near));
    }

    #[test]
    fn explosions_never_hurt_their_own_side() {
        let mut sim = empty_sim();
        let core = sim.main_core().unwrap();
        sim.explode(Vec2::new(1616.0, 1616.0), Blast::Large, Faction::Player);
        assert_eq!(sim.body(core).unwrap().health.current, 1000.0);

        sim.explode(Vec2::new(1616.0, 1616.0), Blast::Large, Faction::Cpu);
        assert_eq!(sim.body(core).unwrap().health.current, 950.0);
    }

    #[test]
    fn no_crater_on_level_structures() {
        let mut level = Level::new(20, 20);
        level.set_structure(IVec2::new(2, 2), Some(level::Structure::House));
        let mut sim = Simulation::new(level, &config(), None);
        sim.explode(Vec2::new(80.0, 80.0), Blast::Large, Faction::Cpu);
        assert_eq!(count(&sim, |b| matches!(b, Behavior::Crater(_))), 0);
    }

    #[test]
    fn placement_needs_a_ready_unit_and_a_free_cell() {
        let mut sim = empty_sim();
        let cell = IVec2::new(10, 10);
        assert_eq!(
            sim.place(Buildable::Wall, cell),
            Err(PlaceError::NothingReady(Buildable::Wall))
        );

        sim.start_build(Buildable::Wall).unwrap();
        sim.start_build(Buildable::Wall).unwrap();
        for _ in 0..50 {
            sim.tick(0.1);
        }
        assert_eq!(sim.economy.item(Buildable::Wall).ready, 2);

        assert_eq!(sim.place(Buildable::Wall, IVec2::new(-1, 0)), Err(PlaceError::OutOfBounds));
        let wall = sim.place(Buildable::Wall, cell).unwrap().unwrap();
        assert_eq!(sim.body(wall).unwrap().pos, Vec2::new(320.0, 320.0));
        assert_eq!(sim.place(Buildable::Wall, cell), Err(PlaceError::Occupied));
        assert_eq!(sim.economy.item(Buildable::Wall).ready, 1);
    }

    #[test]
    fn floors_go_into_the_tile_layer() {
        let mut sim = empty_sim();
        sim.start_build(Buildable::Floor).unwrap();
        for _ in 0..10 {
            sim.tick(0.1);
        }
        assert_eq!(sim.place(Buildable::Floor, IVec2::new(4, 4)), Ok(None));
        assert_eq!(sim.level.tile(IVec2::new(4, 4)), FLOOR_TILE);
    }

    #[test]
    fn deployer_drone_shoots_down_an_approaching_soldier() {
        let mut sim = empty_sim();
        let pad = sim.spawn_structure(StructureKind::drone_deployer(false), IVec2::new(10, 10));
        let soldier = sim.spawn_soldier(Vec2::new(500.0, 336.0), false);

        let mut launched = false;
        for _ in 0..200 {
            sim.tick(0.05);
            let drone = match sim.behavior(pad) {
                Some(Behavior::Structure(Structure {
                    kind: StructureKind::DroneDeployer(d),
                    ..
                })) => d.drone,
                _ => None,
            };
            if let Some(Behavior::Drone(d)) = drone.and_then(|e| sim.behavior(e)) {
                launched |= d.state != DroneState::Wait;
            }
        }
        assert!(launched);
        assert!(sim.body(soldier).is_none(), "soldier survived");
    }

    #[test]
    fn losing_the_main_core_loses_the_game() {
        let mut sim = empty_sim();
        let core = sim.main_core().unwrap();
        sim.damage(core, 5000.0, Faction::Cpu);
        assert!(!sim.is_lost());
        sim.tick(0.1);
        assert!(sim.is_lost());
        assert!(count(&sim, |b| matches!(b, Behavior::Explosion(_))) >= 1);
    }

    #[test]
    fn waves_march_soldiers_on_the_core() {
        let mut sim = empty_sim();
        for _ in 0..100 {
            sim.tick(0.1);
        }
        let soldiers: Vec<_> = sim
            .units()
            .iter()
            .copied()
            .filter(|&e| matches!(sim.behavior(e), Some(Behavior::Soldier(_))))
            .collect();
        assert!(!soldiers.is_empty());
        for soldier in soldiers {
            let Some(Behavior::Soldier(s)) = sim.behavior(soldier) else {
                unreachable!()
            };
            assert_eq!(s.state, SoldierState::Run);
            assert_eq!(s.target, sim.main_core());
        }
    }

    #[test]
    fn draw_covers_world_and_hud() {
        let sim = empty_sim();
        let mut canvas = RecordingCanvas::default();
        sim.draw(&mut canvas);
        assert!(canvas.sprites().any(|s| matches!(s, SpriteId::Building { .. })));
        assert!(canvas.calls.iter().any(|c| matches!(
            c,
            crate::render::recording::DrawCall::Text(t) if t.contains("GFlops")
        )));
    }
}
