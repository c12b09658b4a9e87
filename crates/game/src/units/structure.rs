//! Player buildings: compute cores, silicon refineries, drone deployers, walls.

use engine_core::{Capabilities, Faction};
use glam::{Vec2, Vec4};
use hecs::Entity;

use super::drone::DOCK_OFFSET;
use super::{Blast, Body, Command, Spawn, UpdateContext, BUILDING_CENTER};
use crate::render::{health_bar, BuildingSprite, Canvas, DrawPass, SpriteId};

/// How long the damage and heal tints stay up.
pub const FLASH_TIME: f32 = 0.5;
/// Seconds between a deployer's target scans.
pub const DEPLOYER_CHECK_INTERVAL: f32 = 3.0;
/// Deployers only send their drone after things this close.
pub const DEPLOYER_RANGE: f32 = 300.0;

/// Drone pad state.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployer {
    pub repair: bool,
    pub drone: Option<Entity>,
    /// Drones sitting on the pad, ready to launch.
    pub available: u32,
    check_timer: f32,
}

impl Deployer {
    pub fn new(repair: bool) -> Self {
        Self {
            repair,
            drone: None,
            available: 1,
            check_timer: DEPLOYER_CHECK_INTERVAL,
        }
    }

    fn update(&mut self, body: &Body, ctx: &mut UpdateContext<'_>) {
        if !ctx.is_alive(self.drone) {
            self.drone = None;
            self.available = 1;
            ctx.spawn(Spawn::Drone {
                pos: body.pos + DOCK_OFFSET,
                repair: self.repair,
            });
        }

        self.check_timer -= ctx.dt;
        if self.check_timer >= 0.0 || self.available == 0 {
            return;
        }
        self.check_timer = DEPLOYER_CHECK_INTERVAL;
        let Some(drone) = self.drone else {
            return;
        };

        let target = if self.repair {
            ctx.nearest_within(body.pos, DEPLOYER_RANGE, |b| {
                b.capabilities.is_player_structure() && !b.health.is_full()
            })
        } else {
            ctx.nearest_within(body.pos, DEPLOYER_RANGE, |b| b.capabilities.is_soldier())
        };
        if let Some((target, _)) = target {
            ctx.push(Command::AssignDroneTarget { drone, target });
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StructureKind {
    ComputeCore,
    SiliconRefinery,
    DroneDeployer(Deployer),
    Wall,
}

impl StructureKind {
    pub fn drone_deployer(repair: bool) -> Self {
        StructureKind::DroneDeployer(Deployer::new(repair))
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            StructureKind::ComputeCore => Capabilities::COMPUTE_CORE,
            StructureKind::SiliconRefinery => Capabilities::SILICON_REFINERY,
            StructureKind::DroneDeployer(_) => Capabilities::DRONE_DEPLOYER,
            StructureKind::Wall => Capabilities::WALL,
        }
    }

    pub fn max_health(&self) -> f32 {
        match self {
            StructureKind::ComputeCore => 1000.0,
            StructureKind::SiliconRefinery => 100.0,
            StructureKind::DroneDeployer(_) => 500.0,
            StructureKind::Wall => 200.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StructureKind::ComputeCore => "compute core",
            StructureKind::SiliconRefinery => "silicon refinery",
            StructureKind::DroneDeployer(d) if d.repair => "repair deployer",
            StructureKind::DroneDeployer(_) => "drone deployer",
            StructureKind::Wall => "wall",
        }
    }

    fn sprite(&self) -> BuildingSprite {
        match self {
            StructureKind::ComputeCore => BuildingSprite::ComputeCore,
            StructureKind::SiliconRefinery => BuildingSprite::SiliconRefinery,
            StructureKind::DroneDeployer(d) if d.repair => BuildingSprite::RepairDeployer,
            StructureKind::DroneDeployer(_) => BuildingSprite::DroneDeployer,
            StructureKind::Wall => BuildingSprite::Wall,
        }
    }

    fn animated(&self) -> bool {
        !matches!(self, StructureKind::Wall)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub kind: StructureKind,
    pub damage_flash: f32,
    pub heal_flash: f32,
    anim: f32,
    anim_speed: f32,
}

impl Structure {
    pub fn new(kind: StructureKind, anim_speed: f32) -> Self {
        Self {
            kind,
            damage_flash: 0.0,
            heal_flash: 0.0,
            anim: 0.0,
            anim_speed,
        }
    }

    /// Body for a freshly built structure with its top-left corner at `pos`.
    pub fn body(&self, pos: Vec2) -> Body {
        Body::new(
            pos,
            Faction::Player,
            self.kind.capabilities(),
            self.kind.max_health(),
        )
    }

    pub fn update(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>) {
        let dt = ctx.dt;
        self.anim += dt * self.anim_speed;
        self.damage_flash = (self.damage_flash - dt).max(0.0);
        self.heal_flash = (self.heal_flash - dt).max(0.0);

        if body.health.is_dead() {
            if body.kill() {
                log::debug!("{} destroyed at {:?}", self.kind.name(), body.pos);
                ctx.explode(body.pos + BUILDING_CENTER, Blast::Large, Faction::Player);
            }
            return;
        }

        if let StructureKind::DroneDeployer(deployer) = &mut self.kind {
            deployer.update(body, ctx);
        }
    }

    pub fn on_damage(&mut self, body: &mut Body, amount: f32) {
        body.health.take_damage(amount);
        self.damage_flash = FLASH_TIME;
    }

    pub fn on_heal(&mut self) {
        self.heal_flash = FLASH_TIME;
    }

    pub fn draw(&self, body: &Body, pass: DrawPass, canvas: &mut dyn Canvas, offset: Vec2) {
        let pos = body.pos - offset;
        match pass {
            DrawPass::Structure => {
                let frame = if self.kind.animated() {
                    (self.anim * 8.0) as u8 % 2
                } else {
                    0
                };
                let tint = if self.heal_flash > 0.0 {
                    Vec4::new(1.0, 1.0, 1.0 + self.heal_flash, 1.0)
                } else {
                    Vec4::new(1.0 + self.damage_flash, 1.0 + self.damage_flash, 1.0, 1.0)
                };
                canvas.draw_sprite(
                    SpriteId::Building {
                        kind: self.kind.sprite(),
                        frame,
                    },
                    pos,
                    tint,
                    false,
                );
            }
            DrawPass::Top if self.damage_flash > 0.0 || self.heal_flash > 0.0 => {
                health_bar(canvas, pos, body.health.percentage());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{DrawCall, RecordingCanvas};
    use crate::units::test_support::{soldier_body, Harness};
    use crate::units::{Behavior, Drone, Soldier};

    fn place(h: &mut Harness, kind: StructureKind, pos: Vec2) -> (Entity, Structure, Body) {
        let structure = Structure::new(kind, 1.0);
        let body = structure.body(pos);
        let e = h.add(body, Behavior::Structure(structure.clone()));
        (e, structure, body)
    }

    #[test]
    fn damage_shows_health_bar_for_half_a_second() {
        let mut h = Harness::new();
        let (_, mut wall, mut body) = place(&mut h, StructureKind::Wall, Vec2::new(64.0, 64.0));
        wall.on_damage(&mut body, 50.0);
        assert_eq!(body.health.current, 150.0);

        let mut canvas = RecordingCanvas::default();
        wall.draw(&body, DrawPass::Top, &mut canvas, Vec2::ZERO);
        assert!(canvas.calls.contains(&DrawCall::Rect(Vec2::new(64.0, 54.0), Vec2::new(24.0, 2.0))));

        for _ in 0..6 {
            h.with_ctx(0.1, |ctx| wall.update(&mut body, ctx));
        }
        let mut canvas = RecordingCanvas::default();
        wall.draw(&body, DrawPass::Top, &mut canvas, Vec2::ZERO);
        assert!(canvas.calls.is_empty());
    }

    #[test]
    fn destroyed_building_explodes_once() {
        let mut h = Harness::new();
        let (_, mut core, mut body) = place(&mut h, StructureKind::ComputeCore, Vec2::new(320.0, 320.0));
        core.on_damage(&mut body, 5000.0);

        for _ in 0..3 {
            h.with_ctx(0.1, |ctx| core.update(&mut body, ctx));
        }
        assert!(!body.alive);
        assert_eq!(
            h.take_commands(),
            vec![Command::Explode {
                pos: Vec2::new(336.0, 336.0),
                blast: Blast::Large,
                faction: Faction::Player,
            }]
        );
    }

    #[test]
    fn deployer_requests_a_drone_when_it_has_none() {
        let mut h = Harness::new();
        let (_, mut pad, body) = place(&mut h, StructureKind::drone_deployer(false), Vec2::new(320.0, 320.0));
        let mut body = body;
        h.with_ctx(0.1, |ctx| pad.update(&mut body, ctx));
        assert_eq!(
            h.take_commands(),
            vec![Command::Spawn(Spawn::Drone {
                pos: Vec2::new(336.0, 336.0),
                repair: false,
            })]
        );
    }

    #[test]
    fn deployer_sends_its_drone_at_nearby_soldiers() {
        let mut h = Harness::new();
        let (pad_entity, mut pad, mut body) =
            place(&mut h, StructureKind::drone_deployer(false), Vec2::new(320.0, 320.0));
        let drone = h.add(
            Body::new(Vec2::new(336.0, 336.0), Faction::Player, Capabilities::NONE, 1.0),
            Behavior::Drone(Drone::new(pad_entity, false)),
        );
        let soldier = h.add(soldier_body(Vec2::new(500.0, 320.0)), Behavior::Soldier(Soldier::new(false)));
        h.add(soldier_body(Vec2::new(1200.0, 320.0)), Behavior::Soldier(Soldier::new(false)));
        if let StructureKind::DroneDeployer(d) = &mut pad.kind {
            d.drone = Some(drone);
        }

        let mut assigned = Vec::new();
        for _ in 0..31 {
            h.with_ctx(0.1, |ctx| pad.update(&mut body, ctx));
            assigned.extend(h.take_commands());
        }
        assert_eq!(assigned, vec![Command::AssignDroneTarget { drone, target: soldier }]);
    }

    #[test]
    fn repair_deployer_picks_damaged_buildings_only() {
        let mut h = Harness::new();
        let (pad_entity, mut pad, mut body) =
            place(&mut h, StructureKind::drone_deployer(true), Vec2::new(320.0, 320.0));
        let drone = h.add(
            Body::new(Vec2::new(336.0, 336.0), Faction::Player, Capabilities::NONE, 1.0),
            Behavior::Drone(Drone::new(pad_entity, true)),
        );
        place(&mut h, StructureKind::Wall, Vec2::new(352.0, 320.0));
        let (hurt, _, _) = place(&mut h, StructureKind::Wall, Vec2::new(480.0, 320.0));
        h.set_health(hurt, 20.0);
        if let StructureKind::DroneDeployer(d) = &mut pad.kind {
            d.drone = Some(drone);
        }

        let mut assigned = Vec::new();
        for _ in 0..31 {
            h.with_ctx(0.1, |ctx| pad.update(&mut body, ctx));
            assigned.extend(h.take_commands());
        }
        assert_eq!(assigned, vec![Command::AssignDroneTarget { drone, target: hurt }]);
    }
}
