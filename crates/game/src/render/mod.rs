//! Draw passes over the visible part of the level.
//!
//! Drawing goes through [`Canvas`], an output-only service supplied by the
//! host. Passes run in [`DrawPass::ALL`] order so ground decals end up under
//! units, units under buildings, and buildings under overlays.

use glam::{IVec2, Vec2, Vec4};
use hecs::World;

use crate::camera::Camera;
use crate::level::{cell_origin, Level, Structure, TILE_SIZE};
use crate::spatial::SpatialIndex;
use crate::units::{Behavior, Body};

pub const WHITE: Vec4 = Vec4::ONE;
pub const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
pub const SHADOW: Vec4 = Vec4::new(0.0, 0.0, 0.0, 0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPass {
    Floor,
    Bottom,
    Structure,
    Top,
}

impl DrawPass {
    pub const ALL: [DrawPass; 4] = [
        DrawPass::Floor,
        DrawPass::Bottom,
        DrawPass::Structure,
        DrawPass::Top,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildingSprite {
    ComputeCore,
    SiliconRefinery,
    DroneDeployer,
    RepairDeployer,
    Wall,
}

/// Sprite regions the host knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    Tile(i32),
    /// Static structure stored in the level grid.
    LevelStructure(Structure),
    Building { kind: BuildingSprite, frame: u8 },
    Soldier(u8),
    Drone(u8),
    Rocket,
    Grenade,
    Jet(u8),
    Explosion(u8),
    Crater,
}

/// Output-only drawing service. Positions are screen pixels (world minus
/// camera offset).
pub trait Canvas {
    fn draw_sprite(&mut self, sprite: SpriteId, pos: Vec2, tint: Vec4, mirrored: bool);
    fn draw_rotated_sprite(&mut self, sprite: SpriteId, pos: Vec2, angle: f32, tint: Vec4);
    fn draw_rect(&mut self, pos: Vec2, size: Vec2, color: Vec4);
    fn draw_text(&mut self, text: &str, pos: Vec2, color: Vec4);
}

/// Health bar above a 32 px wide building.
pub fn health_bar(canvas: &mut dyn Canvas, pos: Vec2, fraction: f32) {
    canvas.draw_rect(pos - Vec2::new(1.0, 11.0), Vec2::new(34.0, 4.0), BLACK);
    canvas.draw_rect(
        pos - Vec2::new(0.0, 10.0),
        Vec2::new(32.0 * fraction.clamp(0.0, 1.0), 2.0),
        Vec4::new(0.0, 0.7, 0.0, 1.0),
    );
}

/// Run all draw passes for the cells the camera can see.
pub fn draw_world(
    canvas: &mut dyn Canvas,
    world: &World,
    level: &Level,
    spatial: &SpatialIndex,
    camera: &Camera,
) {
    let (min, max) = camera.visible_cells();
    let offset = camera.draw_offset();

    for pass in DrawPass::ALL {
        for y in min.y..max.y {
            for x in min.x..max.x {
                let cell = IVec2::new(x, y);
                draw_cell(canvas, pass, cell, offset, level);
                for &entity in spatial.query(cell) {
                    let (Ok(body), Ok(behavior)) =
                        (world.get::<&Body>(entity), world.get::<&Behavior>(entity))
                    else {
                        continue;
                    };
                    if body.alive {
                        behavior.draw(&body, pass, canvas, offset);
                    }
                }
            }
        }
    }
}

fn draw_cell(canvas: &mut dyn Canvas, pass: DrawPass, cell: IVec2, offset: Vec2, level: &Level) {
    let pos = cell_origin(cell) - offset;
    match pass {
        DrawPass::Floor => canvas.draw_sprite(SpriteId::Tile(level.tile(cell)), pos, WHITE, false),
        DrawPass::Structure => {
            if let Some(structure) = level.structure(cell) {
                // Structure sprites are two cells tall and stand on their cell.
                canvas.draw_sprite(
                    SpriteId::LevelStructure(structure),
                    pos - Vec2::new(0.0, TILE_SIZE),
                    WHITE,
                    false,
                );
            }
        }
        DrawPass::Bottom | DrawPass::Top => {}
    }
}
