//! Scrolling top-down camera.

use glam::{IVec2, Vec2};

use crate::level::TILE_SIZE;

/// Acceleration while a direction key is held (world px/s²).
const ACCELERATION: f32 = 3000.0;
/// Velocity halves every `1 / DAMPING` seconds.
const DAMPING: f32 = 15.0;

/// Direction keys currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone)]
pub struct Camera {
    /// Top-left corner of the view in world pixels.
    pub position: Vec2,
    pub velocity: Vec2,
    /// Visible area in world pixels.
    pub view_size: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec2::new(500.0, 500.0), Vec2::new(640.0, 360.0))
    }
}

impl Camera {
    pub fn new(position: Vec2, view_size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            view_size,
        }
    }

    /// Center the view on a world position.
    pub fn look_at(&mut self, target: Vec2) {
        self.position = target - self.view_size * 0.5;
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.view_size * 0.5
    }

    pub fn update(&mut self, controls: Controls, dt: f32) {
        let accel = ACCELERATION * dt;
        if controls.left {
            self.velocity.x -= accel;
        }
        if controls.right {
            self.velocity.x += accel;
        }
        if controls.up {
            self.velocity.y -= accel;
        }
        if controls.down {
            self.velocity.y += accel;
        }

        self.position += self.velocity * dt;
        self.velocity *= 0.5f32.powf(dt * DAMPING);
    }

    /// Pixel-snapped offset subtracted from world positions when drawing.
    pub fn draw_offset(&self) -> Vec2 {
        self.position.floor()
    }

    /// Half-open cell range `[min, max)` covering the view plus a one-cell margin.
    pub fn visible_cells(&self) -> (IVec2, IVec2) {
        let min = (self.position / TILE_SIZE).floor().as_ivec2() - IVec2::ONE;
        let max = ((self.position + self.view_size + Vec2::splat(TILE_SIZE)) / TILE_SIZE)
            .floor()
            .as_ivec2();
        (min, max)
    }

    pub fn in_viewport(&self, pos: Vec2) -> bool {
        let end = self.position + self.view_size;
        pos.x >= self.position.x && pos.y >= self.position.y && pos.x <= end.x && pos.y <= end.y
    }

    /// Stereo pan for a sound at world x.
    pub fn pan(&self, x: f32) -> f32 {
        if self.view_size.x <= 0.0 {
            return 0.0;
        }
        ((x - self.center().x) / self.view_size.x).clamp(-0.5, 0.5)
    }
}
