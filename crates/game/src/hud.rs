//! HUD readouts: resource totals, the wave countdown and the build queue.

use std::fmt;

use glam::{Vec2, Vec4};

use crate::economy::{BuildItem, Economy};
use crate::render::{Canvas, WHITE};

/// The countdown is only shown this close to the next wave.
pub const COUNTDOWN_WINDOW: f32 = 10.0;

const TEXT_SHADOW: Vec4 = Vec4::new(0.0, 0.0, 0.0, 0.5);
const READY_GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
const LINE_HEIGHT: f32 = 10.0;

/// All HUD numbers for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub silicon: f32,
    /// Compute generated per second.
    pub compute_rate: f32,
    /// Number of the next wave.
    pub wave: u32,
    pub wave_countdown: f32,
}

impl fmt::Display for Hud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Silicon | {} GFlops", self.silicon as i64, self.compute_rate)?;
        if self.wave_countdown <= COUNTDOWN_WINDOW {
            write!(f, " Wave {} in {}", self.wave, self.wave_countdown as i64)?;
        }
        Ok(())
    }
}

impl Hud {
    /// Status line plus one line per buildable with work queued or ready.
    pub fn draw(&self, canvas: &mut dyn Canvas, economy: &Economy) {
        shadowed_text(canvas, &self.to_string(), Vec2::new(2.0, 2.0), WHITE);

        let mut pos = Vec2::new(2.0, 2.0 + LINE_HEIGHT * 1.5);
        for item in economy.items() {
            if item.in_progress == 0 && item.ready == 0 {
                continue;
            }
            let color = if item.ready > 0 { READY_GREEN } else { WHITE };
            shadowed_text(canvas, &build_line(item), pos, color);
            pos.y += LINE_HEIGHT;
        }
    }
}

fn build_line(item: &BuildItem) -> String {
    let mut line = item.kind.name().to_string();
    if item.in_progress > 0 {
        line += &format!(
            " {} queued {:.0}%",
            item.in_progress,
            item.progress() * 100.0
        );
    }
    if item.ready > 0 {
        line += &format!(" {} ready", item.ready);
    }
    line
}

fn shadowed_text(canvas: &mut dyn Canvas, text: &str, pos: Vec2, color: Vec4) {
    canvas.draw_text(text, pos + Vec2::ONE, TEXT_SHADOW);
    canvas.draw_text(text, pos, color);
}
