//! Game configuration (media, level, viewport, audio). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Directory that sound paths are resolved against.
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
    /// Level grid file (raw tile + structure arrays).
    #[serde(default = "default_level_path")]
    pub level_path: PathBuf,
    /// Level size in cells.
    #[serde(default = "default_level_size")]
    pub level_width: i32,
    #[serde(default = "default_level_size")]
    pub level_height: i32,
    /// Window size in physical pixels.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    /// Physical pixels per world pixel.
    #[serde(default = "default_pixel_scale")]
    pub pixel_scale: f32,
    /// Longest simulation step in seconds.
    #[serde(default = "default_max_frame_delta")]
    pub max_frame_delta: f32,
    /// Master volume (0.0 to 1.0).
    #[serde(default = "default_master_volume")]
    pub master_volume: f32,
    /// Silicon available when the game starts.
    #[serde(default = "default_starting_silicon")]
    pub starting_silicon: f32,
    /// Fixed RNG seed. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    /// How long the headless loop runs, in seconds.
    #[serde(default = "default_run_seconds")]
    pub run_seconds: f32,
    /// Mixer rate used when no device reports one.
    #[serde(default = "default_output_rate")]
    pub output_rate: u32,
    /// Frames per buffer for the headless output.
    #[serde(default = "default_buffer_frames")]
    pub buffer_frames: usize,
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("media")
}
fn default_level_path() -> PathBuf {
    PathBuf::from("media/level.dat")
}
fn default_level_size() -> i32 {
    100
}
fn default_viewport_width() -> u32 {
    1280
}
fn default_viewport_height() -> u32 {
    720
}
fn default_pixel_scale() -> f32 {
    2.0
}
fn default_max_frame_delta() -> f32 {
    0.1
}
fn default_master_volume() -> f32 {
    1.0
}
fn default_starting_silicon() -> f32 {
    100.0
}
fn default_run_seconds() -> f32 {
    120.0
}
fn default_output_rate() -> u32 {
    audio::DEFAULT_OUTPUT_RATE
}
fn default_buffer_frames() -> usize {
    1024
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            media_dir: default_media_dir(),
            level_path: default_level_path(),
            level_width: default_level_size(),
            level_height: default_level_size(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            pixel_scale: default_pixel_scale(),
            max_frame_delta: default_max_frame_delta(),
            master_volume: default_master_volume(),
            starting_silicon: default_starting_silicon(),
            seed: None,
            run_seconds: default_run_seconds(),
            output_rate: default_output_rate(),
            buffer_frames: default_buffer_frames(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::info!("No config at {:?}, using defaults", path),
        }
        Self::default()
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }

    /// Visible world area in world pixels.
    pub fn view_size(&self) -> glam::Vec2 {
        let scale = self.pixel_scale.max(f32::EPSILON);
        glam::Vec2::new(
            self.viewport_width as f32 / scale,
            self.viewport_height as f32 / scale,
        )
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: GameConfig = ron::from_str("(starting_silicon: 5.0, seed: Some(7))").unwrap();
        assert_eq!(config.starting_silicon, 5.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.level_width, 100);
        assert_eq!(config.max_frame_delta, 0.1);
    }

    #[test]
    fn invalid_file_yields_defaults() {
        let path = std::env::temp_dir().join(format!("tgm-config-{}.ron", std::process::id()));
        std::fs::write(&path, "(starting_silicon: \"lots\")").unwrap();
        let config = GameConfig::load_from(&path);
        assert_eq!(config.starting_silicon, 100.0);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let path = std::env::temp_dir().join(format!("tgm-config-save-{}.ron", std::process::id()));
        let config = GameConfig {
            run_seconds: 3.5,
            ..GameConfig::default()
        };
        config.save_to(&path);
        assert_eq!(GameConfig::load_from(&path).run_seconds, 3.5);
    }

    #[test]
    fn view_size_divides_by_pixel_scale() {
        let config = GameConfig::default();
        assert_eq!(config.view_size(), glam::Vec2::new(640.0, 360.0));
    }
}
