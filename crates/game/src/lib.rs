//! TGM: a real-time tower-defense simulation.
//!
//! The [`Simulation`] owns every unit as a hecs entity and advances them one
//! clamped step at a time. Drawing goes through the [`Canvas`] trait and
//! sound through the `audio` crate's [`audio::Mixer`], so the core runs the
//! same with or without a window or an audio device.

pub mod ambience;
pub mod camera;
pub mod config;
pub mod economy;
pub mod hud;
pub mod level;
pub mod render;
pub mod sfx;
pub mod spatial;
pub mod units;
pub mod waves;
pub mod world;

pub use camera::{Camera, Controls};
pub use config::GameConfig;
pub use economy::{BuildError, Buildable, Economy, PlaceError};
pub use hud::Hud;
pub use level::{Level, LevelError};
pub use render::{Canvas, DrawPass, SpriteId};
pub use sfx::{SoundEffect, Sfx};
pub use spatial::SpatialIndex;
pub use waves::{WaveDirector, WaveSpawn};
pub use world::Simulation;
