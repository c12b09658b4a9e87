//! Core engine types and utilities for TGM.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Frame clock with a clamped simulation step
//! - Shared unit components (health, faction, capability tags)

pub mod components;
pub mod time;

pub use components::*;
pub use time::*;

// Re-export commonly used types
pub use glam::{IVec2, Vec2, Vec4};
pub use hecs::{Entity, World};
