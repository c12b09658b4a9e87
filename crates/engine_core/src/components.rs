//! Common components shared by every unit in the simulation.

use std::ops::BitOr;

/// Health component for damageable entities.
///
/// `current` always stays within `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).clamp(0.0, self.max);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn percentage(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Which side a unit (or a source of damage) belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Faction {
    /// Built by the player: structures, drones, their rockets.
    #[default]
    Player,
    /// The attacking waves: soldiers, jets, their grenades.
    Cpu,
}

/// Capability tags used by targeting rules instead of type inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Self = Self(0);
    pub const SOLDIER: Self = Self(1 << 0);
    pub const COMPUTE_CORE: Self = Self(1 << 1);
    pub const WALL: Self = Self(1 << 2);
    pub const DRONE_DEPLOYER: Self = Self(1 << 3);
    pub const SILICON_REFINERY: Self = Self(1 << 4);
    pub const CRATER: Self = Self(1 << 5);

    /// Anything soldiers are sent to tear down.
    pub const PLAYER_STRUCTURE: Self = Self(
        Self::WALL.0 | Self::COMPUTE_CORE.0 | Self::DRONE_DEPLOYER.0 | Self::SILICON_REFINERY.0,
    );

    /// True when every tag in `other` is present.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when at least one tag in `other` is present.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_soldier(self) -> bool {
        self.contains(Self::SOLDIER)
    }

    pub const fn is_compute_core(self) -> bool {
        self.contains(Self::COMPUTE_CORE)
    }

    pub const fn is_wall(self) -> bool {
        self.contains(Self::WALL)
    }

    pub const fn is_drone_deployer(self) -> bool {
        self.contains(Self::DRONE_DEPLOYER)
    }

    pub const fn is_silicon_refinery(self) -> bool {
        self.contains(Self::SILICON_REFINERY)
    }

    pub const fn is_crater(self) -> bool {
        self.contains(Self::CRATER)
    }

    pub const fn is_player_structure(self) -> bool {
        self.intersects(Self::PLAYER_STRUCTURE)
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
