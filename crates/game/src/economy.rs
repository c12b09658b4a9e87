//! Production economy.
//!
//! Compute cores generate "compute" every tick and refineries generate
//! silicon. Silicon pays for a build up front; compute is then spent on the
//! work cost of every build in progress. A finished build becomes a ready
//! unit that waits for the player to place it.

use thiserror::Error;

/// Slices a tick's compute is cut into before it is handed out.
pub const COMPUTE_SLICES: u32 = 10;
/// Compute per second from each compute core.
pub const COMPUTE_PER_CORE: f32 = 1.0;
/// Silicon per second from each refinery.
pub const SILICON_PER_REFINERY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Buildable {
    Wall,
    Floor,
    ComputeCore,
    SiliconRefinery,
    DroneDeployer,
    RepairDeployer,
}

impl Buildable {
    pub const ALL: [Buildable; 6] = [
        Buildable::Wall,
        Buildable::Floor,
        Buildable::ComputeCore,
        Buildable::SiliconRefinery,
        Buildable::DroneDeployer,
        Buildable::RepairDeployer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Buildable::Wall => "Wall",
            Buildable::Floor => "Floor",
            Buildable::ComputeCore => "Compute Core",
            Buildable::SiliconRefinery => "Silicon Refinery",
            Buildable::DroneDeployer => "Drone Deployer",
            Buildable::RepairDeployer => "Repair Deployer",
        }
    }

    /// Compute needed to finish one unit.
    pub fn work_cost(self) -> f32 {
        match self {
            Buildable::Wall => 2.0,
            Buildable::Floor => 0.5,
            Buildable::ComputeCore => 10.0,
            Buildable::SiliconRefinery => 20.0,
            Buildable::DroneDeployer | Buildable::RepairDeployer => 30.0,
        }
    }

    pub fn silicon_cost(self) -> f32 {
        match self {
            Buildable::Wall => 5.0,
            Buildable::Floor => 1.0,
            Buildable::ComputeCore => 50.0,
            Buildable::SiliconRefinery => 40.0,
            Buildable::DroneDeployer | Buildable::RepairDeployer => 60.0,
        }
    }

    /// Whether more units may be queued while one is still in progress.
    pub fn allows_multiple(self) -> bool {
        matches!(self, Buildable::Wall | Buildable::Floor)
    }
}

/// Production state of one buildable.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildItem {
    pub kind: Buildable,
    /// Work left on the unit currently being built.
    pub work_remaining: f32,
    pub in_progress: u32,
    pub ready: u32,
}

impl BuildItem {
    fn new(kind: Buildable) -> Self {
        Self {
            kind,
            work_remaining: 0.0,
            in_progress: 0,
            ready: 0,
        }
    }

    /// Fraction of the current unit done, for progress bars.
    pub fn progress(&self) -> f32 {
        if self.in_progress == 0 {
            return 0.0;
        }
        (1.0 - self.work_remaining / self.kind.work_cost()).clamp(0.0, 1.0)
    }

    /// Spend up to `amount` compute on this item. Returns what was used.
    fn absorb(&mut self, amount: f32) -> f32 {
        if self.in_progress == 0 {
            return 0.0;
        }
        self.work_remaining -= amount;
        if self.work_remaining <= 0.0 {
            self.ready += 1;
            self.in_progress -= 1;
            if self.in_progress > 0 {
                self.work_remaining = self.kind.work_cost();
            }
        }
        amount
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("{} is already being built", .0.name())]
    Busy(Buildable),
    #[error("{} needs {needed} silicon, only {available} available", .kind.name())]
    InsufficientSilicon {
        kind: Buildable,
        needed: f32,
        available: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("no {} ready to place", .0.name())]
    NothingReady(Buildable),
    #[error("cell is outside the level")]
    OutOfBounds,
    #[error("cell already holds a building")]
    Occupied,
}

#[derive(Debug, Clone)]
pub struct Economy {
    items: Vec<BuildItem>,
    pub silicon: f32,
}

impl Economy {
    pub fn new(starting_silicon: f32) -> Self {
        Self {
            items: Buildable::ALL.into_iter().map(BuildItem::new).collect(),
            silicon: starting_silicon,
        }
    }

    pub fn item(&self, kind: Buildable) -> &BuildItem {
        &self.items[Self::slot(kind)]
    }

    pub fn items(&self) -> &[BuildItem] {
        &self.items
    }

    fn slot(kind: Buildable) -> usize {
        Buildable::ALL
            .iter()
            .position(|&k| k == kind)
            .unwrap_or_default()
    }

    /// Pay for and queue one unit of `kind`.
    pub fn start_build(&mut self, kind: Buildable) -> Result<(), BuildError> {
        let available = self.silicon;
        let item = &mut self.items[Self::slot(kind)];
        if item.in_progress > 0 && !kind.allows_multiple() {
            return Err(BuildError::Busy(kind));
        }
        let needed = kind.silicon_cost();
        if needed > available {
            return Err(BuildError::InsufficientSilicon {
                kind,
                needed,
                available,
            });
        }

        self.silicon -= needed;
        if item.in_progress == 0 {
            item.work_remaining = kind.work_cost();
        }
        item.in_progress += 1;
        log::debug!("Queued {} ({} in progress)", kind.name(), item.in_progress);
        Ok(())
    }

    /// Hand `pool` compute to every in-progress item, one slice per item
    /// per round, until the pool runs dry or nothing is being built.
    pub fn distribute(&mut self, mut pool: f32) {
        let slice = pool / COMPUTE_SLICES as f32;
        while pool > 0.0 {
            let mut used = 0.0;
            for item in &mut self.items {
                let amount = slice.min(pool - used);
                if amount <= 0.0 {
                    break;
                }
                let before = item.ready;
                used += item.absorb(amount);
                if item.ready > before {
                    log::info!("{} ready to place", item.kind.name());
                }
            }
            if used <= 0.0 {
                break;
            }
            pool -= used;
        }
    }

    /// Advance production by `dt` seconds at the given generation rates.
    pub fn tick(&mut self, dt: f32, compute_rate: f32, silicon_rate: f32) {
        self.silicon += silicon_rate * dt;
        self.distribute(compute_rate * dt);
    }

    /// Consume one ready unit of `kind`.
    pub fn take_ready(&mut self, kind: Buildable) -> Result<(), PlaceError> {
        let item = &mut self.items[Self::slot(kind)];
        if item.ready == 0 {
            return Err(PlaceError::NothingReady(kind));
        }
        item.ready -= 1;
        Ok(())
    }
}
