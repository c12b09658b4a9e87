//! Level grid: a tile layer and a structure layer, both row-major `i32` arrays.
//!
//! The file format is the raw dump of both arrays (tiles first), little-endian,
//! with no header. `-1` in the structure layer means "no structure".

use std::io::{Read, Write};
use std::path::Path;

use glam::IVec2;
use thiserror::Error;

/// Side length of one grid cell in world pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Tile index laid down by a built floor.
pub const FLOOR_TILE: i32 = 4;

const NO_STRUCTURE: i32 = -1;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level io: {0}")]
    Io(#[from] std::io::Error),
    #[error("level data truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
}

/// Structure codes stored in the structure layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Structure {
    Wall,
    House,
    /// Road pieces, codes 2 through 12.
    Road(u8),
    Crater,
    ComputeCore,
    SiliconRefinery,
    DroneDeployer,
}

impl Structure {
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Wall,
            1 => Self::House,
            2..=12 => Self::Road(code as u8),
            13 => Self::Crater,
            14 => Self::ComputeCore,
            15 => Self::SiliconRefinery,
            16 => Self::DroneDeployer,
            _ => return None,
        })
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Wall => 0,
            Self::House => 1,
            Self::Road(n) => i32::from(n),
            Self::Crater => 13,
            Self::ComputeCore => 14,
            Self::SiliconRefinery => 15,
            Self::DroneDeployer => 16,
        }
    }

    /// Codes that become live units when a game starts.
    pub fn is_unit(self) -> bool {
        matches!(
            self,
            Self::Wall | Self::ComputeCore | Self::SiliconRefinery | Self::DroneDeployer
        )
    }
}

#[derive(Debug, Clone)]
pub struct Level {
    width: i32,
    height: i32,
    tiles: Vec<i32>,
    structures: Vec<i32>,
}

impl Level {
    /// All tile 0, no structures.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let len = (width * height) as usize;
        Self {
            width,
            height,
            tiles: vec![0; len],
            structures: vec![NO_STRUCTURE; len],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// World size in pixels.
    pub fn pixel_size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32, self.height as f32) * TILE_SIZE
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        self.contains(cell)
            .then(|| (cell.y * self.width + cell.x) as usize)
    }

    /// Tile index, 0 outside the grid.
    pub fn tile(&self, cell: IVec2) -> i32 {
        self.index(cell).map_or(0, |i| self.tiles[i])
    }

    pub fn set_tile(&mut self, cell: IVec2, tile: i32) {
        if let Some(i) = self.index(cell) {
            self.tiles[i] = tile;
        }
    }

    /// Structure at `cell`, `None` outside the grid or for unknown codes.
    pub fn structure(&self, cell: IVec2) -> Option<Structure> {
        self.index(cell)
            .and_then(|i| Structure::from_code(self.structures[i]))
    }

    pub fn set_structure(&mut self, cell: IVec2, structure: Option<Structure>) {
        if let Some(i) = self.index(cell) {
            self.structures[i] = structure.map_or(NO_STRUCTURE, Structure::code);
        }
    }

    /// Read both layers from `path`, replacing the current contents.
    ///
    /// On error the level is left untouched.
    pub fn load(&mut self, path: &Path) -> Result<(), LevelError> {
        let mut bytes = Vec::new();
        std::fs::File::open(path)?.read_to_end(&mut bytes)?;

        let len = self.tiles.len();
        let expected = len * 2 * 4;
        if bytes.len() < expected {
            return Err(LevelError::Truncated {
                expected,
                found: bytes.len(),
            });
        }

        let mut words = bytes
            .chunks_exact(4)
            .map(|w| i32::from_le_bytes([w[0], w[1], w[2], w[3]]));
        for t in self.tiles.iter_mut() {
            *t = words.next().unwrap_or(0);
        }
        for s in self.structures.iter_mut() {
            *s = words.next().unwrap_or(NO_STRUCTURE);
        }
        Ok(())
    }

    /// `load`, but a failure only logs and keeps the default level.
    pub fn load_or_default(width: i32, height: i32, path: &Path) -> Self {
        let mut level = Self::new(width, height);
        match level.load(path) {
            Ok(()) => log::info!("Loaded level {:?} ({}x{})", path, width, height),
            Err(e) => {
                log::warn!("Could not load level {:?}: {}. Using empty level.", path, e);
                level = Self::new(width, height);
            }
        }
        level
    }

    pub fn save(&self, path: &Path) -> Result<(), LevelError> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        for v in self.tiles.iter().chain(&self.structures) {
            file.write_all(&v.to_le_bytes())?;
        }
        file.flush()?;
        Ok(())
    }

    /// Every cell holding a structure, row-major.
    pub fn structures(&self) -> impl Iterator<Item = (IVec2, Structure)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| {
                let cell = IVec2::new(x, y);
                self.structure(cell).map(|s| (cell, s))
            })
        })
    }
}

/// Cell containing a world position.
pub fn cell_of(pos: glam::Vec2) -> IVec2 {
    (pos / TILE_SIZE).floor().as_ivec2()
}

/// Top-left corner of a cell in world pixels.
pub fn cell_origin(cell: IVec2) -> glam::Vec2 {
    cell.as_vec2() * TILE_SIZE
}
