//! Grid-bucketed entity lookup.
//!
//! One bucket per level cell. Buckets hold handles only; the simulation owns
//! the entities. Out-of-range cells are never an error: mutations are ignored
//! and queries return an empty slice.

use glam::{IVec2, Vec2};
use hecs::Entity;

use crate::level::{cell_of, TILE_SIZE};

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    width: i32,
    height: i32,
    cells: Vec<Vec<Entity>>,
}

impl SpatialIndex {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Vec::new(); (width * height) as usize],
        }
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        (cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height)
            .then(|| (cell.y * self.width + cell.x) as usize)
    }

    pub fn add(&mut self, cell: IVec2, entity: Entity) {
        if let Some(i) = self.index(cell) {
            self.cells[i].push(entity);
        }
    }

    pub fn remove(&mut self, cell: IVec2, entity: Entity) {
        if let Some(i) = self.index(cell) {
            let bucket = &mut self.cells[i];
            if let Some(pos) = bucket.iter().position(|&e| e == entity) {
                bucket.swap_remove(pos);
            }
        }
    }

    /// Entities in `cell`, in no particular order.
    pub fn query(&self, cell: IVec2) -> &[Entity] {
        match self.index(cell) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    /// Move `entity` from the cell of `from` to the cell of `to`.
    ///
    /// Returns `false` (and touches nothing) when both positions share a cell.
    pub fn relocate(&mut self, entity: Entity, from: Vec2, to: Vec2) -> bool {
        let old = cell_of(from);
        let new = cell_of(to);
        if old == new {
            return false;
        }
        self.remove(old, entity);
        self.add(new, entity);
        true
    }

    /// Entities whose cell lies within `radius` cells-worth of `center`.
    ///
    /// This is the candidate set only; callers still test real distance.
    pub fn candidates(&self, center: Vec2, radius: f32) -> impl Iterator<Item = Entity> + '_ {
        let c = cell_of(center);
        let r = (radius / TILE_SIZE).ceil().max(0.0) as i32;
        (c.y - r..=c.y + r).flat_map(move |y| {
            (c.x - r..=c.x + r).flat_map(move |x| self.query(IVec2::new(x, y)).iter().copied())
        })
    }

    /// Total number of indexed handles.
    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|i| world.spawn((i,))).collect()
    }

    #[test]
    fn out_of_range_is_noop_and_empty() {
        let mut index = SpatialIndex::new(4, 4);
        let e = entities(1)[0];
        index.add(IVec2::new(-1, 0), e);
        index.add(IVec2::new(4, 4), e);
        index.remove(IVec2::new(10, 10), e);
        assert!(index.is_empty());
        assert!(index.query(IVec2::new(-5, 2)).is_empty());
    }

    #[test]
    fn move_within_cell_keeps_membership() {
        let mut index = SpatialIndex::new(4, 4);
        let es = entities(3);
        for &e in &es {
            index.add(IVec2::new(1, 1), e);
        }
        let before = index.query(IVec2::new(1, 1)).to_vec();

        assert!(!index.relocate(es[0], Vec2::new(33.0, 33.0), Vec2::new(63.0, 40.0)));
        assert_eq!(index.query(IVec2::new(1, 1)), before.as_slice());
    }

    #[test]
    fn move_across_cells_is_remove_then_add() {
        let mut index = SpatialIndex::new(4, 4);
        let e = entities(1)[0];
        index.add(IVec2::new(0, 0), e);
        assert!(index.relocate(e, Vec2::new(10.0, 10.0), Vec2::new(40.0, 70.0)));
        assert!(index.query(IVec2::new(0, 0)).is_empty());
        assert_eq!(index.query(IVec2::new(1, 2)), &[e]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn leaving_the_grid_drops_the_entry() {
        let mut index = SpatialIndex::new(2, 2);
        let e = entities(1)[0];
        index.add(IVec2::new(1, 1), e);
        index.relocate(e, Vec2::new(40.0, 40.0), Vec2::new(100.0, 40.0));
        assert!(index.is_empty());
    }

    #[test]
    fn candidates_cover_neighbouring_cells() {
        let mut index = SpatialIndex::new(10, 10);
        let es = entities(3);
        index.add(IVec2::new(5, 5), es[0]);
        index.add(IVec2::new(6, 4), es[1]);
        index.add(IVec2::new(9, 9), es[2]);

        let found: Vec<_> = index.candidates(Vec2::new(170.0, 170.0), 20.0).collect();
        assert!(found.contains(&es[0]));
        assert!(found.contains(&es[1]));
        assert!(!found.contains(&es[2]));
    }
}
