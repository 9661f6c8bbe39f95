use crate::error::{GameError, Result};
use crate::rng::Rng;
use crate::types::Vec2;

/// Bounded coordinate space of one level.
///
/// The playable area is `0..columns × 0..rows`, wrapped in a one-cell border
/// ring at `-1` and `columns`/`rows`. Spawn positions come from the interior
/// `1..=columns-2 × 1..=rows-2`, which keeps the outermost playable ring clear.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: i32,
    rows: i32,
    free_positions: Vec<Vec2>,
}

impl Grid {
    pub fn new(columns: i32, rows: i32) -> Self {
        let mut grid = Self {
            columns,
            rows,
            free_positions: Vec::new(),
        };
        grid.reset(columns, rows);
        grid
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn reset(&mut self, columns: i32, rows: i32) {
        self.columns = columns;
        self.rows = rows;
        self.free_positions.clear();
        for x in 1..columns - 1 {
            for y in 1..rows - 1 {
                self.free_positions.push(Vec2::new(x, y));
            }
        }
    }

    /// Draws a uniformly random cell from the pool. A drawn cell never comes
    /// back until the next `reset`.
    pub fn take_random_free_position(&mut self, rng: &mut Rng) -> Result<Vec2> {
        if self.free_positions.is_empty() {
            return Err(GameError::ExhaustedPool);
        }
        let index = rng.below(self.free_positions.len());
        Ok(self.free_positions.swap_remove(index))
    }

    pub fn free_count(&self) -> usize {
        self.free_positions.len()
    }

    #[cfg(test)]
    pub fn is_free(&self, pos: Vec2) -> bool {
        self.free_positions.contains(&pos)
    }

    pub fn interior_capacity(&self) -> usize {
        ((self.columns - 2).max(0) * (self.rows - 2).max(0)) as usize
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= -1 && pos.y >= -1 && pos.x <= self.columns && pos.y <= self.rows
    }

    #[cfg(test)]
    pub fn is_playable(&self, pos: Vec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.columns && pos.y < self.rows
    }

    pub fn is_border(&self, pos: Vec2) -> bool {
        self.contains(pos)
            && (pos.x == -1 || pos.y == -1 || pos.x == self.columns || pos.y == self.rows)
    }

    /// Every cell of the bordered extent `[-1, columns] × [-1, rows]`. Walking
    /// it does not touch the pool.
    pub fn bordered_cells(&self) -> impl Iterator<Item = Vec2> {
        let columns = self.columns;
        let rows = self.rows;
        (-1..=columns).flat_map(move |x| (-1..=rows).map(move |y| Vec2::new(x, y)))
    }

    pub fn exit_position(&self) -> Vec2 {
        Vec2::new(self.columns - 2, self.rows - 2)
    }
}
