use std::collections::BTreeMap;

use crate::grid::Grid;
use crate::types::{ItemKind, Occupant, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wall {
    pub hp: i32,
    pub max_hp: i32,
    pub variant: u8,
}

impl Wall {
    pub fn is_damaged(&self) -> bool {
        self.hp < self.max_hp
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallHit {
    Damaged { hp: i32 },
    Destroyed,
}

/// Live occupancy of a level: destructible walls, pickups, the exit and the
/// blocking positions of every mover.
#[derive(Clone, Debug)]
pub struct Board {
    grid: Grid,
    walls: BTreeMap<Vec2, Wall>,
    items: BTreeMap<Vec2, ItemKind>,
    movers: BTreeMap<Vec2, Occupant>,
    exit: Vec2,
}

impl Board {
    pub fn new(grid: Grid, exit: Vec2) -> Self {
        Self {
            grid,
            walls: BTreeMap::new(),
            items: BTreeMap::new(),
            movers: BTreeMap::new(),
            exit,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn exit(&self) -> Vec2 {
        self.exit
    }

    pub fn is_exit(&self, pos: Vec2) -> bool {
        self.exit == pos
    }

    pub fn walls(&self) -> impl Iterator<Item = (Vec2, &Wall)> {
        self.walls.iter().map(|(pos, wall)| (*pos, wall))
    }

    pub fn items(&self) -> impl Iterator<Item = (Vec2, ItemKind)> + '_ {
        self.items.iter().map(|(pos, kind)| (*pos, *kind))
    }

    pub fn wall_at(&self, pos: Vec2) -> Option<&Wall> {
        self.walls.get(&pos)
    }

    pub fn item_at(&self, pos: Vec2) -> Option<ItemKind> {
        self.items.get(&pos).copied()
    }

    pub fn mover_at(&self, pos: Vec2) -> Option<Occupant> {
        self.movers.get(&pos).copied()
    }

    pub fn insert_wall(&mut self, pos: Vec2, wall: Wall) {
        self.walls.insert(pos, wall);
    }

    pub fn insert_item(&mut self, pos: Vec2, kind: ItemKind) {
        self.items.insert(pos, kind);
    }

    /// Whatever blocks movement into `pos`. Anything off the bordered extent
    /// counts as border wall.
    pub fn occupant_at(&self, pos: Vec2) -> Option<Occupant> {
        if !self.grid.contains(pos) || self.grid.is_border(pos) {
            return Some(Occupant::BorderWall);
        }
        if self.walls.contains_key(&pos) {
            return Some(Occupant::Wall);
        }
        self.movers.get(&pos).copied()
    }

    pub fn place_mover(&mut self, pos: Vec2, occupant: Occupant) {
        self.movers.insert(pos, occupant);
    }

    pub fn remove_mover(&mut self, pos: Vec2) -> Option<Occupant> {
        self.movers.remove(&pos)
    }

    pub fn relocate_mover(&mut self, from: Vec2, to: Vec2) {
        if let Some(occupant) = self.movers.remove(&from) {
            self.movers.insert(to, occupant);
        }
    }

    pub fn find_mover(&self, occupant: Occupant) -> Option<Vec2> {
        self.movers
            .iter()
            .find(|(_, candidate)| **candidate == occupant)
            .map(|(pos, _)| *pos)
    }

    /// Applies `damage` to the wall at `pos`, removing it once its hit points
    /// reach zero. Returns `None` when there is no wall there.
    pub fn damage_wall(&mut self, pos: Vec2, damage: i32) -> Option<WallHit> {
        let wall = self.walls.get_mut(&pos)?;
        wall.hp -= damage;
        if wall.hp <= 0 {
            self.walls.remove(&pos);
            return Some(WallHit::Destroyed);
        }
        Some(WallHit::Damaged { hp: wall.hp })
    }

    pub fn take_item(&mut self, pos: Vec2) -> Option<ItemKind> {
        self.items.remove(&pos)
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn mover_count(&self) -> usize {
        self.movers.len()
    }
}
