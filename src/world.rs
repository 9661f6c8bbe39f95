use tracing::{debug, warn};

use crate::board::{Board, Wall};
use crate::config::GameSettings;
use crate::constants::enemy_count_for_level;
use crate::error::{GameError, Result};
use crate::grid::Grid;
use crate::rng::Rng;
use crate::types::{EnemyKind, GroundKind, ItemKind, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundTile {
    pub pos: Vec2,
    pub kind: GroundKind,
    pub variant: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemySpawn {
    pub pos: Vec2,
    pub kind: EnemyKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitOverlap {
    Wall,
    Item(ItemKind),
    Enemy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementCount {
    pub requested: usize,
    pub placed: usize,
}

impl PlacementCount {
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.placed)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub walls: PlacementCount,
    pub items: PlacementCount,
    pub enemies: PlacementCount,
    pub exit_overlap: Option<ExitOverlap>,
    pub free_after: usize,
}

#[derive(Clone, Debug)]
pub struct GeneratedLevel {
    pub level: i32,
    pub board: Board,
    pub ground: Vec<GroundTile>,
    pub enemy_spawns: Vec<EnemySpawn>,
    pub report: PlacementReport,
}

pub fn generate_level(
    level: i32,
    settings: &GameSettings,
    rng: &mut Rng,
) -> Result<GeneratedLevel> {
    let enemy_count = enemy_count_for_level(level)?;
    let mut grid = Grid::new(settings.columns, settings.rows);

    let ground = lay_ground(&grid, settings, rng);
    grid.reset(settings.columns, settings.rows);

    let mut report = PlacementReport::default();

    let wall_count = settings.wall_count.sample(rng);
    let wall_cells = take_positions(&mut grid, rng, wall_count, "wall", settings.strict_placement)?;
    report.walls = PlacementCount {
        requested: wall_count,
        placed: wall_cells.len(),
    };

    let item_count = settings.food_count.sample(rng);
    let item_cells = take_positions(&mut grid, rng, item_count, "food", settings.strict_placement)?;
    report.items = PlacementCount {
        requested: item_count,
        placed: item_cells.len(),
    };

    let enemy_cells =
        take_positions(&mut grid, rng, enemy_count, "enemy", settings.strict_placement)?;
    report.enemies = PlacementCount {
        requested: enemy_count,
        placed: enemy_cells.len(),
    };
    report.free_after = grid.free_count();

    let exit = grid.exit_position();
    let mut board = Board::new(grid, exit);

    for pos in wall_cells {
        board.insert_wall(
            pos,
            Wall {
                hp: settings.wall_hit_points,
                max_hp: settings.wall_hit_points,
                variant: pick_variant(rng, settings.wall_variants),
            },
        );
    }
    for pos in item_cells {
        let kind = ItemKind::ALL[rng.below(ItemKind::ALL.len())];
        board.insert_item(pos, kind);
    }
    let enemy_spawns: Vec<EnemySpawn> = enemy_cells
        .into_iter()
        .map(|pos| EnemySpawn {
            pos,
            kind: EnemyKind::ALL[rng.below(EnemyKind::ALL.len())],
        })
        .collect();

    report.exit_overlap = detect_exit_overlap(&board, &enemy_spawns);
    if let Some(overlap) = report.exit_overlap {
        warn!(level, exit = %exit, ?overlap, "exit placed on an occupied cell");
    }

    debug!(
        level,
        walls = report.walls.placed,
        items = report.items.placed,
        enemies = report.enemies.placed,
        free_after = report.free_after,
        "level generated"
    );

    Ok(GeneratedLevel {
        level,
        board,
        ground,
        enemy_spawns,
        report,
    })
}

fn lay_ground(grid: &Grid, settings: &GameSettings, rng: &mut Rng) -> Vec<GroundTile> {
    grid.bordered_cells()
        .map(|pos| {
            if grid.is_border(pos) {
                GroundTile {
                    pos,
                    kind: GroundKind::BorderWall,
                    variant: pick_variant(rng, settings.border_variants),
                }
            } else {
                GroundTile {
                    pos,
                    kind: GroundKind::Floor,
                    variant: pick_variant(rng, settings.floor_variants),
                }
            }
        })
        .collect()
}

fn take_positions(
    grid: &mut Grid,
    rng: &mut Rng,
    count: usize,
    what: &'static str,
    strict: bool,
) -> Result<Vec<Vec2>> {
    let mut cells = Vec::with_capacity(count);
    for _ in 0..count {
        match grid.take_random_free_position(rng) {
            Ok(pos) => cells.push(pos),
            Err(GameError::ExhaustedPool) if !strict => {
                warn!(what, requested = count, placed = cells.len(), "free-position pool exhausted");
                break;
            }
            Err(error) => return Err(error),
        }
    }
    Ok(cells)
}

fn pick_variant(rng: &mut Rng, variants: u8) -> u8 {
    rng.below(variants as usize) as u8
}

fn detect_exit_overlap(board: &Board, enemy_spawns: &[EnemySpawn]) -> Option<ExitOverlap> {
    let exit = board.exit();
    if board.wall_at(exit).is_some() {
        return Some(ExitOverlap::Wall);
    }
    if let Some(kind) = board.item_at(exit) {
        return Some(ExitOverlap::Item(kind));
    }
    if enemy_spawns.iter().any(|spawn| spawn.pos == exit) {
        return Some(ExitOverlap::Enemy);
    }
    None
}
