use serde::Serialize;
use tracing::{debug, info};

use crate::board::Board;
use crate::config::GameSettings;
use crate::error::Result;
use crate::grid::Grid;
use crate::movement::Body;
use crate::rng::Rng;
use crate::types::{
    Direction, EnemyId, EnemyKind, EnemyView, GameEvent, ItemView, Occupant, Phase, PlayerView,
    Snapshot, Vec2, WallView,
};
use crate::world::{generate_level, GroundTile, PlacementReport};

mod autopilot;
mod enemy_system;
mod player_system;
mod spawn_system;
mod utils;

pub use self::player_system::PlayerTurnReport;
use self::utils::render_rows;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CarryOver {
    level: i32,
    food: i32,
}

#[derive(Clone, Debug)]
struct PlayerInternal {
    body: Body,
    food: i32,
    wall_damage: i32,
    active: bool,
}

#[derive(Clone, Debug)]
struct EnemyInternal {
    id: EnemyId,
    kind: EnemyKind,
    body: Body,
    damage: i32,
    skip_next_action: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    #[serde(rename = "playerTurns")]
    pub player_turns: u64,
    #[serde(rename = "enemyPhases")]
    pub enemy_phases: u64,
    #[serde(rename = "enemyActions")]
    pub enemy_actions: u64,
    #[serde(rename = "wallsDestroyed")]
    pub walls_destroyed: u64,
    #[serde(rename = "itemsPicked")]
    pub items_picked: u64,
    #[serde(rename = "foodLostToEnemies")]
    pub food_lost_to_enemies: i64,
    #[serde(rename = "levelsCompleted")]
    pub levels_completed: u64,
}

/// Turn scheduler and owner of all per-level state.
///
/// Time is a logical millisecond clock moved forward by [`GameEngine::advance`];
/// every suspension (level intro, enemy pacing, level completion) is a
/// deadline on that clock rather than a real sleep.
#[derive(Clone, Debug)]
pub struct GameEngine {
    settings: GameSettings,
    rng: Rng,
    carry: CarryOver,
    board: Board,
    ground: Vec<GroundTile>,
    report: PlacementReport,
    player: PlayerInternal,
    enemies: Vec<EnemyInternal>,
    phase: Phase,
    level_complete_at_ms: Option<u64>,
    now_ms: u64,
    events: Vec<GameEvent>,
    stats: RunStats,
}

impl GameEngine {
    pub fn new(settings: GameSettings, seed: u32) -> Result<Self> {
        settings.validate()?;
        let grid = Grid::new(settings.columns, settings.rows);
        let exit = grid.exit_position();
        let start = Vec2::new(0, 0);
        let carry = CarryOver {
            level: settings.starting_level,
            food: settings.initial_food,
        };
        let player = PlayerInternal {
            body: Body::new(Occupant::Player, start, settings.player_move_time_ms),
            food: carry.food,
            wall_damage: settings.wall_damage,
            active: false,
        };

        let mut engine = Self {
            rng: Rng::new(seed),
            carry,
            board: Board::new(grid, exit),
            ground: Vec::new(),
            report: PlacementReport::default(),
            player,
            enemies: Vec::new(),
            phase: Phase::LevelStart { until_ms: 0 },
            level_complete_at_ms: None,
            now_ms: 0,
            events: Vec::new(),
            stats: RunStats::default(),
            settings,
        };
        engine.start_level(carry)?;
        Ok(engine)
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> i32 {
        self.carry.level
    }

    pub fn food(&self) -> i32 {
        self.player.food
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.phase == Phase::PlayerTurn && self.player.active
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ground(&self) -> &[GroundTile] {
        &self.ground
    }

    pub fn placement_report(&self) -> &PlacementReport {
        &self.report
    }

    pub fn player_position(&self) -> Option<Vec2> {
        self.player.active.then_some(self.player.body.pos)
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Moves the logical clock forward and fires every deadline that came due:
    /// the end of a level intro, paced enemy actions and a pending level
    /// advance. Fails only if generating the next level fails.
    pub fn advance(&mut self, dt_ms: u64) -> Result<()> {
        self.now_ms = self.now_ms.saturating_add(dt_ms);
        self.player.body.settle(self.now_ms);
        for enemy in &mut self.enemies {
            enemy.body.settle(self.now_ms);
        }

        if let Phase::LevelStart { until_ms } = self.phase {
            if self.now_ms >= until_ms {
                debug!(level = self.carry.level, "level intro finished");
                self.phase = Phase::PlayerTurn;
            }
        }

        self.run_enemy_phase();

        if let Some(advance_at_ms) = self.level_complete_at_ms {
            if self.now_ms >= advance_at_ms && self.phase != Phase::GameOver {
                self.advance_level()?;
            }
        }
        Ok(())
    }

    /// Full reset: back to the starting level with the initial food supply.
    /// Stats and the current level survive if the fresh level fails to generate.
    pub fn restart(&mut self) -> Result<()> {
        let carry = CarryOver {
            level: self.settings.starting_level,
            food: self.settings.initial_food,
        };
        let generated = generate_level(carry.level, &self.settings, &mut self.rng)?;

        info!(level = self.carry.level, "game restarted");
        self.stats = RunStats::default();
        self.events.push(GameEvent::GameRestarted);
        self.install_level(carry, generated);
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let now_ms = self.now_ms;
        let player = self.player.active.then(|| {
            let (render_x, render_y) = self.player.body.render_position(now_ms);
            PlayerView {
                x: self.player.body.pos.x,
                y: self.player.body.pos.y,
                render_x,
                render_y,
                food: self.player.food,
                moving: self.player.body.is_moving(now_ms),
            }
        });
        let enemies = self
            .enemies
            .iter()
            .map(|enemy| {
                let (render_x, render_y) = enemy.body.render_position(now_ms);
                EnemyView {
                    id: enemy.id,
                    kind: enemy.kind,
                    x: enemy.body.pos.x,
                    y: enemy.body.pos.y,
                    render_x,
                    render_y,
                    damage: enemy.damage,
                    skip_next_action: enemy.skip_next_action,
                }
            })
            .collect();
        let walls = self
            .board
            .walls()
            .map(|(pos, wall)| WallView {
                x: pos.x,
                y: pos.y,
                hp: wall.hp,
                damaged: wall.is_damaged(),
            })
            .collect();
        let items = self
            .board
            .items()
            .map(|(pos, kind)| ItemView {
                x: pos.x,
                y: pos.y,
                kind,
            })
            .collect();

        Snapshot {
            level: self.carry.level,
            now_ms,
            phase: self.phase,
            level_complete_at_ms: self.level_complete_at_ms,
            columns: self.board.grid().columns(),
            rows: self.board.grid().rows(),
            player,
            enemies,
            walls,
            items,
            exit: self.board.exit(),
            tiles: self.render_ascii(),
            events: if include_events {
                self.drain_events()
            } else {
                Vec::new()
            },
        }
    }

    pub fn render_ascii(&self) -> Vec<String> {
        let enemies: Vec<(Vec2, EnemyKind)> = self
            .enemies
            .iter()
            .map(|enemy| (enemy.body.pos, enemy.kind))
            .collect();
        render_rows(&self.board, self.player_position(), &enemies)
    }

    fn enter_game_over(&mut self) {
        if self.phase == Phase::GameOver {
            return;
        }
        info!(
            level = self.carry.level,
            food = self.player.food,
            "game over"
        );
        self.phase = Phase::GameOver;
        self.level_complete_at_ms = None;
        self.events.push(GameEvent::GameOver {
            level: self.carry.level,
        });
    }

    fn push_food_change(&mut self, delta: i32) {
        self.events.push(GameEvent::FoodChanged {
            food: self.player.food,
            delta,
        });
    }

    #[cfg(test)]
    fn move_player_to(&mut self, pos: Vec2) {
        self.board.relocate_mover(self.player.body.pos, pos);
        self.player.body.pos = pos;
    }

    #[cfg(test)]
    fn move_enemy_to(&mut self, idx: usize, pos: Vec2) {
        self.board.relocate_mover(self.enemies[idx].body.pos, pos);
        self.enemies[idx].body.pos = pos;
    }
}
