use super::*;
use crate::movement::{attempt_move, Interaction, MoveOutcome, WallChopper};
use crate::types::ItemKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerTurnReport {
    pub outcome: MoveOutcome,
    pub food: i32,
    pub picked: Option<ItemKind>,
    pub reached_exit: bool,
    pub game_over: bool,
}

impl GameEngine {
    /// Resolves one player action. Returns `None` when the input was not
    /// accepted: outside the player's turn, or a zero direction.
    ///
    /// A consumed turn always costs one food, even when the move is blocked.
    /// Starvation is checked before pickups, so moving at one food is fatal.
    pub fn submit_input(&mut self, dir: Direction) -> Option<PlayerTurnReport> {
        if dir == Direction::None {
            return None;
        }
        if !self.is_awaiting_input() {
            debug!(phase = ?self.phase, ?dir, "input ignored outside player turn");
            return None;
        }

        self.stats.player_turns += 1;
        self.player.food -= 1;
        self.push_food_change(-1);

        let mut chopper = WallChopper {
            damage: self.player.wall_damage,
        };
        let outcome = attempt_move(
            &mut self.board,
            &mut self.player.body,
            dir,
            self.now_ms,
            &mut chopper,
        );
        self.record_player_outcome(outcome);
        debug!(?dir, ?outcome, food = self.player.food, "player turn");

        let mut report = PlayerTurnReport {
            outcome,
            food: self.player.food,
            picked: None,
            reached_exit: false,
            game_over: false,
        };

        if self.player.food <= 0 {
            self.enter_game_over();
            report.game_over = true;
            return Some(report);
        }

        if let Some(to) = outcome.moved_to() {
            report.picked = self.pick_up(to);
            if self.board.is_exit(to) {
                self.complete_level();
                report.reached_exit = true;
            }
        }

        self.begin_enemy_phase();
        report.food = self.player.food;
        Some(report)
    }

    fn record_player_outcome(&mut self, outcome: MoveOutcome) {
        match outcome {
            MoveOutcome::Moved { from, to } if from != to => {
                self.events.push(GameEvent::PlayerMoved {
                    from,
                    to,
                    duration_ms: self.player.body.move_time_ms,
                });
            }
            MoveOutcome::Interacted {
                interaction: Interaction::WallDamaged { at, hp },
                ..
            } => {
                self.events.push(GameEvent::WallDamaged { at, hp });
            }
            MoveOutcome::Interacted {
                interaction: Interaction::WallDestroyed { at },
                ..
            } => {
                self.stats.walls_destroyed += 1;
                self.events.push(GameEvent::WallDestroyed { at });
            }
            _ => {}
        }
    }

    fn pick_up(&mut self, at: Vec2) -> Option<ItemKind> {
        let kind = self.board.take_item(at)?;
        let points = self.settings.item_points(kind);
        self.player.food += points;
        self.stats.items_picked += 1;
        self.events.push(GameEvent::ItemPicked { at, kind, points });
        self.push_food_change(points);
        Some(kind)
    }

    /// The player leaves the board; the next level starts once the restart
    /// delay has passed.
    fn complete_level(&mut self) {
        info!(level = self.carry.level, food = self.player.food, "level completed");
        self.player.active = false;
        self.board.remove_mover(self.player.body.pos);
        self.level_complete_at_ms = Some(
            self.now_ms
                .saturating_add(self.settings.restart_level_delay_ms),
        );
        self.stats.levels_completed += 1;
        self.events.push(GameEvent::LevelCompleted {
            level: self.carry.level,
        });
    }
}
