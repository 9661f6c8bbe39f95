use tracing::{trace, warn};

use super::utils::chase_direction;
use super::*;
use crate::error::GameError;
use crate::movement::{attempt_move, Interaction, MoveOutcome, PlayerStriker};

impl GameEngine {
    /// Hands the turn to the enemies. The phase opens with one pacing delay,
    /// doubled when there is nobody to move.
    pub(super) fn begin_enemy_phase(&mut self) {
        if self.phase == Phase::GameOver {
            return;
        }
        let mut delay = self.settings.turn_delay_ms;
        if self.enemies.is_empty() {
            delay = delay.saturating_add(self.settings.turn_delay_ms);
        }
        self.stats.enemy_phases += 1;
        self.phase = Phase::EnemyPhase {
            next_enemy: 0,
            resume_at_ms: self.now_ms.saturating_add(delay),
        };
    }

    /// Acts every enemy whose slot has come due, in registration order. Each
    /// enemy holds the phase for its own move time before the next one goes.
    pub(super) fn run_enemy_phase(&mut self) {
        while let Phase::EnemyPhase {
            next_enemy,
            resume_at_ms,
        } = self.phase
        {
            if self.now_ms < resume_at_ms {
                return;
            }
            let Some(pause_ms) = self
                .enemies
                .get(next_enemy)
                .map(|enemy| enemy.body.move_time_ms)
            else {
                trace!(now_ms = self.now_ms, "enemy phase finished");
                self.phase = Phase::PlayerTurn;
                return;
            };

            if let Err(error) = self.act_enemy(next_enemy) {
                warn!(%error, "enemy turn skipped");
            }
            if self.phase == Phase::GameOver {
                return;
            }
            self.phase = Phase::EnemyPhase {
                next_enemy: next_enemy + 1,
                resume_at_ms: resume_at_ms.saturating_add(pause_ms),
            };
        }
    }

    /// One enemy turn: rest if it acted last phase, otherwise step toward the
    /// player and bite if the player is in the way.
    pub(super) fn act_enemy(&mut self, idx: usize) -> Result<Option<MoveOutcome>> {
        let now_ms = self.now_ms;
        let enemy = &mut self.enemies[idx];
        if enemy.skip_next_action {
            enemy.skip_next_action = false;
            trace!(enemy = %enemy.id, "enemy rests");
            return Ok(None);
        }

        let target = self
            .board
            .find_mover(Occupant::Player)
            .ok_or(GameError::MissingTarget { enemy: enemy.id })?;
        let dir = chase_direction(enemy.body.pos, target);
        let mut striker = PlayerStriker {
            damage: enemy.damage,
            food: &mut self.player.food,
        };
        let outcome = attempt_move(&mut self.board, &mut enemy.body, dir, now_ms, &mut striker);
        enemy.skip_next_action = true;

        let id = enemy.id;
        let duration_ms = enemy.body.move_time_ms;
        self.stats.enemy_actions += 1;
        debug!(enemy = %id, ?dir, ?outcome, "enemy turn");

        match outcome {
            MoveOutcome::Moved { from, to } if from != to => {
                self.events.push(GameEvent::EnemyMoved {
                    enemy: id,
                    from,
                    to,
                    duration_ms,
                });
            }
            MoveOutcome::Interacted {
                interaction: Interaction::PlayerHit { damage, .. },
                ..
            } => {
                self.stats.food_lost_to_enemies += i64::from(damage);
                self.events.push(GameEvent::EnemyAttacked { enemy: id, damage });
                self.push_food_change(-damage);
                if self.player.food <= 0 {
                    self.enter_game_over();
                }
            }
            _ => {}
        }
        Ok(Some(outcome))
    }
}
