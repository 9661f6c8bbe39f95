//! Shared move protocol for the player and enemies.
//!
//! A mover asks to step one cell. If the blocking layer is clear the logical
//! position changes at once and a [`Motion`] starts for presentation; if the
//! step is blocked, the blocker is offered to the mover's [`BlockedHandler`],
//! which only fires when the blocker exposes the capability it targets.
use tracing::trace;

use crate::board::{Board, WallHit};
use crate::types::{Direction, Occupant, Vec2};

/// In-flight relocation between two cells. Purely visual: the logical
/// position already equals `to` while this runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Motion {
    pub from: Vec2,
    pub to: Vec2,
    pub started_at_ms: u64,
    pub duration_ms: u64,
}

impl Motion {
    pub fn finishes_at_ms(&self) -> u64 {
        self.started_at_ms.saturating_add(self.duration_ms)
    }

    pub fn sample(&self, now_ms: u64) -> (f32, f32) {
        let progress = if self.duration_ms == 0 {
            1.0
        } else {
            (now_ms.saturating_sub(self.started_at_ms) as f32 / self.duration_ms as f32).min(1.0)
        };
        let x = self.from.x as f32 + (self.to.x - self.from.x) as f32 * progress;
        let y = self.from.y as f32 + (self.to.y - self.from.y) as f32 * progress;
        (x, y)
    }
}

#[derive(Clone, Debug)]
pub struct Body {
    pub tag: Occupant,
    pub pos: Vec2,
    pub move_time_ms: u64,
    motion: Option<Motion>,
}

impl Body {
    pub fn new(tag: Occupant, pos: Vec2, move_time_ms: u64) -> Self {
        Self {
            tag,
            pos,
            move_time_ms,
            motion: None,
        }
    }

    pub fn motion(&self) -> Option<&Motion> {
        self.motion.as_ref()
    }

    pub fn is_moving(&self, now_ms: u64) -> bool {
        self.motion
            .is_some_and(|motion| now_ms < motion.finishes_at_ms())
    }

    pub fn settle(&mut self, now_ms: u64) {
        if !self.is_moving(now_ms) {
            self.motion = None;
        }
    }

    pub fn render_position(&self, now_ms: u64) -> (f32, f32) {
        match self.motion {
            Some(motion) => motion.sample(now_ms),
            None => (self.pos.x as f32, self.pos.y as f32),
        }
    }
}

/// A blocker a mover can act on. `expose` is the capability lookup: it
/// yields a target only when the occupant offers this capability.
pub trait Interactable: Sized {
    fn expose(occupant: Occupant, at: Vec2) -> Option<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallTarget {
    pub at: Vec2,
}

impl Interactable for WallTarget {
    fn expose(occupant: Occupant, at: Vec2) -> Option<Self> {
        match occupant {
            Occupant::Wall => Some(Self { at }),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerTarget {
    pub at: Vec2,
}

impl Interactable for PlayerTarget {
    fn expose(occupant: Occupant, at: Vec2) -> Option<Self> {
        match occupant {
            Occupant::Player => Some(Self { at }),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    WallDamaged { at: Vec2, hp: i32 },
    WallDestroyed { at: Vec2 },
    PlayerHit { damage: i32, food: i32 },
    Ignored,
}

pub trait BlockedHandler {
    type Target: Interactable;

    fn on_blocked(&mut self, target: Self::Target, board: &mut Board) -> Interaction;
}

#[derive(Clone, Copy, Debug)]
pub struct WallChopper {
    pub damage: i32,
}

impl BlockedHandler for WallChopper {
    type Target = WallTarget;

    fn on_blocked(&mut self, target: WallTarget, board: &mut Board) -> Interaction {
        match board.damage_wall(target.at, self.damage) {
            Some(WallHit::Damaged { hp }) => Interaction::WallDamaged { at: target.at, hp },
            Some(WallHit::Destroyed) => Interaction::WallDestroyed { at: target.at },
            None => Interaction::Ignored,
        }
    }
}

#[derive(Debug)]
pub struct PlayerStriker<'a> {
    pub damage: i32,
    pub food: &'a mut i32,
}

impl BlockedHandler for PlayerStriker<'_> {
    type Target = PlayerTarget;

    fn on_blocked(&mut self, _target: PlayerTarget, _board: &mut Board) -> Interaction {
        *self.food -= self.damage;
        Interaction::PlayerHit {
            damage: self.damage,
            food: *self.food,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: Vec2, to: Vec2 },
    /// Path was clear but the mover was still mid-relocation.
    Stalled,
    Interacted { at: Vec2, interaction: Interaction },
    Blocked { at: Vec2, by: Occupant },
}

impl MoveOutcome {
    /// True when nothing occupied the target cell, whether or not the mover
    /// actually relocated.
    pub fn is_unobstructed(&self) -> bool {
        matches!(self, Self::Moved { .. } | Self::Stalled)
    }

    pub fn moved_to(&self) -> Option<Vec2> {
        match self {
            Self::Moved { to, .. } => Some(*to),
            _ => None,
        }
    }
}

pub fn attempt_move<H: BlockedHandler>(
    board: &mut Board,
    body: &mut Body,
    dir: Direction,
    now_ms: u64,
    handler: &mut H,
) -> MoveOutcome {
    let from = body.pos;
    let target = from.offset(dir);
    let blocker = if target == from {
        None
    } else {
        board.occupant_at(target)
    };

    let Some(occupant) = blocker else {
        if body.is_moving(now_ms) {
            return MoveOutcome::Stalled;
        }
        if target != from {
            board.relocate_mover(from, target);
            body.pos = target;
        }
        body.motion = Some(Motion {
            from,
            to: target,
            started_at_ms: now_ms,
            duration_ms: body.move_time_ms,
        });
        return MoveOutcome::Moved { from, to: target };
    };

    match H::Target::expose(occupant, target) {
        Some(found) => MoveOutcome::Interacted {
            at: target,
            interaction: handler.on_blocked(found, board),
        },
        None => {
            trace!(mover = ?body.tag, blocker = ?occupant, at = %target, "blocked without interaction");
            MoveOutcome::Blocked {
                at: target,
                by: occupant,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Wall;
    use crate::grid::Grid;
    use crate::types::EnemyId;

    fn board_with_player(pos: Vec2) -> (Board, Body) {
        let grid = Grid::new(8, 8);
        let exit = grid.exit_position();
        let mut board = Board::new(grid, exit);
        board.place_mover(pos, Occupant::Player);
        (board, Body::new(Occupant::Player, pos, 100))
    }

    fn wall(hp: i32) -> Wall {
        Wall {
            hp,
            max_hp: hp,
            variant: 0,
        }
    }

    #[test]
    fn empty_cell_moves_and_starts_motion() {
        let (mut board, mut body) = board_with_player(Vec2::new(2, 2));
        let mut chopper = WallChopper { damage: 1 };
        let outcome = attempt_move(&mut board, &mut body, Direction::Right, 0, &mut chopper);

        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Vec2::new(2, 2),
                to: Vec2::new(3, 2)
            }
        );
        assert!(outcome.is_unobstructed());
        assert_eq!(body.pos, Vec2::new(3, 2));
        assert_eq!(board.mover_at(Vec2::new(3, 2)), Some(Occupant::Player));
        assert_eq!(board.mover_at(Vec2::new(2, 2)), None);
        assert!(body.is_moving(50));
        assert_eq!(body.render_position(50), (2.5, 2.0));
        assert!(!body.is_moving(100));
    }

    #[test]
    fn mid_motion_mover_stalls_on_clear_path() {
        let (mut board, mut body) = board_with_player(Vec2::new(2, 2));
        let mut chopper = WallChopper { damage: 1 };
        attempt_move(&mut board, &mut body, Direction::Up, 0, &mut chopper);
        let outcome = attempt_move(&mut board, &mut body, Direction::Up, 40, &mut chopper);

        assert_eq!(outcome, MoveOutcome::Stalled);
        assert!(outcome.is_unobstructed());
        assert_eq!(body.pos, Vec2::new(2, 3));
    }

    #[test]
    fn matching_blocker_gets_exactly_one_interaction() {
        let (mut board, mut body) = board_with_player(Vec2::new(2, 2));
        board.insert_wall(Vec2::new(2, 3), wall(4));
        let mut chopper = WallChopper { damage: 1 };
        let outcome = attempt_move(&mut board, &mut body, Direction::Up, 0, &mut chopper);

        assert_eq!(
            outcome,
            MoveOutcome::Interacted {
                at: Vec2::new(2, 3),
                interaction: Interaction::WallDamaged {
                    at: Vec2::new(2, 3),
                    hp: 3
                }
            }
        );
        assert!(!outcome.is_unobstructed());
        assert_eq!(body.pos, Vec2::new(2, 2));
        assert!(body.motion().is_none());
    }

    #[test]
    fn non_matching_blocker_changes_nothing() {
        let (mut board, mut body) = board_with_player(Vec2::new(2, 2));
        let enemy = Occupant::Enemy { id: EnemyId(0) };
        board.place_mover(Vec2::new(1, 2), enemy);
        let mut chopper = WallChopper { damage: 1 };
        let outcome = attempt_move(&mut board, &mut body, Direction::Left, 0, &mut chopper);

        assert_eq!(
            outcome,
            MoveOutcome::Blocked {
                at: Vec2::new(1, 2),
                by: enemy
            }
        );
        assert_eq!(body.pos, Vec2::new(2, 2));
        assert_eq!(board.mover_at(Vec2::new(1, 2)), Some(enemy));
        assert_eq!(board.mover_at(Vec2::new(2, 2)), Some(Occupant::Player));
    }

    #[test]
    fn border_blocks_without_interaction() {
        let (mut board, mut body) = board_with_player(Vec2::new(0, 0));
        let mut chopper = WallChopper { damage: 1 };
        let outcome = attempt_move(&mut board, &mut body, Direction::Down, 0, &mut chopper);
        assert_eq!(
            outcome,
            MoveOutcome::Blocked {
                at: Vec2::new(0, -1),
                by: Occupant::BorderWall
            }
        );
    }

    #[test]
    fn enemy_striker_takes_food_from_player() {
        let (mut board, _player) = board_with_player(Vec2::new(3, 3));
        let enemy_tag = Occupant::Enemy { id: EnemyId(0) };
        board.place_mover(Vec2::new(4, 3), enemy_tag);
        let mut enemy = Body::new(enemy_tag, Vec2::new(4, 3), 100);
        let mut food = 30;
        let mut striker = PlayerStriker {
            damage: 10,
            food: &mut food,
        };
        let outcome = attempt_move(&mut board, &mut enemy, Direction::Left, 0, &mut striker);

        assert_eq!(
            outcome,
            MoveOutcome::Interacted {
                at: Vec2::new(3, 3),
                interaction: Interaction::PlayerHit {
                    damage: 10,
                    food: 20
                }
            }
        );
        assert_eq!(food, 20);
        assert_eq!(enemy.pos, Vec2::new(4, 3));
    }

    #[test]
    fn enemy_is_not_interested_in_walls() {
        let (mut board, _player) = board_with_player(Vec2::new(0, 0));
        let enemy_tag = Occupant::Enemy { id: EnemyId(0) };
        board.place_mover(Vec2::new(4, 3), enemy_tag);
        board.insert_wall(Vec2::new(3, 3), wall(4));
        let mut enemy = Body::new(enemy_tag, Vec2::new(4, 3), 100);
        let mut food = 30;
        let mut striker = PlayerStriker {
            damage: 10,
            food: &mut food,
        };
        let outcome = attempt_move(&mut board, &mut enemy, Direction::Left, 0, &mut striker);

        assert_eq!(
            outcome,
            MoveOutcome::Blocked {
                at: Vec2::new(3, 3),
                by: Occupant::Wall
            }
        );
        assert_eq!(food, 30);
        assert_eq!(board.wall_at(Vec2::new(3, 3)).map(|wall| wall.hp), Some(4));
    }

    #[test]
    fn zero_direction_is_an_in_place_move() {
        let (mut board, mut body) = board_with_player(Vec2::new(2, 2));
        let mut chopper = WallChopper { damage: 1 };
        let outcome = attempt_move(&mut board, &mut body, Direction::None, 0, &mut chopper);
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Vec2::new(2, 2),
                to: Vec2::new(2, 2)
            }
        );
        assert_eq!(board.mover_at(Vec2::new(2, 2)), Some(Occupant::Player));
    }
}
