use super::utils::manhattan;
use super::*;

const SIDES: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

impl GameEngine {
    /// Greedy route to the exit for headless runs. Walls count as passable
    /// because walking into one chops it; enemies and the border do not.
    pub fn suggest_player_direction(&self) -> Direction {
        let Some(pos) = self.player_position() else {
            return Direction::None;
        };
        let exit = self.board.exit();
        let horizontal = Direction::from_axes(exit.x - pos.x, 0);
        let vertical = Direction::from_axes(0, exit.y - pos.y);

        for dir in [horizontal, vertical] {
            if dir != Direction::None && self.is_passable(pos.offset(dir)) {
                return dir;
            }
        }

        // boxed in toward the exit: sidestep to the open cell closest to it
        let sidestep = SIDES
            .into_iter()
            .filter(|dir| self.is_passable(pos.offset(*dir)))
            .min_by_key(|dir| manhattan(pos.offset(*dir), exit));
        match sidestep {
            Some(dir) => dir,
            None if horizontal != Direction::None => horizontal,
            None => vertical,
        }
    }

    fn is_passable(&self, pos: Vec2) -> bool {
        matches!(self.board.occupant_at(pos), None | Some(Occupant::Wall))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{open_engine, settle};
    use super::*;
    use crate::board::Wall;

    #[test]
    fn heads_right_then_up_toward_the_exit() {
        let mut engine = open_engine(1);
        assert_eq!(engine.suggest_player_direction(), Direction::Right);

        engine.move_player_to(Vec2::new(6, 2));
        assert_eq!(engine.suggest_player_direction(), Direction::Up);
    }

    #[test]
    fn walls_are_chopped_through_not_avoided() {
        let mut engine = open_engine(1);
        engine.board.insert_wall(
            Vec2::new(1, 0),
            Wall {
                hp: 4,
                max_hp: 4,
                variant: 0,
            },
        );
        assert_eq!(engine.suggest_player_direction(), Direction::Right);
    }

    #[test]
    fn steps_around_an_enemy_in_the_way() {
        let mut engine = open_engine(2);
        engine.move_enemy_to(0, Vec2::new(1, 0));
        assert_eq!(engine.suggest_player_direction(), Direction::Up);
    }

    #[test]
    fn no_suggestion_once_the_player_has_left() {
        let mut engine = open_engine(1);
        engine.move_player_to(Vec2::new(6, 5));
        engine.submit_input(Direction::Up).expect("turn consumed");
        assert_eq!(engine.suggest_player_direction(), Direction::None);
    }

    #[test]
    fn autopilot_clears_an_open_level() {
        let mut engine = open_engine(1);
        for _ in 0..40 {
            if engine.level() == 2 {
                break;
            }
            let dir = engine.suggest_player_direction();
            if dir != Direction::None {
                engine.submit_input(dir);
            }
            settle(&mut engine);
        }
        assert_eq!(engine.level(), 2);
        assert_eq!(engine.food(), 88);
    }
}
