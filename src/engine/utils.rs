use crate::board::Board;
use crate::types::{Direction, EnemyKind, ItemKind, Vec2};

pub(super) fn manhattan(a: Vec2, b: Vec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Single-axis greedy step: vertical when already in the target's column,
/// horizontal otherwise.
pub(super) fn chase_direction(from: Vec2, to: Vec2) -> Direction {
    if from.x == to.x {
        Direction::from_axes(0, to.y - from.y)
    } else {
        Direction::from_axes(to.x - from.x, 0)
    }
}

pub(super) fn render_rows(
    board: &Board,
    player: Option<Vec2>,
    enemies: &[(Vec2, EnemyKind)],
) -> Vec<String> {
    let grid = board.grid();
    let mut rows = Vec::with_capacity((grid.rows() + 2) as usize);
    for y in (-1..=grid.rows()).rev() {
        let row: String = (-1..=grid.columns())
            .map(|x| render_cell(board, Vec2::new(x, y), player, enemies))
            .collect();
        rows.push(row);
    }
    rows
}

fn render_cell(
    board: &Board,
    pos: Vec2,
    player: Option<Vec2>,
    enemies: &[(Vec2, EnemyKind)],
) -> char {
    if board.grid().is_border(pos) {
        return '#';
    }
    if player == Some(pos) {
        return '@';
    }
    if let Some((_, kind)) = enemies.iter().find(|(at, _)| *at == pos) {
        return match kind {
            EnemyKind::Zombie => 'Z',
            EnemyKind::Vampire => 'V',
        };
    }
    if let Some(wall) = board.wall_at(pos) {
        return if wall.is_damaged() { 'w' } else { 'W' };
    }
    match board.item_at(pos) {
        Some(ItemKind::Food) => 'f',
        Some(ItemKind::Soda) => 's',
        None if board.is_exit(pos) => 'E',
        None => '.',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Wall;
    use crate::grid::Grid;

    #[test]
    fn chase_prefers_vertical_only_when_aligned() {
        let at = Vec2::new(3, 3);
        assert_eq!(chase_direction(at, Vec2::new(3, 6)), Direction::Up);
        assert_eq!(chase_direction(at, Vec2::new(3, 0)), Direction::Down);
        assert_eq!(chase_direction(at, Vec2::new(0, 6)), Direction::Left);
        assert_eq!(chase_direction(at, Vec2::new(5, 3)), Direction::Right);
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(manhattan(Vec2::new(0, 0), Vec2::new(6, 6)), 12);
        assert_eq!(manhattan(Vec2::new(2, 5), Vec2::new(4, 1)), 6);
    }

    #[test]
    fn rows_render_top_first_with_border_ring() {
        let grid = Grid::new(4, 3);
        let exit = grid.exit_position();
        let mut board = Board::new(grid, exit);
        board.insert_wall(
            Vec2::new(1, 1),
            Wall {
                hp: 3,
                max_hp: 4,
                variant: 0,
            },
        );
        board.insert_item(Vec2::new(1, 0), ItemKind::Food);

        let rows = render_rows(
            &board,
            Some(Vec2::new(0, 0)),
            &[(Vec2::new(3, 2), EnemyKind::Vampire)],
        );
        assert_eq!(
            rows,
            vec![
                "######".to_string(),
                "#...V#".to_string(),
                "#.wE.#".to_string(),
                "#@f..#".to_string(),
                "######".to_string(),
            ]
        );
    }
}
