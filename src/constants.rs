use crate::error::GameError;

pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const DEFAULT_COLUMNS: i32 = 8;
pub const DEFAULT_ROWS: i32 = 8;
pub const WALL_COUNT_MIN: i32 = 5;
pub const WALL_COUNT_MAX: i32 = 9;
pub const FOOD_COUNT_MIN: i32 = 1;
pub const FOOD_COUNT_MAX: i32 = 5;

pub const WALL_HIT_POINTS: i32 = 4;
pub const WALL_DAMAGE: i32 = 1;
pub const ZOMBIE_DAMAGE: i32 = 10;
pub const VAMPIRE_DAMAGE: i32 = 20;
pub const POINTS_PER_FOOD: i32 = 10;
pub const POINTS_PER_SODA: i32 = 20;
pub const INITIAL_FOOD: i32 = 100;
pub const STARTING_LEVEL: i32 = 1;

pub const PLAYER_MOVE_TIME_MS: u64 = 100;
pub const ENEMY_MOVE_TIME_MS: u64 = 100;
pub const TURN_DELAY_MS: u64 = 100;
pub const LEVEL_START_DELAY_MS: u64 = 2_000;
pub const RESTART_LEVEL_DELAY_MS: u64 = 1_000;

pub const FLOOR_VARIANTS: u8 = 8;
pub const BORDER_VARIANTS: u8 = 3;
pub const WALL_VARIANTS: u8 = 8;

/// Enemies per level grow with `floor(log2(level))`: none on level 1, one on
/// levels 2-3, two on 4-7 and so on.
pub fn enemy_count_for_level(level: i32) -> Result<usize, GameError> {
    if level <= 0 {
        return Err(GameError::InvalidLevel { level });
    }
    Ok((level as u32).ilog2() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_count_follows_floor_log2() {
        let expected = [(1, 0), (2, 1), (3, 1), (4, 2), (5, 2), (7, 2), (8, 3), (15, 3), (16, 4)];
        for (level, count) in expected {
            assert_eq!(
                enemy_count_for_level(level).expect("positive level"),
                count,
                "level {level}"
            );
        }
    }

    #[test]
    fn non_positive_levels_are_rejected() {
        assert!(matches!(
            enemy_count_for_level(0),
            Err(GameError::InvalidLevel { level: 0 })
        ));
        assert!(matches!(
            enemy_count_for_level(-3),
            Err(GameError::InvalidLevel { level: -3 })
        ));
    }
}
