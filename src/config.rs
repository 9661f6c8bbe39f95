use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BORDER_VARIANTS, DEFAULT_COLUMNS, DEFAULT_ROWS, ENEMY_MOVE_TIME_MS, FLOOR_VARIANTS,
    FOOD_COUNT_MAX, FOOD_COUNT_MIN, INITIAL_FOOD, LEVEL_START_DELAY_MS, PLAYER_MOVE_TIME_MS,
    POINTS_PER_FOOD, POINTS_PER_SODA, RESTART_LEVEL_DELAY_MS, STARTING_LEVEL, TURN_DELAY_MS,
    VAMPIRE_DAMAGE, WALL_COUNT_MAX, WALL_COUNT_MIN, WALL_DAMAGE, WALL_HIT_POINTS, WALL_VARIANTS,
    ZOMBIE_DAMAGE,
};
use crate::error::ConfigError;
use crate::rng::Rng;
use crate::types::{EnemyKind, ItemKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: i32,
    pub max: i32,
}

impl CountRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut Rng) -> usize {
        rng.range_inclusive(self.min, self.max).max(0) as usize
    }
}

/// Every tunable of a run. Missing keys in a settings file fall back to the
/// defaults, so a file only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    pub columns: i32,
    pub rows: i32,
    pub wall_count: CountRange,
    pub food_count: CountRange,
    pub wall_hit_points: i32,
    pub wall_damage: i32,
    pub zombie_damage: i32,
    pub vampire_damage: i32,
    pub points_per_food: i32,
    pub points_per_soda: i32,
    pub initial_food: i32,
    pub starting_level: i32,
    pub player_move_time_ms: u64,
    pub enemy_move_time_ms: u64,
    pub turn_delay_ms: u64,
    pub level_start_delay_ms: u64,
    pub restart_level_delay_ms: u64,
    pub floor_variants: u8,
    pub border_variants: u8,
    pub wall_variants: u8,
    /// Fail level generation instead of placing fewer objects when the
    /// free-position pool runs out.
    pub strict_placement: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            wall_count: CountRange::new(WALL_COUNT_MIN, WALL_COUNT_MAX),
            food_count: CountRange::new(FOOD_COUNT_MIN, FOOD_COUNT_MAX),
            wall_hit_points: WALL_HIT_POINTS,
            wall_damage: WALL_DAMAGE,
            zombie_damage: ZOMBIE_DAMAGE,
            vampire_damage: VAMPIRE_DAMAGE,
            points_per_food: POINTS_PER_FOOD,
            points_per_soda: POINTS_PER_SODA,
            initial_food: INITIAL_FOOD,
            starting_level: STARTING_LEVEL,
            player_move_time_ms: PLAYER_MOVE_TIME_MS,
            enemy_move_time_ms: ENEMY_MOVE_TIME_MS,
            turn_delay_ms: TURN_DELAY_MS,
            level_start_delay_ms: LEVEL_START_DELAY_MS,
            restart_level_delay_ms: RESTART_LEVEL_DELAY_MS,
            floor_variants: FLOOR_VARIANTS,
            border_variants: BORDER_VARIANTS,
            wall_variants: WALL_VARIANTS,
            strict_placement: false,
        }
    }
}

impl GameSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&raw)?;
        Ok(settings)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < 3 || self.rows < 3 {
            return Err(ConfigError::GridTooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }
        for (field, range) in [("wallCount", self.wall_count), ("foodCount", self.food_count)] {
            if range.min > range.max {
                return Err(ConfigError::InvalidRange {
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        let positive = [
            ("wallHitPoints", self.wall_hit_points as i64),
            ("wallDamage", self.wall_damage as i64),
            ("initialFood", self.initial_food as i64),
            ("startingLevel", self.starting_level as i64),
            ("floorVariants", self.floor_variants as i64),
            ("borderVariants", self.border_variants as i64),
            ("wallVariants", self.wall_variants as i64),
        ];
        for (field, value) in positive {
            if value <= 0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    pub fn enemy_damage(&self, kind: EnemyKind) -> i32 {
        match kind {
            EnemyKind::Zombie => self.zombie_damage,
            EnemyKind::Vampire => self.vampire_damage,
        }
    }

    pub fn item_points(&self, kind: ItemKind) -> i32 {
        match kind {
            ItemKind::Food => self.points_per_food,
            ItemKind::Soda => self.points_per_soda,
        }
    }
}
