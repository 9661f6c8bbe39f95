use std::path::PathBuf;

use thiserror::Error;

use crate::types::EnemyId;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("level {level} is invalid; levels start at 1")]
    InvalidLevel { level: i32 },

    #[error("free-position pool is exhausted")]
    ExhaustedPool,

    #[error("enemy {enemy} has no player to chase")]
    MissingTarget { enemy: EnemyId },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings")]
    Parse(#[from] serde_json::Error),

    #[error("{field} range is inverted: min {min} > max {max}")]
    InvalidRange {
        field: &'static str,
        min: i32,
        max: i32,
    },

    #[error("grid {columns}x{rows} is too small; both sides need at least 3 cells")]
    GridTooSmall { columns: i32, rows: i32 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: i64 },
}
