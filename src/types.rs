use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unit step on the grid. `Up` is `+y`: the exit corner sits at the top right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }

    /// Builds a step from raw axis input. Horizontal input wins, so diagonal
    /// input never produces a diagonal move.
    pub fn from_axes(horizontal: i32, vertical: i32) -> Self {
        match (horizontal.signum(), vertical.signum()) {
            (1, _) => Self::Right,
            (-1, _) => Self::Left,
            (_, 1) => Self::Up,
            (_, -1) => Self::Down,
            _ => Self::None,
        }
    }

    pub fn parse_move(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Some(Self::Up),
            "down" | "s" => Some(Self::Down),
            "left" | "a" => Some(Self::Left),
            "right" | "d" => Some(Self::Right),
            "none" | "." => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EnemyId(pub usize);

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enemy_{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Zombie,
    Vampire,
}

impl EnemyKind {
    pub const ALL: [Self; 2] = [Self::Zombie, Self::Vampire];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Food,
    Soda,
}

impl ItemKind {
    pub const ALL: [Self; 2] = [Self::Food, Self::Soda];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundKind {
    Floor,
    BorderWall,
}

/// Anything on the blocking layer. Items and the exit never block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Occupant {
    BorderWall,
    Wall,
    Player,
    Enemy { id: EnemyId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    LevelStart {
        #[serde(rename = "untilMs")]
        until_ms: u64,
    },
    PlayerTurn,
    EnemyPhase {
        #[serde(rename = "nextEnemy")]
        next_enemy: usize,
        #[serde(rename = "resumeAtMs")]
        resume_at_ms: u64,
    },
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Footstep,
    WallChopped,
    FoodEaten,
    SodaDrunk,
    EnemyAttack,
    GameOver,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Self::Footstep => "footstep",
            Self::WallChopped => "wall chopped",
            Self::FoodEaten => "food eaten",
            Self::SodaDrunk => "soda drunk",
            Self::EnemyAttack => "enemy attack",
            Self::GameOver => "game over",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    LevelStarted {
        level: i32,
        enemies: usize,
    },
    LevelCompleted {
        level: i32,
    },
    PlayerMoved {
        from: Vec2,
        to: Vec2,
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    EnemyMoved {
        enemy: EnemyId,
        from: Vec2,
        to: Vec2,
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    FoodChanged {
        food: i32,
        delta: i32,
    },
    WallDamaged {
        at: Vec2,
        hp: i32,
    },
    WallDestroyed {
        at: Vec2,
    },
    ItemPicked {
        at: Vec2,
        kind: ItemKind,
        points: i32,
    },
    EnemyAttacked {
        enemy: EnemyId,
        damage: i32,
    },
    GameOver {
        level: i32,
    },
    GameRestarted,
}

impl GameEvent {
    pub fn cue(&self) -> Option<Cue> {
        match self {
            Self::PlayerMoved { .. } => Some(Cue::Footstep),
            Self::WallDamaged { .. } | Self::WallDestroyed { .. } => Some(Cue::WallChopped),
            Self::ItemPicked {
                kind: ItemKind::Food,
                ..
            } => Some(Cue::FoodEaten),
            Self::ItemPicked {
                kind: ItemKind::Soda,
                ..
            } => Some(Cue::SodaDrunk),
            Self::EnemyAttacked { .. } => Some(Cue::EnemyAttack),
            Self::GameOver { .. } => Some(Cue::GameOver),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "renderX")]
    pub render_x: f32,
    #[serde(rename = "renderY")]
    pub render_y: f32,
    pub food: i32,
    pub moving: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub x: i32,
    pub y: i32,
    #[serde(rename = "renderX")]
    pub render_x: f32,
    #[serde(rename = "renderY")]
    pub render_y: f32,
    pub damage: i32,
    #[serde(rename = "skipNextAction")]
    pub skip_next_action: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct WallView {
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub damaged: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemView {
    pub x: i32,
    pub y: i32,
    pub kind: ItemKind,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub level: i32,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub phase: Phase,
    #[serde(rename = "levelCompleteAtMs")]
    pub level_complete_at_ms: Option<u64>,
    pub columns: i32,
    pub rows: i32,
    pub player: Option<PlayerView>,
    pub enemies: Vec<EnemyView>,
    pub walls: Vec<WallView>,
    pub items: Vec<ItemView>,
    pub exit: Vec2,
    pub tiles: Vec<String>,
    pub events: Vec<GameEvent>,
}
