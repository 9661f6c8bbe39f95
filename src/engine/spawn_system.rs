use super::*;
use crate::world::{generate_level, EnemySpawn, GeneratedLevel};

const PLAYER_START: Vec2 = Vec2::new(0, 0);

impl GameEngine {
    /// Generates the level named by `carry` and only then commits it along
    /// with every per-level piece of state. A failed generation leaves the
    /// engine as it was, carry included.
    pub(super) fn start_level(&mut self, carry: CarryOver) -> Result<()> {
        let generated = generate_level(carry.level, &self.settings, &mut self.rng)?;
        self.install_level(carry, generated);
        Ok(())
    }

    pub(super) fn install_level(&mut self, carry: CarryOver, generated: GeneratedLevel) {
        let GeneratedLevel {
            level,
            board,
            ground,
            enemy_spawns,
            report,
        } = generated;

        self.carry = carry;
        self.board = board;
        self.ground = ground;
        self.report = report;
        self.level_complete_at_ms = None;

        self.player = PlayerInternal {
            body: Body::new(
                Occupant::Player,
                PLAYER_START,
                self.settings.player_move_time_ms,
            ),
            food: self.carry.food,
            wall_damage: self.settings.wall_damage,
            active: true,
        };
        self.board.place_mover(PLAYER_START, Occupant::Player);

        self.enemies.clear();
        for spawn in enemy_spawns {
            self.register_enemy(spawn);
        }

        let delay = self.settings.level_start_delay_ms;
        self.phase = if delay == 0 {
            Phase::PlayerTurn
        } else {
            Phase::LevelStart {
                until_ms: self.now_ms.saturating_add(delay),
            }
        };

        info!(
            level,
            food = self.player.food,
            enemies = self.enemies.len(),
            walls = self.board.wall_count(),
            items = self.board.item_count(),
            "level started"
        );
        self.events.push(GameEvent::LevelStarted {
            level,
            enemies: self.enemies.len(),
        });
    }

    pub(super) fn advance_level(&mut self) -> Result<()> {
        self.start_level(CarryOver {
            level: self.carry.level + 1,
            food: self.player.food,
        })
    }

    fn register_enemy(&mut self, spawn: EnemySpawn) {
        let id = EnemyId(self.enemies.len());
        let tag = Occupant::Enemy { id };
        self.board.place_mover(spawn.pos, tag);
        self.enemies.push(EnemyInternal {
            id,
            kind: spawn.kind,
            body: Body::new(tag, spawn.pos, self.settings.enemy_move_time_ms),
            damage: self.settings.enemy_damage(spawn.kind),
            skip_next_action: false,
        });
    }
}
