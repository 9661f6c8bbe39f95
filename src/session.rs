//! Real-time host for a [`GameEngine`].
//!
//! The engine only knows a logical clock; this loop feeds it wall time from a
//! tokio interval, forwards player commands from a channel and pushes events
//! and frames to a [`Presenter`].
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::engine::GameEngine;
use crate::error::Result;
use crate::types::{Direction, GameEvent, Phase, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Restart,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "r" | "restart" => Some(Self::Restart),
            other => Direction::parse_move(other).map(Self::Move),
        }
    }
}

pub trait Presenter {
    fn on_event(&mut self, event: &GameEvent);

    fn on_frame(&mut self, snapshot: &Snapshot);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    GameOver,
    InputClosed,
}

pub async fn run_session<P: Presenter>(
    engine: &mut GameEngine,
    commands: &mut mpsc::Receiver<Command>,
    presenter: &mut P,
    tick_ms: u64,
) -> Result<SessionEnd> {
    let mut ticker = interval(Duration::from_millis(tick_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();
    let mut last_phase = None;

    loop {
        flush(engine, presenter, &mut last_phase);
        if engine.is_game_over() {
            info!(level = engine.level(), "session ended by game over");
            return Ok(SessionEnd::GameOver);
        }

        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let dt_ms = now.duration_since(last_tick).as_millis() as u64;
                last_tick = now;
                engine.advance(dt_ms)?;
            }
            command = commands.recv() => match command {
                Some(Command::Move(dir)) => {
                    if engine.submit_input(dir).is_none() {
                        debug!(?dir, phase = ?engine.phase(), "move dropped");
                    }
                }
                Some(Command::Restart) => engine.restart()?,
                None => {
                    info!("input closed");
                    return Ok(SessionEnd::InputClosed);
                }
            },
        }
    }
}

fn flush<P: Presenter>(
    engine: &mut GameEngine,
    presenter: &mut P,
    last_phase: &mut Option<Phase>,
) {
    let snapshot = engine.build_snapshot(true);
    for event in &snapshot.events {
        presenter.on_event(event);
    }
    if !snapshot.events.is_empty() || *last_phase != Some(snapshot.phase) {
        *last_phase = Some(snapshot.phase);
        presenter.on_frame(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CountRange, GameSettings};
    use crate::types::Cue;

    #[derive(Default)]
    struct Recorder {
        events: Vec<GameEvent>,
        frames: usize,
    }

    impl Presenter for Recorder {
        fn on_event(&mut self, event: &GameEvent) {
            self.events.push(event.clone());
        }

        fn on_frame(&mut self, _snapshot: &Snapshot) {
            self.frames += 1;
        }
    }

    fn quiet_settings() -> GameSettings {
        GameSettings {
            wall_count: CountRange::new(0, 0),
            food_count: CountRange::new(0, 0),
            level_start_delay_ms: 0,
            ..GameSettings::default()
        }
    }

    #[test]
    fn commands_parse_moves_and_restart() {
        assert_eq!(Command::parse("w"), Some(Command::Move(Direction::Up)));
        assert_eq!(Command::parse("Left"), Some(Command::Move(Direction::Left)));
        assert_eq!(Command::parse(" r "), Some(Command::Restart));
        assert_eq!(Command::parse("quit"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_ends_the_session() {
        let mut engine = GameEngine::new(quiet_settings(), 9).expect("engine starts");
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(Command::Move(Direction::Right))
            .await
            .expect("receiver alive");
        drop(tx);

        let mut recorder = Recorder::default();
        let end = run_session(&mut engine, &mut rx, &mut recorder, 50)
            .await
            .expect("session runs");

        assert_eq!(end, SessionEnd::InputClosed);
        assert_eq!(engine.food(), 99);
        assert!(recorder.frames >= 1);
        assert!(recorder.events.iter().any(|event| matches!(
            event,
            GameEvent::PlayerMoved { .. }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn starving_move_ends_the_session_with_game_over() {
        let settings = GameSettings {
            initial_food: 1,
            ..quiet_settings()
        };
        let mut engine = GameEngine::new(settings, 9).expect("engine starts");
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(Command::Move(Direction::Up))
            .await
            .expect("receiver alive");

        let mut recorder = Recorder::default();
        let end = run_session(&mut engine, &mut rx, &mut recorder, 50)
            .await
            .expect("session runs");

        assert_eq!(end, SessionEnd::GameOver);
        let cues: Vec<Cue> = recorder.events.iter().filter_map(GameEvent::cue).collect();
        assert_eq!(cues.last(), Some(&Cue::GameOver));
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_drive_the_level_intro_on_wall_time() {
        let settings = GameSettings {
            level_start_delay_ms: 500,
            ..quiet_settings()
        };
        let mut engine = GameEngine::new(settings, 9).expect("engine starts");
        let (tx, mut rx) = mpsc::channel(4);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(600)).await;
            let _ = tx.send(Command::Move(Direction::Right)).await;
        });

        let mut recorder = Recorder::default();
        let end = run_session(&mut engine, &mut rx, &mut recorder, 50)
            .await
            .expect("session runs");

        assert_eq!(end, SessionEnd::InputClosed);
        assert!(engine.now_ms() >= 500);
        assert_eq!(engine.food(), 99);
        assert_eq!(engine.player_position().map(|pos| pos.x), Some(1));
    }
}
