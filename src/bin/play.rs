use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scavenger_core::config::GameSettings;
use scavenger_core::constants::TICK_MS;
use scavenger_core::engine::GameEngine;
use scavenger_core::error::GameError;
use scavenger_core::rng::random_seed;
use scavenger_core::session::{run_session, Command, Presenter, SessionEnd};
use scavenger_core::types::{GameEvent, Phase, Snapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play the scavenger grid in a terminal")]
struct Cli {
    /// JSON settings file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    level: Option<i32>,
    #[arg(long)]
    columns: Option<i32>,
    #[arg(long)]
    rows: Option<i32>,
    #[arg(long)]
    food: Option<i32>,
    #[arg(long, default_value_t = TICK_MS)]
    tick_ms: u64,
}

impl Cli {
    fn settings(&self) -> Result<GameSettings, GameError> {
        let mut settings = match self.config.as_deref() {
            Some(path) => GameSettings::load(path)?,
            None => GameSettings::default(),
        };
        if let Some(level) = self.level {
            settings.starting_level = level;
        }
        if let Some(columns) = self.columns {
            settings.columns = columns;
        }
        if let Some(rows) = self.rows {
            settings.rows = rows;
        }
        if let Some(food) = self.food {
            settings.initial_food = food;
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Prints the board after every change and cue names for the audio layer.
struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn on_event(&mut self, event: &GameEvent) {
        if let Some(cue) = event.cue() {
            println!("[sfx] {}", cue.name());
        }
        match event {
            GameEvent::LevelStarted { level, enemies } => {
                println!("== Day {level} ({enemies} enemies) ==");
            }
            GameEvent::ItemPicked { kind, points, .. } => {
                println!("+{points} food ({kind:?})");
            }
            GameEvent::EnemyAttacked { enemy, damage } => {
                println!("{enemy} bites for {damage}");
            }
            GameEvent::GameOver { level } => {
                println!("After {level} days, you starved. Type r to restart.");
            }
            _ => {}
        }
    }

    fn on_frame(&mut self, snapshot: &Snapshot) {
        if matches!(snapshot.phase, Phase::EnemyPhase { .. }) {
            return;
        }
        for row in &snapshot.tiles {
            println!("{row}");
        }
        if let Some(player) = &snapshot.player {
            println!("Food: {}", player.food);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "game aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), GameError> {
    let settings = cli.settings()?;
    let seed = cli.seed.unwrap_or_else(random_seed);
    info!(seed, "starting game");
    let mut engine = GameEngine::new(settings, seed)?;

    let (tx, mut rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match Command::parse(&line) {
                Some(command) => {
                    if tx.send(command).await.is_err() {
                        break;
                    }
                }
                None => eprintln!("moves: w/a/s/d or up/down/left/right, r to restart"),
            }
        }
    });

    let mut presenter = TerminalPresenter;
    loop {
        match run_session(&mut engine, &mut rx, &mut presenter, cli.tick_ms).await? {
            SessionEnd::InputClosed => return Ok(()),
            SessionEnd::GameOver => loop {
                match rx.recv().await {
                    Some(Command::Restart) => {
                        engine.restart()?;
                        break;
                    }
                    Some(Command::Move(_)) => println!("Type r to restart."),
                    None => return Ok(()),
                }
            },
        }
    }
}
