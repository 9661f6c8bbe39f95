use chrono::{SecondsFormat, Utc};
use clap::Parser;
use scavenger_core::config::GameSettings;
use scavenger_core::constants::TICK_MS;
use scavenger_core::engine::{GameEngine, RunStats};
use scavenger_core::error::GameError;
use scavenger_core::rng::random_seed;
use scavenger_core::types::{Phase, Snapshot, Vec2};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless autopilot runs of the scavenger grid")]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    level: Option<i32>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 2_000)]
    max_turns: u64,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    /// Emit log lines as JSON objects on stderr.
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    #[serde(rename = "startingLevel")]
    starting_level: i32,
    seed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum EndReason {
    GameOver,
    TurnLimit,
    SafetyLimit,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    #[serde(rename = "startingLevel")]
    starting_level: i32,
    reason: EndReason,
    #[serde(rename = "finalLevel")]
    final_level: i32,
    #[serde(rename = "finalFood")]
    final_food: i32,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    stats: RunStats,
    #[serde(rename = "exitOverlaps")]
    exit_overlaps: usize,
    #[serde(rename = "placementShortfall")]
    placement_shortfall: usize,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageFinalLevel")]
    average_final_level: f64,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let settings = match cli.config.as_deref().map(GameSettings::load).transpose() {
        Ok(settings) => settings.unwrap_or_default(),
        Err(error) => {
            error!(%error, "failed to load settings");
            std::process::exit(2);
        }
    };
    let scenarios = resolve_scenarios(&cli, &settings);
    let started_at = Utc::now();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, started_at.timestamp_millis()));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        info!(
            match_id = %match_id,
            scenario = %scenario.name,
            seed = scenario.seed,
            starting_level = scenario.starting_level,
            "scenario started"
        );
        let scenario_run = match run_scenario(&scenario, &settings, cli.max_turns) {
            Ok(run) => run,
            Err(error) => {
                error!(match_id = %match_id, scenario = %scenario.name, %error, "scenario failed");
                std::process::exit(2);
            }
        };

        for anomaly in &scenario_run.anomaly_records {
            warn!(
                match_id = %match_id,
                scenario = %scenario.name,
                seed = scenario.seed,
                tick = anomaly.tick,
                message = %anomaly.message,
                "anomaly detected"
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        *reason_counts
            .entry(end_reason_key(scenario_run.result.reason))
            .or_insert(0) += 1;

        info!(
            match_id = %match_id,
            scenario = %scenario.name,
            tick = scenario_run.finished_tick,
            reason = end_reason_key(scenario_run.result.reason),
            final_level = scenario_run.result.final_level,
            anomaly_count = scenario_run.anomaly_records.len(),
            "scenario finished"
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => warn!(%error, "scenario result did not serialize"),
        }
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        scenario_results,
        reason_counts,
        total_anomalies,
    );

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            error!(match_id = %match_id, path = %path.display(), %error, "summary write failed");
            std::process::exit(2);
        }
    }

    info!(
        match_id = %match_id,
        scenario_count = summary.scenario_count,
        anomaly_count = summary.anomaly_count,
        average_final_level = summary.average_final_level,
        summary_out = ?cli.summary_out,
        "run finished"
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_scenario(
    scenario: &Scenario,
    settings: &GameSettings,
    max_turns: u64,
) -> Result<ScenarioRunResult, GameError> {
    let settings = GameSettings {
        starting_level: scenario.starting_level,
        ..settings.clone()
    };
    let mut engine = GameEngine::new(settings, scenario.seed)?;

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut exit_overlaps = 0usize;
    let mut placement_shortfall = 0usize;
    let mut seen_level = None;
    let mut tick = 0u64;
    let tick_limit = max_turns.saturating_mul(100).saturating_add(10_000);
    let mut reason = EndReason::GameOver;

    while !engine.is_game_over() {
        if engine.is_awaiting_input() {
            if engine.stats().player_turns >= max_turns {
                reason = EndReason::TurnLimit;
                break;
            }
            engine.submit_input(engine.suggest_player_direction());
        }
        engine.advance(TICK_MS)?;
        tick += 1;

        if seen_level != Some(engine.level()) {
            seen_level = Some(engine.level());
            let report = engine.placement_report();
            exit_overlaps += usize::from(report.exit_overlap.is_some());
            placement_shortfall += report.walls.shortfall()
                + report.items.shortfall()
                + report.enemies.shortfall();
            let placed = report.walls.placed + report.items.placed + report.enemies.placed;
            let capacity = engine.board().grid().interior_capacity();
            if placed + report.free_after != capacity {
                push_anomaly(
                    &mut anomalies,
                    &mut anomaly_records,
                    &mut anomaly_seen,
                    tick,
                    format!(
                        "pool accounting mismatch: {placed} placed + {} free != {capacity}",
                        report.free_after
                    ),
                );
            }
        }

        let snapshot = engine.build_snapshot(true);
        for message in collect_snapshot_anomalies(&snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                tick,
                message,
            );
        }

        if tick > tick_limit {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                tick,
                "tick safety limit exceeded".to_string(),
            );
            reason = EndReason::SafetyLimit;
            break;
        }
    }

    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            starting_level: scenario.starting_level,
            reason,
            final_level: engine.level(),
            final_food: engine.food(),
            duration_ms: engine.now_ms(),
            stats: engine.stats(),
            exit_overlaps,
            placement_shortfall,
            anomalies,
        },
        anomaly_records,
        finished_tick: tick,
    })
}

fn collect_snapshot_anomalies(snapshot: &Snapshot) -> Vec<String> {
    let mut anomalies = Vec::new();

    if let Some(player) = &snapshot.player {
        if player.food <= 0 && snapshot.phase != Phase::GameOver {
            anomalies.push(format!("food {} outside game over", player.food));
        }
    }

    let mut movers: Vec<(String, Vec2)> = snapshot
        .enemies
        .iter()
        .map(|enemy| (enemy.id.to_string(), Vec2::new(enemy.x, enemy.y)))
        .collect();
    if let Some(player) = &snapshot.player {
        movers.push(("player".to_string(), Vec2::new(player.x, player.y)));
    }
    let mut occupied = HashSet::new();
    for (who, pos) in &movers {
        if !occupied.insert(*pos) {
            anomalies.push(format!("overlapping movers at {pos}: {who}"));
        }
        if snapshot.walls.iter().any(|wall| wall.x == pos.x && wall.y == pos.y) {
            anomalies.push(format!("{who} stands on a wall at {pos}"));
        }
    }

    for wall in &snapshot.walls {
        if wall.hp <= 0 {
            anomalies.push(format!("wall hp <= 0 remains at ({}, {})", wall.x, wall.y));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli, settings: &GameSettings) -> Vec<Scenario> {
    let seed = cli.seed.unwrap_or_else(random_seed);

    if cli.single || cli.level.is_some() {
        let level = cli.level.unwrap_or(settings.starting_level).max(1);
        return vec![Scenario {
            name: format!("custom-level{level}"),
            starting_level: level,
            seed,
        }];
    }

    vec![
        Scenario {
            name: "quick-check-level1".to_string(),
            starting_level: 1,
            seed,
        },
        Scenario {
            name: "crowded-check-level8".to_string(),
            starting_level: 8,
            seed: seed.wrapping_add(1),
        },
    ]
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at: String,
    finished_at: String,
    scenarios: Vec<ScenarioResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_final_level = if scenario_count == 0 {
        0.0
    } else {
        scenarios
            .iter()
            .map(|scenario| f64::from(scenario.final_level))
            .sum::<f64>()
            / scenario_count as f64
    };
    RunSummary {
        match_id,
        started_at,
        finished_at,
        scenario_count,
        anomaly_count,
        average_final_level,
        reason_counts,
        scenarios,
    }
}

fn end_reason_key(reason: EndReason) -> String {
    match reason {
        EndReason::GameOver => "game_over",
        EndReason::TurnLimit => "turn_limit",
        EndReason::SafetyLimit => "safety_limit",
    }
    .to_string()
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_scenario_result(reason: EndReason, final_level: i32) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            starting_level: 1,
            reason,
            final_level,
            final_food: 0,
            duration_ms: 60_000,
            stats: RunStats::default(),
            exit_overlaps: 0,
            placement_shortfall: 0,
            anomalies: Vec::new(),
        }
    }

    fn scenario(starting_level: i32, seed: u32) -> Scenario {
        Scenario {
            name: "test".to_string(),
            starting_level,
            seed,
        }
    }

    #[test]
    fn default_match_id_contains_seed_and_timestamp() {
        assert_eq!(default_match_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_calculates_average_final_level() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            "2026-01-01T00:00:00.000Z".to_string(),
            "2026-01-01T00:00:01.000Z".to_string(),
            vec![
                make_scenario_result(EndReason::GameOver, 3),
                make_scenario_result(EndReason::TurnLimit, 6),
            ],
            BTreeMap::from([
                ("game_over".to_string(), 1usize),
                ("turn_limit".to_string(), 1usize),
            ]),
            1,
        );
        assert_eq!(summary.average_final_level, 4.5);
        assert_eq!(summary.scenario_count, 2);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("scavenger-missing-{}", Utc::now().timestamp_millis()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            String::new(),
            String::new(),
            vec![make_scenario_result(EndReason::GameOver, 1)],
            BTreeMap::from([("game_over".to_string(), 1usize)]),
            0,
        );
        let result = write_summary(&target, &summary);
        assert!(result.is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            10,
            "same anomaly".to_string(),
        );
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            11,
            "same anomaly".to_string(),
        );

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tick, 10);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn autopilot_runs_finish_without_anomalies() {
        for (level, seed) in [(1, 7), (4, 99), (8, 2024)] {
            let run = run_scenario(&scenario(level, seed), &GameSettings::default(), 300)
                .expect("scenario runs");
            assert!(
                run.result.anomalies.is_empty(),
                "level {level} seed {seed}: {:?}",
                run.result.anomalies
            );
            assert_ne!(run.result.reason, EndReason::SafetyLimit);
            assert!(run.result.final_level >= level);
            assert!(run.result.stats.player_turns <= 300);
        }
    }

    #[test]
    fn same_seed_gives_same_result_line() {
        let a = run_scenario(&scenario(2, 5), &GameSettings::default(), 200).expect("runs");
        let b = run_scenario(&scenario(2, 5), &GameSettings::default(), 200).expect("runs");
        assert_eq!(
            serde_json::to_value(&a.result).expect("serializes"),
            serde_json::to_value(&b.result).expect("serializes")
        );
    }

    #[test]
    fn overlapping_movers_are_flagged() {
        let settings = GameSettings {
            starting_level: 2,
            level_start_delay_ms: 0,
            ..GameSettings::default()
        };
        let mut engine = GameEngine::new(settings, 3).expect("engine starts");
        let mut snapshot = engine.build_snapshot(false);
        assert!(collect_snapshot_anomalies(&snapshot).is_empty());

        let player = snapshot.player.clone().expect("player on board");
        snapshot.enemies[0].x = player.x;
        snapshot.enemies[0].y = player.y;
        let anomalies = collect_snapshot_anomalies(&snapshot);
        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0].starts_with("overlapping movers at (0, 0)"));
    }

    #[test]
    fn single_flag_builds_one_custom_scenario() {
        let cli = Cli::parse_from(["scavenger-simulate", "--level", "5", "--seed", "11"]);
        let scenarios = resolve_scenarios(&cli, &GameSettings::default());
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].name, "custom-level5");
        assert_eq!(scenarios[0].seed, 11);

        let cli = Cli::parse_from(["scavenger-simulate", "--seed", "11"]);
        let scenarios = resolve_scenarios(&cli, &GameSettings::default());
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[1].seed, 12);
    }
}
