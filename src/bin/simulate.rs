use chrono::{SecondsFormat, Utc};
use clap::Parser;
use pacman_round_engine::autopilot::Autopilot;
use pacman_round_engine::config::SimulationConfig;
use pacman_round_engine::engine::GameEngine;
use pacman_round_engine::error::EngineError;
use pacman_round_engine::maze::Maze;
use pacman_round_engine::scoreboard::Scoreboard;
use pacman_round_engine::types::{RoundEvent, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    seconds: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    match_id: Option<String>,
    /// Maze file (JSON array of tile-code rows); the classic maze by default.
    #[arg(long)]
    maze: Option<PathBuf>,
    /// SimulationConfig JSON; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seconds: u32,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    seconds: u32,
    reason: String,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    level: u32,
    score: u64,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "ghostsCaptured")]
    ghosts_captured: u32,
    #[serde(rename = "bestChain")]
    best_chain: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u32,
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
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: i64,
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at = now_iso();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, Utc::now().timestamp_millis()));

    let (base_config, maze) = match load_inputs(&cli) {
        Ok(inputs) => inputs,
        Err(error) => {
            emit_log(
                "error",
                "setup_failed",
                &match_id,
                None,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration_ms = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "seconds": scenario.seconds,
                "mazeWidth": maze.width(),
                "mazeHeight": maze.height(),
            }),
        );
        let config = SimulationConfig {
            seed: scenario.seed,
            ..base_config.clone()
        };
        let scenario_run = match run_scenario(&scenario, config, maze.clone()) {
            Ok(run) => run,
            Err(error) => {
                emit_log(
                    "error",
                    "scenario_failed",
                    &match_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_duration_ms += scenario_run.result.duration_ms;
        *reason_counts
            .entry(scenario_run.result.reason.clone())
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": scenario_run.result.reason,
                "durationMs": scenario_run.result.duration_ms,
                "score": scenario_run.result.score,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => {
                emit_log(
                    "error",
                    "result_serialize_failed",
                    &match_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        }
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        run_started_at,
        now_iso(),
        scenario_results,
        reason_counts,
        total_anomalies,
        total_duration_ms,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageDurationMs": summary.average_duration_ms,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn load_inputs(cli: &Cli) -> Result<(SimulationConfig, Maze), EngineError> {
    let config = match cli.config.as_deref() {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    let maze = match cli.maze.as_deref() {
        Some(path) => Maze::load_json_file(path, config.tile_size)?,
        None => Maze::classic(config.tile_size)?,
    };
    Ok((config, maze))
}

fn run_scenario(
    scenario: &Scenario,
    config: SimulationConfig,
    maze: Maze,
) -> Result<ScenarioRunResult, EngineError> {
    let frame_seconds = config.frame_seconds();
    let max_ticks = u64::from(scenario.seconds) * u64::from(config.fps.max(1));
    let mut scoreboard = Scoreboard::new(&config);
    let mut engine = GameEngine::new(config, maze)?;
    let mut autopilot = Autopilot::new(scenario.seed ^ 0x9e37_79b9);

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut levels_cleared = 0u32;
    let mut last_tick = 0u64;
    let mut last_score = 0u64;

    while !engine.is_ended() && engine.tick() < max_ticks {
        autopilot.think_for(&engine);
        engine.step(frame_seconds, &autopilot);
        let snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;

        scoreboard.record_all(&snapshot.events);
        levels_cleared += snapshot
            .events
            .iter()
            .filter(|event| matches!(event, RoundEvent::LevelCleared { .. }))
            .count() as u32;

        let mut messages = collect_snapshot_anomalies(&snapshot, engine.maze());
        if scoreboard.score < last_score {
            messages.push(format!(
                "score decreased: {last_score} -> {}",
                scoreboard.score
            ));
        }
        last_score = scoreboard.score;
        for message in messages {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
    }

    let summary = engine.build_summary();
    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            seconds: scenario.seconds,
            reason: end_reason_key(summary.ended).to_string(),
            duration_ms: summary.duration_ms,
            level: summary.level,
            score: scoreboard.score,
            pellets_eaten: summary.pellets_eaten,
            ghosts_captured: summary.ghosts_captured,
            best_chain: scoreboard.best_chain,
            lives_lost: summary.lives_lost,
            levels_cleared,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    })
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, maze: &Maze) -> Vec<String> {
    let mut anomalies = Vec::new();
    if !snapshot.pellet_timer_seconds.is_finite() || snapshot.pellet_timer_seconds < 0.0 {
        anomalies.push(format!(
            "invalid frightened timer: {}",
            snapshot.pellet_timer_seconds
        ));
    }
    if !snapshot.release_timer_seconds.is_finite() || snapshot.release_timer_seconds < 0.0 {
        anomalies.push(format!(
            "invalid release timer: {}",
            snapshot.release_timer_seconds
        ));
    }
    if snapshot.pellets_remaining > maze.width() as usize * maze.height() as usize {
        anomalies.push(format!(
            "pellet count out of range: {}",
            snapshot.pellets_remaining
        ));
    }

    let inside = |x: f32, y: f32| {
        x.is_finite()
            && y.is_finite()
            && (0.0..maze.screen_width()).contains(&x)
            && (0.0..maze.screen_height()).contains(&y)
    };
    if !inside(snapshot.player.x, snapshot.player.y) {
        anomalies.push(format!(
            "player outside screen: ({}, {})",
            snapshot.player.x, snapshot.player.y
        ));
    }
    for ghost in &snapshot.ghosts {
        if !inside(ghost.x, ghost.y) {
            anomalies.push(format!("pursuer outside screen: {:?}", ghost.strategy));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(
        cli.seed
            .unwrap_or_else(|| Utc::now().timestamp_millis().unsigned_abs()),
    );

    if cli.single || cli.seconds.is_some() {
        let seconds = cli.seconds.unwrap_or(120).clamp(1, 3_600);
        return vec![Scenario {
            name: format!("custom-{seconds}s"),
            seconds,
            seed,
        }];
    }

    vec![
        Scenario {
            name: "quick-check-60s".to_string(),
            seconds: 60,
            seed,
        },
        Scenario {
            name: "endurance-300s".to_string(),
            seconds: 300,
            seed: normalize_seed(u64::from(seed) + 1),
        },
    ]
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn end_reason_key(ended: bool) -> &'static str {
    if ended {
        "game_over"
    } else {
        "time_limit"
    }
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
    total_duration_ms: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_duration_ms = if scenario_count == 0 {
        0
    } else {
        total_duration_ms / scenario_count as u64
    };
    RunSummary {
        match_id,
        started_at,
        finished_at,
        scenario_count,
        anomaly_count,
        average_duration_ms,
        reason_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let now = Utc::now();
    let log_line = StructuredLogLine {
        timestamp_ms: now.timestamp_millis(),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(line) => eprintln!("{line}"),
        Err(error) => eprintln!("structured log failed to serialize: {error}"),
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
