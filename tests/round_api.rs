use pacman_round_engine::autopilot::Autopilot;
use pacman_round_engine::config::SimulationConfig;
use pacman_round_engine::constants::TICK_SECONDS;
use pacman_round_engine::engine::GameEngine;
use pacman_round_engine::input::HeldKeys;
use pacman_round_engine::maze::Maze;
use pacman_round_engine::scoreboard::Scoreboard;
use pacman_round_engine::types::{ChaseStrategy, PursuerState, RoundEvent, TileCoord, TileKind};

fn classic_engine(seed: u32) -> GameEngine {
    let config = SimulationConfig::with_seed(seed);
    let maze = Maze::classic(config.tile_size).expect("classic maze loads");
    GameEngine::new(config, maze).expect("engine builds")
}

#[test]
fn maze_file_round_trips_through_disk() {
    let maze = Maze::classic(8.0).expect("classic maze loads");
    let path = std::env::temp_dir().join(format!(
        "pacman-round-engine-maze-{}.json",
        std::process::id()
    ));
    maze.save_json_file(&path).expect("maze saves");
    let loaded = Maze::load_json_file(&path, 8.0).expect("maze loads back");
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.to_codes(), maze.to_codes());
    assert_eq!(loaded.screen_width(), 224.0);
    assert_eq!(loaded.screen_height(), 288.0);
}

#[test]
fn out_of_bounds_reads_are_open_air() {
    let mut maze = Maze::classic(8.0).expect("classic maze loads");
    let outside = TileCoord::new(-3, 500);
    assert_eq!(maze.get_tile(outside), TileKind::Air);
    maze.set_tile(outside, TileKind::Wall(12));
    assert_eq!(maze.get_tile(outside), TileKind::Air);
}

#[test]
fn idle_player_is_eventually_caught() {
    let mut engine = classic_engine(3);
    let idle = HeldKeys::default();
    let mut caught = false;
    for _ in 0..(60 * 120) {
        engine.step(TICK_SECONDS, &idle);
        let snapshot = engine.build_snapshot(true);
        if snapshot
            .events
            .iter()
            .any(|event| matches!(event, RoundEvent::PlayerCaught { .. }))
        {
            caught = true;
            break;
        }
    }
    assert!(caught);
    assert_eq!(engine.lives(), 2);
    assert_eq!(engine.global_dot_counter(), Some(0));
}

#[test]
fn restored_round_makes_the_same_decisions() {
    let mut engine = classic_engine(12);
    let mut pilot = Autopilot::new(12);
    for _ in 0..600 {
        pilot.think_for(&engine);
        engine.step(TICK_SECONDS, &pilot);
    }

    let text = serde_json::to_string(&engine.save_state()).expect("state serializes");
    let mut restored = GameEngine::from_state(
        engine.config.clone(),
        serde_json::from_str(&text).expect("state parses"),
    )
    .expect("state restores");
    let mut restored_pilot = pilot.clone();

    for _ in 0..600 {
        pilot.think_for(&engine);
        engine.step(TICK_SECONDS, &pilot);
        restored_pilot.think_for(&restored);
        restored.step(TICK_SECONDS, &restored_pilot);

        for strategy in [
            ChaseStrategy::Direct,
            ChaseStrategy::Ambush,
            ChaseStrategy::Flank,
            ChaseStrategy::Patrol,
        ] {
            let a = engine.ghost(strategy).expect("pursuer exists");
            let b = restored.ghost(strategy).expect("pursuer exists");
            assert_eq!(a.body, b.body);
            assert_eq!(a.state, b.state);
        }
    }
}

#[test]
fn autopilot_scores_points() {
    let mut engine = classic_engine(8);
    let mut pilot = Autopilot::new(8);
    let mut board = Scoreboard::new(&engine.config);
    for _ in 0..(60 * 20) {
        pilot.think_for(&engine);
        engine.step(TICK_SECONDS, &pilot);
        board.record_all(&engine.build_snapshot(true).events);
        if engine.is_ended() {
            break;
        }
    }
    assert!(board.small_pellets > 0);
    assert!(board.score >= 10);
}

#[test]
fn chasing_pursuers_leave_the_house() {
    let mut engine = classic_engine(21);
    let idle = HeldKeys::default();
    for _ in 0..120 {
        engine.step(TICK_SECONDS, &idle);
    }
    let direct = engine.ghost(ChaseStrategy::Direct).expect("pursuer exists");
    assert_eq!(direct.state, PursuerState::Chase);
    assert!(!direct.is_in_house(engine.maze()));
}

#[test]
fn pursuers_never_enter_walls() {
    for seed in 0..20 {
        let mut engine = classic_engine(seed);
        let mut pilot = Autopilot::new(seed);
        for _ in 0..(60 * 30) {
            pilot.think_for(&engine);
            engine.step(TICK_SECONDS, &pilot);
            for ghost in engine.ghosts() {
                let tile = ghost.current_tile(engine.maze());
                assert!(
                    !matches!(
                        engine.maze().get_tile(tile),
                        TileKind::Wall(_) | TileKind::NoTile
                    ),
                    "seed {seed} tick {} {:?} at {tile:?} in state {:?}",
                    engine.tick(),
                    ghost.strategy,
                    ghost.state
                );
            }
            if engine.is_ended() {
                break;
            }
        }
    }
}
