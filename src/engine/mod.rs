use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::body::Body;
use crate::config::SimulationConfig;
use crate::constants::{SPAWN_ORDER, UPDATE_ORDER};
use crate::error::Result;
use crate::ghost::{Ghost, GhostContext, Landmarks};
use crate::input::InputSource;
use crate::maze::Maze;
use crate::player::Player;
use crate::rng::Rng;
use crate::types::{
    ChaseStrategy, RoundEvent, RoundInit, RoundSummary, Snapshot, TileCoord, TileKind,
};

mod collisions;
mod release;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStats {
    pub pellets_eaten: u32,
    pub ghosts_captured: u32,
    pub lives_lost: u32,
}

/// Everything needed to resume a round exactly where it was left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub tiles: Vec<Vec<i32>>,
    pub initial_tiles: Vec<Vec<i32>>,
    pub player: Player,
    pub ghosts: Vec<Ghost>,
    pub rng: Rng,
    pub pellet_timer: f32,
    pub release_timer: f32,
    pub capture_value: u32,
    pub capture_chain: u32,
    pub global_dot_counter: Option<u32>,
    pub pellets_remaining: usize,
    pub lives: u32,
    pub level: u32,
    pub tick: u64,
    pub elapsed_seconds: f64,
    pub stats: RoundStats,
    pub ended: bool,
}

/// Round controller: owns the maze, the player and the pursuers and advances
/// them one frame at a time.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: SimulationConfig,

    maze: Maze,
    initial_maze: Maze,
    landmarks: Landmarks,
    player: Player,
    /// Update order; seniority scans walk it backwards.
    ghosts: Vec<Ghost>,
    rng: Rng,
    events: Vec<RoundEvent>,

    pellet_timer: f32,
    release_timer: f32,
    capture_value: u32,
    capture_chain: u32,
    global_dot_counter: Option<u32>,
    pellets_remaining: usize,

    lives: u32,
    level: u32,
    tick: u64,
    elapsed_seconds: f64,
    stats: RoundStats,
    ended: bool,
}

impl GameEngine {
    /// Consumes the spawn markers of `maze` and places every entity. Fails when
    /// a required marker is missing.
    pub fn new(config: SimulationConfig, mut maze: Maze) -> Result<Self> {
        config.validate()?;
        let player_tile = maze.consume_spawn_marker(TileKind::PlayerSpawn)?;
        let player = Player::new(Body::spawn_position(&maze, player_tile));

        let mut spawned = Vec::with_capacity(SPAWN_ORDER.len());
        for strategy in SPAWN_ORDER {
            let tile = maze.consume_spawn_marker(TileKind::PursuerSpawn)?;
            spawned.push(Ghost::new(strategy, Body::spawn_position(&maze, tile), &maze));
        }
        let ghosts: Vec<Ghost> = UPDATE_ORDER
            .into_iter()
            .filter_map(|strategy| {
                let idx = spawned.iter().position(|ghost| ghost.strategy == strategy)?;
                Some(spawned.swap_remove(idx))
            })
            .collect();

        let landmarks = Landmarks::locate(&maze)?;
        let pellets_remaining = maze.pellet_count();
        if pellets_remaining == 0 {
            warn!("maze has no pellets; the level can never be cleared");
        }

        Ok(Self {
            rng: Rng::new(config.seed),
            pellet_timer: 0.0,
            release_timer: config.release_timer_seconds,
            capture_value: config.ghost_capture_base_value,
            capture_chain: 0,
            global_dot_counter: None,
            pellets_remaining,
            lives: config.starting_lives,
            level: 1,
            tick: 0,
            elapsed_seconds: 0.0,
            stats: RoundStats::default(),
            ended: false,
            initial_maze: maze.clone(),
            config,
            maze,
            landmarks,
            player,
            ghosts,
            events: Vec::new(),
        })
    }

    pub fn from_state(config: SimulationConfig, state: RoundState) -> Result<Self> {
        config.validate()?;
        let maze = Maze::from_codes(&state.tiles, config.tile_size)?;
        let initial_maze = Maze::from_codes(&state.initial_tiles, config.tile_size)?;
        let landmarks = Landmarks::locate(&maze)?;
        Ok(Self {
            config,
            maze,
            initial_maze,
            landmarks,
            player: state.player,
            ghosts: state.ghosts,
            rng: state.rng,
            events: Vec::new(),
            pellet_timer: state.pellet_timer,
            release_timer: state.release_timer,
            capture_value: state.capture_value,
            capture_chain: state.capture_chain,
            global_dot_counter: state.global_dot_counter,
            pellets_remaining: state.pellets_remaining,
            lives: state.lives,
            level: state.level,
            tick: state.tick,
            elapsed_seconds: state.elapsed_seconds,
            stats: state.stats,
            ended: state.ended,
        })
    }

    pub fn save_state(&self) -> RoundState {
        RoundState {
            tiles: self.maze.to_codes(),
            initial_tiles: self.initial_maze.to_codes(),
            player: self.player.clone(),
            ghosts: self.ghosts.clone(),
            rng: self.rng.clone(),
            pellet_timer: self.pellet_timer,
            release_timer: self.release_timer,
            capture_value: self.capture_value,
            capture_chain: self.capture_chain,
            global_dot_counter: self.global_dot_counter,
            pellets_remaining: self.pellets_remaining,
            lives: self.lives,
            level: self.level,
            tick: self.tick,
            elapsed_seconds: self.elapsed_seconds,
            stats: self.stats.clone(),
            ended: self.ended,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn get_round_init(&self) -> RoundInit {
        self.maze.to_round_init()
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghost(&self, strategy: ChaseStrategy) -> Option<&Ghost> {
        self.ghosts.iter().find(|ghost| ghost.strategy == strategy)
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn pellet_timer(&self) -> f32 {
        self.pellet_timer
    }

    pub fn release_timer(&self) -> f32 {
        self.release_timer
    }

    pub fn global_dot_counter(&self) -> Option<u32> {
        self.global_dot_counter
    }

    pub fn pellets_remaining(&self) -> usize {
        self.pellets_remaining
    }

    pub fn frightened_active(&self) -> bool {
        self.pellet_timer > 0.0
    }

    /// One frame: player, then each pursuer followed by its collision check,
    /// then the shared timers.
    pub fn step(&mut self, delta_seconds: f32, input: &dyn InputSource) {
        if self.ended {
            return;
        }
        self.tick += 1;
        self.elapsed_seconds += f64::from(delta_seconds);

        self.update_player(delta_seconds, input);
        if self.update_ghosts(delta_seconds) {
            return;
        }
        self.update_frightened_timer(delta_seconds);
        self.update_release_timer(delta_seconds);
        self.check_level_cleared();
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let flashing = self.is_flashing();
        let snapshot = Snapshot {
            tick: self.tick,
            elapsed_ms: self.elapsed_ms(),
            pellet_timer_seconds: self.pellet_timer,
            release_timer_seconds: self.release_timer,
            lives: self.lives,
            level: self.level,
            pellets_remaining: self.pellets_remaining,
            player: self.player.view(&self.maze),
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| ghost.view(&self.maze, flashing))
                .collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> RoundSummary {
        RoundSummary {
            level: self.level,
            duration_ms: self.elapsed_ms(),
            ticks: self.tick,
            pellets_eaten: self.stats.pellets_eaten,
            ghosts_captured: self.stats.ghosts_captured,
            lives_lost: self.stats.lives_lost,
            ended: self.ended,
        }
    }

    fn elapsed_ms(&self) -> u64 {
        (self.elapsed_seconds * 1000.0) as u64
    }

    fn update_player(&mut self, delta_seconds: f32, input: &dyn InputSource) {
        let speed = self
            .player
            .speed(self.config.base_speed, self.frightened_active());
        if let Some(pickup) = self
            .player
            .update(&self.maze, input, speed, delta_seconds)
        {
            self.consume_pellet(pickup);
        }
    }

    /// Returns true when a fatal collision reset or ended the round.
    fn update_ghosts(&mut self, delta_seconds: f32) -> bool {
        let player_tile = self.player.current_tile(&self.maze);
        let player_direction = self.player.direction();

        for idx in 0..self.ghosts.len() {
            let partner_tile = self.partner_tile();
            let was_released = self.ghosts[idx].released;
            let ctx = GhostContext {
                maze: &self.maze,
                landmarks: &self.landmarks,
                player_tile,
                player_direction,
                partner_tile,
                global_dot_counter: self.global_dot_counter,
                base_speed: self.config.base_speed,
                delta_seconds,
            };
            self.ghosts[idx].update(&ctx, &mut self.rng);

            if !was_released && self.ghosts[idx].released {
                self.events.push(RoundEvent::GhostReleased {
                    ghost: self.ghosts[idx].strategy,
                });
            }
            if self.resolve_collision(idx) {
                return true;
            }
        }
        false
    }

    fn partner_tile(&self) -> TileCoord {
        self.ghost(ChaseStrategy::Direct)
            .map(|ghost| ghost.current_tile(&self.maze))
            .unwrap_or(self.landmarks.house_gate)
    }

    /// Puts every entity back on its spawn point and clears the timers.
    fn reset_entities(&mut self) {
        self.player.reset();
        for ghost in &mut self.ghosts {
            ghost.reset(&self.maze);
        }
        self.pellet_timer = 0.0;
        self.release_timer = self.config.release_timer_seconds;
        self.capture_value = self.config.ghost_capture_base_value;
        self.capture_chain = 0;
    }

    fn check_level_cleared(&mut self) {
        if self.pellets_remaining > 0 {
            return;
        }
        info!(level = self.level, tick = self.tick, "level cleared");
        self.events.push(RoundEvent::LevelCleared { level: self.level });
        self.maze = self.initial_maze.clone();
        self.pellets_remaining = self.maze.pellet_count();
        self.reset_entities();
        for ghost in &mut self.ghosts {
            ghost.dot_counter = 0;
        }
        self.global_dot_counter = None;
        self.level += 1;
    }
}
