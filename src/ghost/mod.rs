use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::body::Body;
use crate::constants::{get_dot_limit, get_ghost_speed_multiplier, get_global_dot_limit};
use crate::error::Result;
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{
    ChaseStrategy, Direction, GhostView, Position, PursuerState, TileCoord, TileKind,
};

pub mod targeting;

use self::targeting::{compute_chase_target, ChaseInputs};

pub const GHOST_SPRITE_SIZE: f32 = 14.0;

/// Fixed navigation points every pursuer needs, resolved once per maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmarks {
    pub house_gate: TileCoord,
    pub house_fixed_point: TileCoord,
    pub patrol_retreat: TileCoord,
}

impl Landmarks {
    pub fn locate(maze: &Maze) -> Result<Self> {
        Ok(Self {
            house_gate: maze.find_tile(TileKind::HouseGate)?,
            house_fixed_point: maze.find_tile(TileKind::HouseFixedPoint)?,
            patrol_retreat: maze.find_tile(TileKind::PatrolRetreatPoint)?,
        })
    }
}

/// Read-only view of the round a pursuer needs for one frame.
pub struct GhostContext<'a> {
    pub maze: &'a Maze,
    pub landmarks: &'a Landmarks,
    pub player_tile: TileCoord,
    pub player_direction: Direction,
    /// Tile of the direct pursuer, used by the flank strategy.
    pub partner_tile: TileCoord,
    /// Shared counter after a lost life; `None` while personal counters rule.
    pub global_dot_counter: Option<u32>,
    pub base_speed: f32,
    pub delta_seconds: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ghost {
    pub strategy: ChaseStrategy,
    pub body: Body,
    pub state: PursuerState,
    pub released: bool,
    pub dot_counter: u32,
    pub dot_limit: u32,
    pub global_dot_limit: u32,
    /// Tile whose entry triggers the next direction decision.
    pub next_tile: TileCoord,
}

impl Ghost {
    pub fn new(strategy: ChaseStrategy, start_position: Position, maze: &Maze) -> Self {
        let mut ghost = Self {
            strategy,
            body: Body::new(start_position, GHOST_SPRITE_SIZE),
            state: PursuerState::Home,
            released: false,
            dot_counter: 0,
            dot_limit: get_dot_limit(strategy),
            global_dot_limit: get_global_dot_limit(strategy),
            next_tile: TileCoord::default(),
        };
        ghost.reset(maze);
        ghost
    }

    pub fn current_tile(&self, maze: &Maze) -> TileCoord {
        self.body.current_tile(maze)
    }

    pub fn is_in_house(&self, maze: &Maze) -> bool {
        maze.get_tile(self.current_tile(maze)).is_house()
    }

    pub fn speed(&self, maze: &Maze, base_speed: f32) -> f32 {
        let on_slow_zone = maze.get_tile(self.current_tile(maze)) == TileKind::SlowZone;
        base_speed * get_ghost_speed_multiplier(self.state, on_slow_zone)
    }

    pub fn update(&mut self, ctx: &GhostContext<'_>, rng: &mut Rng) {
        self.check_release(ctx.global_dot_counter);

        if self.state == PursuerState::Home && self.released && !self.is_in_house(ctx.maze) {
            self.transition(PursuerState::Chase);
        }
        if self.state == PursuerState::Eaten && self.is_in_house(ctx.maze) {
            self.return_home(ctx.maze);
        }
        if !self.released {
            return;
        }

        if self.current_tile(ctx.maze) == self.next_tile {
            self.body.direction = self.body.queued_direction;
            self.next_tile = self.body.next_tile_coordinates(ctx.maze);
            self.choose_next_direction(ctx, rng);
        }

        let distance = self.speed(ctx.maze, ctx.base_speed) * ctx.delta_seconds;
        self.body.advance(ctx.maze, distance);
        self.body.align_across(ctx.maze, self.body.direction);
    }

    /// Opens the cage regardless of counters; used by the idle release timer.
    pub fn force_release(&mut self) {
        if !self.released {
            debug!(ghost = ?self.strategy, "pursuer released by timer");
        }
        self.released = true;
    }

    /// Starts a frightened period. Caged and eaten pursuers are unaffected.
    /// A decision still pending on the current tile is kept so the turn it
    /// commits stays legal.
    pub fn frighten(&mut self, maze: &Maze) {
        if matches!(self.state, PursuerState::Home | PursuerState::Eaten) {
            return;
        }
        self.transition(PursuerState::Reverse);
        if self.current_tile(maze) != self.next_tile {
            self.next_tile = self.body.next_tile_coordinates(maze);
        }
    }

    /// End of the frightened period.
    pub fn calm(&mut self) {
        if !matches!(self.state, PursuerState::Home | PursuerState::Eaten) {
            self.transition(PursuerState::Chase);
        }
    }

    pub fn eat(&mut self) {
        self.transition(PursuerState::Eaten);
    }

    /// Back to the spawn point, caged. The personal dot counter survives.
    pub fn reset(&mut self, maze: &Maze) {
        self.body.reset();
        self.body.queued_direction = Direction::Left;
        self.state = PursuerState::Home;
        self.released = false;
        self.next_tile = self.body.next_tile_coordinates(maze);
    }

    pub fn view(&self, maze: &Maze, flashing: bool) -> GhostView {
        let position = self.body.position();
        GhostView {
            strategy: self.strategy,
            x: position.x,
            y: position.y,
            rect: self.body.rect(),
            tile: self.current_tile(maze),
            dir: self.body.direction,
            state: self.state,
            released: self.released,
            flashing: flashing && self.state.is_vulnerable(),
        }
    }

    fn check_release(&mut self, global_dot_counter: Option<u32>) {
        if self.released {
            return;
        }
        let counter_ready = match global_dot_counter {
            Some(count) => count >= self.global_dot_limit,
            None => self.dot_counter >= self.dot_limit,
        };
        if self.state == PursuerState::Chase || (self.state == PursuerState::Home && counter_ready)
        {
            debug!(ghost = ?self.strategy, dots = self.dot_counter, "pursuer released");
            self.released = true;
        }
    }

    /// An eaten pursuer reaching the house becomes caged again in place and
    /// starts a fresh release cycle.
    fn return_home(&mut self, maze: &Maze) {
        self.transition(PursuerState::Home);
        self.released = false;
        self.dot_counter = 0;
        self.body.queued_direction = Direction::Left;
        self.next_tile = self.body.next_tile_coordinates(maze);
    }

    fn transition(&mut self, next: PursuerState) {
        if self.state != next {
            debug!(ghost = ?self.strategy, from = ?self.state, to = ?next, "pursuer state change");
        }
        self.state = next;
    }

    /// Decides the turn to take on entering `next_tile`. Reversal is never a
    /// candidate; a pending `Reverse` is the only way to turn around.
    fn choose_next_direction(&mut self, ctx: &GhostContext<'_>, rng: &mut Rng) {
        if !ctx.maze.is_in_bounds(self.next_tile) {
            return;
        }
        if self.state == PursuerState::Reverse {
            self.transition(PursuerState::Frightened);
            self.body.queued_direction = self.body.direction.opposite();
            return;
        }

        let from = self.current_tile(ctx.maze);
        let legal: Vec<TileCoord> = self
            .turn_candidates()
            .into_iter()
            .filter(|candidate| self.can_enter(ctx.maze, from, *candidate))
            .collect();

        let choice = match self.state {
            PursuerState::Frightened => rng.choose(&legal).copied(),
            _ => {
                let target = self.target_tile(ctx, from);
                nearest_to(&legal, target)
            }
        };
        if let Some(tile) = choice {
            self.body.queued_direction = Direction::from_vector(tile - self.next_tile);
        }
    }

    /// Straight on, then the two perpendicular neighbours of `next_tile`.
    fn turn_candidates(&self) -> [TileCoord; 3] {
        let dir = self.body.direction.vector();
        let perpendicular = TileCoord::new(dir.y, dir.x);
        [
            self.next_tile + dir,
            self.next_tile + perpendicular,
            self.next_tile - perpendicular,
        ]
    }

    fn target_tile(&self, ctx: &GhostContext<'_>, own_tile: TileCoord) -> TileCoord {
        match self.state {
            PursuerState::Home => ctx.landmarks.house_gate,
            PursuerState::Eaten => ctx.landmarks.house_fixed_point,
            PursuerState::Chase => compute_chase_target(
                self.strategy,
                &ChaseInputs {
                    player_tile: ctx.player_tile,
                    player_direction: ctx.player_direction,
                    own_tile,
                    partner_tile: ctx.partner_tile,
                    retreat_tile: ctx.landmarks.patrol_retreat,
                },
            ),
            PursuerState::Frightened | PursuerState::Reverse => {
                unreachable!("frightened pursuers pick turns at random")
            }
        }
    }

    fn can_enter(&self, maze: &Maze, from: TileCoord, candidate: TileCoord) -> bool {
        match maze.get_tile(candidate) {
            TileKind::HouseGate => matches!(self.state, PursuerState::Home | PursuerState::Eaten),
            kind if kind.is_one_way_barrier() => from.y <= candidate.y,
            TileKind::Air
            | TileKind::SmallPellet
            | TileKind::LargePellet
            | TileKind::HouseInterior
            | TileKind::HouseFixedPoint
            | TileKind::SlowZone => true,
            _ => false,
        }
    }
}

/// Closest candidate by straight-line distance; earlier candidates win ties.
fn nearest_to(candidates: &[TileCoord], target: TileCoord) -> Option<TileCoord> {
    let mut best: Option<(TileCoord, f32)> = None;
    for candidate in candidates {
        let distance = candidate.distance(target);
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((*candidate, distance));
        }
    }
    best.map(|(tile, _)| tile)
}
