use crate::engine::GameEngine;
use crate::ghost::Ghost;
use crate::input::{HeldKeys, InputSource};
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{Direction, PursuerState, TileCoord};

const ESCAPE_DISTANCE: i32 = 2;
const HUNT_DISTANCE: i32 = 6;

fn manhattan(a: TileCoord, b: TileCoord) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Scripted input source. Re-plans whenever the player reaches a new tile and
/// holds the chosen direction until then.
#[derive(Clone, Debug)]
pub struct Autopilot {
    rng: Rng,
    held: HeldKeys,
    planned_at: Option<TileCoord>,
}

impl Autopilot {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: Rng::new(seed),
            held: HeldKeys::default(),
            planned_at: None,
        }
    }

    pub fn held(&self) -> HeldKeys {
        self.held
    }

    pub fn think_for(&mut self, engine: &GameEngine) {
        let maze = engine.maze();
        let player_tile = engine.player().current_tile(maze);
        self.think(maze, player_tile, engine.ghosts());
    }

    pub fn think(&mut self, maze: &Maze, player_tile: TileCoord, ghosts: &[Ghost]) {
        if self.planned_at == Some(player_tile) {
            return;
        }
        self.planned_at = Some(player_tile);

        let threats: Vec<TileCoord> = ghosts
            .iter()
            .filter(|ghost| ghost.released && matches!(ghost.state, PursuerState::Chase))
            .map(|ghost| ghost.current_tile(maze))
            .collect();
        let prey: Vec<TileCoord> = ghosts
            .iter()
            .filter(|ghost| ghost.state.is_vulnerable())
            .map(|ghost| ghost.current_tile(maze))
            .collect();

        let nearest_threat = nearest_distance(player_tile, &threats);
        let dir = if nearest_threat.is_some_and(|dist| dist <= ESCAPE_DISTANCE) {
            self.choose_escape_direction(maze, player_tile, &threats)
        } else if nearest_distance(player_tile, &prey).is_some_and(|dist| dist <= HUNT_DISTANCE) {
            self.choose_chase_direction(maze, player_tile, &prey)
        } else {
            self.choose_pellet_direction(maze, player_tile, &threats)
        };

        self.held = if dir == Direction::None {
            HeldKeys::default()
        } else {
            HeldKeys::only(dir)
        };
    }

    fn open_directions(maze: &Maze, from: TileCoord) -> impl Iterator<Item = (Direction, TileCoord)> + '_ {
        Direction::CARDINAL.into_iter().filter_map(move |dir| {
            let next = from.step(dir);
            (!maze.blocks_player(next)).then(|| (dir, maze.wrap(next)))
        })
    }

    fn choose_pellet_direction(
        &mut self,
        maze: &Maze,
        from: TileCoord,
        threats: &[TileCoord],
    ) -> Direction {
        let nearest_pellet = maze
            .pellet_cells()
            .into_iter()
            .min_by_key(|cell| manhattan(from, *cell));

        let mut best = Direction::None;
        let mut best_score = f32::NEG_INFINITY;
        for (dir, next) in Self::open_directions(maze, from) {
            let mut score = 0.0;
            if maze.get_tile(next).pellet().is_some() {
                score += 12.0;
            }
            if let Some(pellet) = nearest_pellet {
                let before = manhattan(from, pellet);
                let after = manhattan(next, pellet);
                score += (before - after) as f32 * 0.9;
            }
            if let Some(threat_dist) = nearest_distance(next, threats) {
                score += threat_dist.min(10) as f32 * 0.15;
            }
            score += self.rng.next_f32() * 0.4;

            if score > best_score {
                best_score = score;
                best = dir;
            }
        }
        best
    }

    fn choose_escape_direction(
        &mut self,
        maze: &Maze,
        from: TileCoord,
        threats: &[TileCoord],
    ) -> Direction {
        let mut best = Direction::None;
        let mut best_dist = i32::MIN;
        for (dir, next) in Self::open_directions(maze, from) {
            let dist = nearest_distance(next, threats).unwrap_or(i32::MAX);
            if dist > best_dist {
                best_dist = dist;
                best = dir;
            }
        }
        best
    }

    fn choose_chase_direction(
        &mut self,
        maze: &Maze,
        from: TileCoord,
        prey: &[TileCoord],
    ) -> Direction {
        let mut best = Direction::None;
        let mut best_dist = i32::MAX;
        for (dir, next) in Self::open_directions(maze, from) {
            let dist = nearest_distance(next, prey).unwrap_or(i32::MAX);
            if dist < best_dist {
                best_dist = dist;
                best = dir;
            }
        }
        best
    }
}

fn nearest_distance(from: TileCoord, tiles: &[TileCoord]) -> Option<i32> {
    tiles.iter().map(|tile| manhattan(from, *tile)).min()
}

impl InputSource for Autopilot {
    fn is_held(&self, dir: Direction) -> bool {
        self.held.is_held(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChaseStrategy;

    // 7x3 corridor with pellets to the right only.
    fn corridor() -> Maze {
        Maze::from_codes(
            &[
                vec![12, 12, 12, 12, 12, 12, 12],
                vec![12, 0, 0, 0, 1, 1, 12],
                vec![12, 12, 12, 12, 12, 12, 12],
            ],
            8.0,
        )
        .expect("valid maze")
    }

    fn chasing(maze: &Maze, tile: TileCoord) -> Ghost {
        let mut ghost = Ghost::new(ChaseStrategy::Direct, maze.tile_center(tile), maze);
        ghost.state = PursuerState::Chase;
        ghost.released = true;
        ghost
    }

    #[test]
    fn heads_for_the_pellets() {
        let maze = corridor();
        let mut pilot = Autopilot::new(7);
        pilot.think(&maze, TileCoord::new(2, 1), &[]);
        assert!(pilot.is_held(Direction::Right));
        assert!(!pilot.is_held(Direction::Left));
    }

    #[test]
    fn never_picks_a_wall() {
        let maze = corridor();
        for seed in 0..16 {
            let mut pilot = Autopilot::new(seed);
            pilot.think(&maze, TileCoord::new(1, 1), &[]);
            assert!(!pilot.is_held(Direction::Up));
            assert!(!pilot.is_held(Direction::Down));
            assert!(!pilot.is_held(Direction::Left));
        }
    }

    #[test]
    fn runs_from_an_adjacent_pursuer() {
        let maze = corridor();
        let ghost = chasing(&maze, TileCoord::new(4, 1));
        let mut pilot = Autopilot::new(3);
        pilot.think(&maze, TileCoord::new(3, 1), &[ghost]);
        assert!(pilot.is_held(Direction::Left));
    }

    #[test]
    fn chases_a_frightened_pursuer() {
        let maze = corridor();
        let mut ghost = chasing(&maze, TileCoord::new(1, 1));
        ghost.state = PursuerState::Frightened;
        let mut pilot = Autopilot::new(3);
        pilot.think(&maze, TileCoord::new(3, 1), &[ghost]);
        assert!(pilot.is_held(Direction::Left));
    }

    #[test]
    fn keeps_plan_until_tile_changes() {
        let maze = corridor();
        let mut pilot = Autopilot::new(11);
        pilot.think(&maze, TileCoord::new(2, 1), &[]);
        let first = pilot.held();
        let ghost = chasing(&maze, TileCoord::new(3, 1));
        pilot.think(&maze, TileCoord::new(2, 1), &[ghost]);
        assert_eq!(pilot.held(), first);
    }
}
