use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::constants::{
    get_player_speed_multiplier, LARGE_PELLET_FREEZE_FRAMES, SMALL_PELLET_FREEZE_FRAMES,
};
use crate::input::{read_queued_direction, InputSource};
use crate::maze::Maze;
use crate::types::{Direction, PelletKind, PlayerView, Position, TileCoord};

pub const PLAYER_SPRITE_SIZE: f32 = 13.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PelletPickup {
    pub tile: TileCoord,
    pub kind: PelletKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub freeze_frames: u32,
}

impl Player {
    pub fn new(start_position: Position) -> Self {
        Self {
            body: Body::new(start_position, PLAYER_SPRITE_SIZE),
            freeze_frames: 0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.body.direction
    }

    pub fn current_tile(&self, maze: &Maze) -> TileCoord {
        self.body.current_tile(maze)
    }

    pub fn speed(&self, base_speed: f32, frightened_active: bool) -> f32 {
        base_speed * get_player_speed_multiplier(frightened_active)
    }

    /// Advances one frame. The maze is only read here; a returned pickup must
    /// be applied by the caller before anything else observes the grid.
    pub fn update(
        &mut self,
        maze: &Maze,
        input: &dyn InputSource,
        speed: f32,
        delta_seconds: f32,
    ) -> Option<PelletPickup> {
        let current_tile = self.current_tile(maze);

        if maze.is_in_bounds(current_tile) {
            if let Some(dir) = read_queued_direction(input) {
                self.body.queued_direction = dir;
            }
            let queued_tile = current_tile.step(self.body.queued_direction);
            if !maze.blocks_player(queued_tile) {
                self.body.direction = self.body.queued_direction;
                self.body.align_across(maze, self.body.direction);
            }
        }

        if self.freeze_frames > 0 {
            self.freeze_frames -= 1;
            return None;
        }

        self.move_or_stop(maze, speed * delta_seconds)
    }

    fn move_or_stop(&mut self, maze: &Maze, distance: f32) -> Option<PelletPickup> {
        let current_tile = self.current_tile(maze);
        let next_tile = self.body.next_tile_coordinates(maze);

        if maze.blocks_player(current_tile) || maze.blocks_player(next_tile) {
            self.body.align_to_grid(maze, true, true);
            self.body.direction = Direction::None;
            self.body.queued_direction = Direction::None;
            return None;
        }

        self.body.advance(maze, distance);
        let kind = maze.get_tile(current_tile).pellet()?;
        self.freeze_frames = match kind {
            PelletKind::Small => SMALL_PELLET_FREEZE_FRAMES,
            PelletKind::Large => LARGE_PELLET_FREEZE_FRAMES,
        };
        Some(PelletPickup {
            tile: current_tile,
            kind,
        })
    }

    pub fn reset(&mut self) {
        self.body.reset();
        self.freeze_frames = 0;
    }

    pub fn view(&self, maze: &Maze) -> PlayerView {
        let position = self.body.position();
        PlayerView {
            x: position.x,
            y: position.y,
            rect: self.body.rect(),
            tile: self.current_tile(maze),
            dir: self.body.direction,
            freeze_frames: self.freeze_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::HeldKeys;

    // 5x3 corridor: walls on top and bottom, pellets in the middle row.
    fn corridor() -> Maze {
        Maze::from_codes(
            &[
                vec![12, 12, 12, 12, 12],
                vec![0, 1, 2, 0, 0],
                vec![12, 12, 12, 12, 12],
            ],
            8.0,
        )
        .expect("valid maze")
    }

    fn player_at(maze: &Maze, tile: TileCoord) -> Player {
        Player::new(maze.tile_center(tile))
    }

    #[test]
    fn queued_turn_into_wall_is_not_committed() {
        let maze = corridor();
        let mut player = player_at(&maze, TileCoord::new(3, 1));
        player.update(&maze, &HeldKeys::only(Direction::Up), 60.0, 1.0 / 60.0);
        assert_eq!(player.direction(), Direction::None);
        assert_eq!(player.body.queued_direction, Direction::Up);
    }

    #[test]
    fn eating_small_pellet_freezes_one_frame() {
        let maze = corridor();
        let mut player = player_at(&maze, TileCoord::new(1, 1));
        let pickup = player.update(&maze, &HeldKeys::only(Direction::Left), 60.0, 1.0 / 60.0);
        assert_eq!(
            pickup,
            Some(PelletPickup {
                tile: TileCoord::new(1, 1),
                kind: PelletKind::Small,
            })
        );
        assert_eq!(player.freeze_frames, SMALL_PELLET_FREEZE_FRAMES);

        let before = player.body.position();
        assert_eq!(player.update(&maze, &HeldKeys::default(), 60.0, 1.0 / 60.0), None);
        assert_eq!(player.body.position(), before);
        assert_eq!(player.freeze_frames, 0);
    }

    #[test]
    fn large_pellet_freezes_three_frames() {
        let maze = corridor();
        let mut player = player_at(&maze, TileCoord::new(2, 1));
        let pickup = player.update(&maze, &HeldKeys::only(Direction::Right), 60.0, 1.0 / 60.0);
        assert_eq!(pickup.map(|p| p.kind), Some(PelletKind::Large));
        assert_eq!(player.freeze_frames, LARGE_PELLET_FREEZE_FRAMES);
    }

    #[test]
    fn moving_into_wall_stops_and_recentres() {
        let maze = Maze::from_codes(
            &[vec![12, 12, 12], vec![12, 0, 12], vec![12, 12, 12]],
            8.0,
        )
        .expect("valid maze");
        let mut player = Player::new(Position::new(11.0, 13.0));
        player.body.direction = Direction::Right;
        player.body.queued_direction = Direction::Right;
        player.update(&maze, &HeldKeys::default(), 60.0, 1.0 / 60.0);
        assert_eq!(player.direction(), Direction::None);
        assert_eq!(player.body.queued_direction, Direction::None);
        assert_eq!(player.body.position(), Position::new(12.0, 12.0));
    }

    #[test]
    fn player_runs_through_tunnel_edge() {
        let maze = corridor();
        let mut player = Player::new(Position::new(1.0, 12.0));
        for _ in 0..3 {
            player.update(&maze, &HeldKeys::only(Direction::Left), 60.0, 1.0 / 60.0);
        }
        assert_eq!(player.direction(), Direction::Left);
        assert!(player.body.position().x > 30.0);
        assert_eq!(player.current_tile(&maze), TileCoord::new(4, 1));
    }

    #[test]
    fn view_carries_hitbox_around_position() {
        let maze = corridor();
        let view = player_at(&maze, TileCoord::new(1, 1)).view(&maze);
        assert_eq!((view.x, view.y), (12.0, 12.0));
        assert_eq!(view.rect.left, 5.5);
        assert_eq!(view.rect.top, 5.5);
        assert_eq!(view.rect.width, PLAYER_SPRITE_SIZE);
    }

    #[test]
    fn frightened_timer_speeds_player_up() {
        let player = Player::new(Position::new(0.0, 0.0));
        assert_eq!(player.speed(60.0, false), 60.0);
        assert_eq!(player.speed(60.0, true), 67.5);
    }
}
