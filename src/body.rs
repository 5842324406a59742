use serde::{Deserialize, Serialize};

use crate::maze::Maze;
use crate::types::{Direction, Position, Rect, TileCoord};

/// Movement state shared by the player and every pursuer: a continuous
/// position, the committed and queued directions, and a square hitbox kept
/// centred on the position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    position: Position,
    start_position: Position,
    size: f32,
    pub direction: Direction,
    pub queued_direction: Direction,
}

impl Body {
    pub fn new(start_position: Position, size: f32) -> Self {
        Self {
            position: start_position,
            start_position,
            size,
            direction: Direction::None,
            queued_direction: Direction::None,
        }
    }

    /// Spawn point for a marker tile: left edge of the tile, vertically
    /// centred, so the entity straddles the marker and its left neighbour.
    pub fn spawn_position(maze: &Maze, tile: TileCoord) -> Position {
        let size = maze.tile_size();
        Position::new(tile.x as f32 * size, tile.y as f32 * size + size / 2.0)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn start_position(&self) -> Position {
        self.start_position
    }

    /// Screen-space wraparound on both axes.
    pub fn set_position(&mut self, maze: &Maze, position: Position) {
        self.position = Position::new(
            position.x.rem_euclid(maze.screen_width()),
            position.y.rem_euclid(maze.screen_height()),
        );
    }

    pub fn rect(&self) -> Rect {
        Rect {
            left: self.position.x - self.size / 2.0,
            top: self.position.y - self.size / 2.0,
            width: self.size,
            height: self.size,
        }
    }

    pub fn current_tile(&self, maze: &Maze) -> TileCoord {
        maze.tile_coordinates(self.position)
    }

    /// Snaps the selected axes onto the centre of the current tile.
    pub fn align_to_grid(&mut self, maze: &Maze, x: bool, y: bool) {
        let center = maze.tile_center(self.current_tile(maze));
        if x {
            self.position.x = center.x;
        }
        if y {
            self.position.y = center.y;
        }
    }

    /// Snaps the axis perpendicular to `direction`; nothing for `None`.
    pub fn align_across(&mut self, maze: &Maze, direction: Direction) {
        self.align_to_grid(maze, direction.is_vertical(), direction.is_horizontal());
    }

    /// Tile the entity is heading into, wrapped to the grid.
    pub fn next_tile_coordinates(&self, maze: &Maze) -> TileCoord {
        maze.wrap(self.current_tile(maze).step(self.direction))
    }

    pub fn advance(&mut self, maze: &Maze, distance: f32) {
        let next = self.position.advanced(self.direction, distance);
        self.set_position(maze, next);
    }

    pub fn reset(&mut self) {
        self.position = self.start_position;
        self.direction = Direction::None;
        self.queued_direction = Direction::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Maze {
        Maze::from_codes(&[vec![0, 0, 0, 0], vec![0, 0, 0, 0]], 8.0).expect("valid maze")
    }

    #[test]
    fn leaving_left_edge_reappears_on_right() {
        let maze = corridor();
        let mut body = Body::new(Position::new(1.0, 4.0), 13.0);
        body.direction = Direction::Left;
        body.advance(&maze, 3.0);
        assert_eq!(body.position(), Position::new(30.0, 4.0));
        assert_eq!(body.current_tile(&maze), TileCoord::new(3, 0));

        body.direction = Direction::Right;
        body.advance(&maze, 4.0);
        assert_eq!(body.position(), Position::new(2.0, 4.0));
    }

    #[test]
    fn next_tile_wraps_through_the_tunnel() {
        let maze = corridor();
        let mut body = Body::new(Position::new(4.0, 4.0), 13.0);
        body.direction = Direction::Left;
        assert_eq!(body.next_tile_coordinates(&maze), TileCoord::new(3, 0));
        body.direction = Direction::Up;
        assert_eq!(body.next_tile_coordinates(&maze), TileCoord::new(0, 1));
    }

    #[test]
    fn align_only_touches_requested_axis() {
        let maze = corridor();
        let mut body = Body::new(Position::new(9.5, 10.0), 13.0);
        body.align_across(&maze, Direction::Up);
        assert_eq!(body.position(), Position::new(12.0, 10.0));
        body.align_to_grid(&maze, true, true);
        assert_eq!(body.position(), Position::new(12.0, 12.0));
    }

    #[test]
    fn spawn_position_straddles_marker_and_left_neighbour() {
        let maze = corridor();
        let spawn = Body::spawn_position(&maze, TileCoord::new(2, 1));
        assert_eq!(spawn, Position::new(16.0, 12.0));
    }

    #[test]
    fn rect_stays_centred_on_position() {
        let body = Body::new(Position::new(20.0, 20.0), 14.0);
        let rect = body.rect();
        assert_eq!(rect.left, 13.0);
        assert_eq!(rect.top, 13.0);
        assert_eq!(rect.width, 14.0);
    }
}
