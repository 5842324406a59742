use std::fs;
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::types::{Position, RoundInit, TileCoord, TileKind};

const CLASSIC_MAZE_JSON: &str = include_str!("../data/classic_maze.json");

/// Fixed-size toroidal tile grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    width: i32,
    height: i32,
    tile_size: f32,
    tiles: Vec<TileKind>,
}

impl Maze {
    pub fn from_codes(codes: &[Vec<i32>], tile_size: f32) -> Result<Self> {
        let height = codes.len();
        let width = codes.first().map(|row| row.len()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidMaze("maze has no tiles".to_string()));
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in codes.iter().enumerate() {
            if row.len() != width {
                return Err(EngineError::InvalidMaze(format!(
                    "row {y} has {} tiles, expected {width}",
                    row.len()
                )));
            }
            for (x, code) in row.iter().enumerate() {
                let kind = TileKind::from_code(*code).ok_or_else(|| {
                    EngineError::InvalidMaze(format!("unknown tile code {code} at ({x}, {y})"))
                })?;
                tiles.push(kind);
            }
        }

        Ok(Self {
            width: width as i32,
            height: height as i32,
            tile_size,
            tiles,
        })
    }

    pub fn from_json_str(text: &str, tile_size: f32) -> Result<Self> {
        let codes: Vec<Vec<i32>> = serde_json::from_str(text)?;
        Self::from_codes(&codes, tile_size)
    }

    pub fn load_json_file(path: &Path, tile_size: f32) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, tile_size)
    }

    /// The 28x36 arcade layout shipped with the crate.
    pub fn classic(tile_size: f32) -> Result<Self> {
        Self::from_json_str(CLASSIC_MAZE_JSON, tile_size)
    }

    pub fn to_codes(&self) -> Vec<Vec<i32>> {
        self.tiles
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|kind| kind.code()).collect())
            .collect()
    }

    pub fn to_json_string(&self) -> String {
        let rows: Vec<String> = self
            .to_codes()
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.iter().map(|code| code.to_string()).collect();
                format!("  [{}]", cells.join(","))
            })
            .collect();
        format!("[\n{}\n]\n", rows.join(",\n"))
    }

    pub fn save_json_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_string()).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_round_init(&self) -> RoundInit {
        RoundInit {
            width: self.width,
            height: self.height,
            tile_size: self.tile_size,
            tiles: self.to_codes(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn screen_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn screen_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    pub fn is_in_bounds(&self, coord: TileCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    /// Out-of-bounds reads are routine (tunnels, edge lookahead) and yield `Air`.
    pub fn get_tile(&self, coord: TileCoord) -> TileKind {
        if !self.is_in_bounds(coord) {
            return TileKind::Air;
        }
        self.tiles[self.index(coord)]
    }

    pub fn set_tile(&mut self, coord: TileCoord, kind: TileKind) {
        if !self.is_in_bounds(coord) {
            return;
        }
        let idx = self.index(coord);
        self.tiles[idx] = kind;
    }

    /// First cell of `kind` in row-major order.
    pub fn find_tile(&self, kind: TileKind) -> Result<TileCoord> {
        self.tiles
            .iter()
            .position(|tile| *tile == kind)
            .map(|idx| self.coord_of(idx))
            .ok_or(EngineError::TileNotFound(kind))
    }

    pub fn count_tiles(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| **tile == kind).count()
    }

    pub fn pellet_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.pellet().is_some()).count()
    }

    pub fn pellet_cells(&self) -> Vec<TileCoord> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.pellet().is_some())
            .map(|(idx, _)| self.coord_of(idx))
            .collect()
    }

    pub fn wrap(&self, coord: TileCoord) -> TileCoord {
        coord.wrapped(self.width, self.height)
    }

    /// `floor(position / tileSize)`, each axis wrapped to the grid.
    pub fn tile_coordinates(&self, position: Position) -> TileCoord {
        let x = (position.x / self.tile_size).floor() as i32;
        let y = (position.y / self.tile_size).floor() as i32;
        self.wrap(TileCoord::new(x, y))
    }

    pub fn tile_center(&self, coord: TileCoord) -> Position {
        Position::new(
            (coord.x as f32 + 0.5) * self.tile_size,
            (coord.y as f32 + 0.5) * self.tile_size,
        )
    }

    /// Player collision test. Off-grid cells never block, which keeps the
    /// tunnels open.
    pub fn blocks_player(&self, coord: TileCoord) -> bool {
        self.is_in_bounds(coord) && !self.get_tile(coord).is_player_transparent()
    }

    /// Consumes the first spawn marker of `kind`. Pursuer markers touching the
    /// house become house interior so the house stays sealed.
    pub fn consume_spawn_marker(&mut self, kind: TileKind) -> Result<TileCoord> {
        let coord = self.find_tile(kind)?;
        let touches_house = [
            TileCoord::new(coord.x - 1, coord.y),
            TileCoord::new(coord.x + 1, coord.y),
            TileCoord::new(coord.x, coord.y - 1),
            TileCoord::new(coord.x, coord.y + 1),
        ]
        .into_iter()
        .any(|neighbor| self.get_tile(neighbor) == TileKind::HouseInterior);

        let replacement = if kind == TileKind::PursuerSpawn && touches_house {
            TileKind::HouseInterior
        } else {
            TileKind::Air
        };
        self.set_tile(coord, replacement);
        Ok(coord)
    }

    fn index(&self, coord: TileCoord) -> usize {
        (coord.y * self.width + coord.x) as usize
    }

    fn coord_of(&self, idx: usize) -> TileCoord {
        TileCoord::new(idx as i32 % self.width, idx as i32 / self.width)
    }
}
