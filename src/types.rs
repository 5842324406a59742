use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        self + dir.vector()
    }

    /// Straight-line distance in tiles.
    pub fn distance(self, other: TileCoord) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn wrapped(self, width: i32, height: i32) -> Self {
        Self {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        }
    }
}

impl Add for TileCoord {
    type Output = TileCoord;

    fn add(self, rhs: TileCoord) -> TileCoord {
        TileCoord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for TileCoord {
    type Output = TileCoord;

    fn sub(self, rhs: TileCoord) -> TileCoord {
        TileCoord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for TileCoord {
    type Output = TileCoord;

    fn mul(self, rhs: i32) -> TileCoord {
        TileCoord::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for TileCoord {
    type Output = TileCoord;

    fn neg(self) -> TileCoord {
        TileCoord::new(-self.x, -self.y)
    }
}

/// Continuous screen-space coordinate in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn advanced(self, dir: Direction, distance: f32) -> Self {
        let v = dir.vector();
        Self {
            x: self.x + v.x as f32 * distance,
            y: self.y + v.y as f32 * distance,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn vector(self) -> TileCoord {
        match self {
            Direction::Up => TileCoord::new(0, -1),
            Direction::Down => TileCoord::new(0, 1),
            Direction::Left => TileCoord::new(-1, 0),
            Direction::Right => TileCoord::new(1, 0),
            Direction::None => TileCoord::new(0, 0),
        }
    }

    /// Inverse of [`Direction::vector`]; anything that is not a unit grid
    /// vector maps to `None`.
    pub fn from_vector(v: TileCoord) -> Self {
        match (v.x, v.y) {
            (0, -1) => Direction::Up,
            (0, 1) => Direction::Down,
            (-1, 0) => Direction::Left,
            (1, 0) => Direction::Right,
            _ => Direction::None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Semantic kind of one maze cell. The integer codes are the maze file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    NoTile,
    Air,
    SmallPellet,
    LargePellet,
    HouseInterior,
    HouseGate,
    HouseFixedPoint,
    SlowZone,
    OneWayBarrier,
    OneWayBarrierPellet,
    PlayerSpawn,
    PursuerSpawn,
    PatrolRetreatPoint,
    Wall(i32),
}

impl TileKind {
    pub const FIRST_WALL_CODE: i32 = 12;

    pub fn from_code(code: i32) -> Option<Self> {
        let kind = match code {
            -1 => TileKind::NoTile,
            0 => TileKind::Air,
            1 => TileKind::SmallPellet,
            2 => TileKind::LargePellet,
            3 => TileKind::HouseInterior,
            4 => TileKind::HouseGate,
            5 => TileKind::HouseFixedPoint,
            6 => TileKind::SlowZone,
            7 => TileKind::OneWayBarrier,
            8 => TileKind::OneWayBarrierPellet,
            9 => TileKind::PlayerSpawn,
            10 => TileKind::PursuerSpawn,
            11 => TileKind::PatrolRetreatPoint,
            code if code >= Self::FIRST_WALL_CODE => TileKind::Wall(code),
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(self) -> i32 {
        match self {
            TileKind::NoTile => -1,
            TileKind::Air => 0,
            TileKind::SmallPellet => 1,
            TileKind::LargePellet => 2,
            TileKind::HouseInterior => 3,
            TileKind::HouseGate => 4,
            TileKind::HouseFixedPoint => 5,
            TileKind::SlowZone => 6,
            TileKind::OneWayBarrier => 7,
            TileKind::OneWayBarrierPellet => 8,
            TileKind::PlayerSpawn => 9,
            TileKind::PursuerSpawn => 10,
            TileKind::PatrolRetreatPoint => 11,
            TileKind::Wall(code) => code,
        }
    }

    pub fn pellet(self) -> Option<PelletKind> {
        match self {
            TileKind::SmallPellet | TileKind::OneWayBarrierPellet => Some(PelletKind::Small),
            TileKind::LargePellet => Some(PelletKind::Large),
            _ => None,
        }
    }

    /// What a pellet cell turns into once eaten.
    pub fn consumed(self) -> Self {
        match self {
            TileKind::OneWayBarrierPellet => TileKind::OneWayBarrier,
            TileKind::SmallPellet | TileKind::LargePellet => TileKind::Air,
            other => other,
        }
    }

    pub fn is_one_way_barrier(self) -> bool {
        matches!(
            self,
            TileKind::OneWayBarrier | TileKind::OneWayBarrierPellet
        )
    }

    pub fn is_player_transparent(self) -> bool {
        matches!(
            self,
            TileKind::Air
                | TileKind::SmallPellet
                | TileKind::LargePellet
                | TileKind::SlowZone
                | TileKind::OneWayBarrier
                | TileKind::OneWayBarrierPellet
        )
    }

    pub fn is_house(self) -> bool {
        matches!(
            self,
            TileKind::HouseInterior | TileKind::HouseFixedPoint | TileKind::HouseGate
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuerState {
    #[default]
    Home,
    Chase,
    Eaten,
    Reverse,
    Frightened,
}

impl PursuerState {
    pub fn is_vulnerable(self) -> bool {
        matches!(self, PursuerState::Frightened | PursuerState::Reverse)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChaseStrategy {
    Direct,
    Ambush,
    Flank,
    Patrol,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PelletKind {
    Small,
    Large,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    PelletEaten {
        kind: PelletKind,
        x: i32,
        y: i32,
    },
    FrightenedStarted {
        seconds: f32,
    },
    FrightenedEnded,
    GhostReleased {
        ghost: ChaseStrategy,
    },
    GhostCaptured {
        ghost: ChaseStrategy,
        points: u32,
        chain: u32,
    },
    PlayerCaught {
        ghost: ChaseStrategy,
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    LevelCleared {
        level: u32,
    },
    GameOver {
        level: u32,
    },
}

/// Axis-aligned hitbox in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub rect: Rect,
    pub tile: TileCoord,
    pub dir: Direction,
    #[serde(rename = "freezeFrames")]
    pub freeze_frames: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GhostView {
    pub strategy: ChaseStrategy,
    pub x: f32,
    pub y: f32,
    pub rect: Rect,
    pub tile: TileCoord,
    pub dir: Direction,
    pub state: PursuerState,
    pub released: bool,
    pub flashing: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoundInit {
    pub width: i32,
    pub height: i32,
    #[serde(rename = "tileSize")]
    pub tile_size: f32,
    pub tiles: Vec<Vec<i32>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    #[serde(rename = "pelletTimerSeconds")]
    pub pellet_timer_seconds: f32,
    #[serde(rename = "releaseTimerSeconds")]
    pub release_timer_seconds: f32,
    pub lives: u32,
    pub level: u32,
    #[serde(rename = "pelletsRemaining")]
    pub pellets_remaining: usize,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub events: Vec<RoundEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundSummary {
    pub level: u32,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub ticks: u64,
    #[serde(rename = "pelletsEaten")]
    pub pellets_eaten: u32,
    #[serde(rename = "ghostsCaptured")]
    pub ghosts_captured: u32,
    #[serde(rename = "livesLost")]
    pub lives_lost: u32,
    pub ended: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_codes_round_trip_for_known_kinds() {
        for code in -1..20 {
            let kind = TileKind::from_code(code).expect("code in range");
            assert_eq!(kind.code(), code);
        }
        assert_eq!(TileKind::from_code(-2), None);
    }

    #[test]
    fn direction_vectors_invert() {
        for dir in Direction::CARDINAL {
            assert_eq!(Direction::from_vector(dir.vector()), dir);
            assert_eq!(dir.opposite().vector(), -dir.vector());
        }
        assert_eq!(Direction::from_vector(TileCoord::new(2, 0)), Direction::None);
    }

    #[test]
    fn dotted_barrier_keeps_barrier_when_consumed() {
        assert_eq!(
            TileKind::OneWayBarrierPellet.consumed(),
            TileKind::OneWayBarrier
        );
        assert_eq!(TileKind::LargePellet.consumed(), TileKind::Air);
        assert_eq!(TileKind::OneWayBarrierPellet.pellet(), Some(PelletKind::Small));
    }

    #[test]
    fn round_event_serializes_with_type_tag() {
        let text = serde_json::to_string(&RoundEvent::PlayerCaught {
            ghost: ChaseStrategy::Flank,
            lives_left: 2,
        })
        .expect("event should serialize");
        assert_eq!(
            text,
            r#"{"type":"player_caught","ghost":"flank","livesLeft":2}"#
        );
    }
}
