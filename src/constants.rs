use crate::types::{ChaseStrategy, PursuerState};

pub const FPS: u32 = 60;
pub const TICK_SECONDS: f32 = 1.0 / FPS as f32;

pub const TILE_SIZE: f32 = 8.0;
/// One pixel per frame at the nominal frame rate.
pub const BASE_SPEED: f32 = FPS as f32;

pub const PLAYER_FRIGHTENED_SPEED_MULTIPLIER: f32 = 1.125;
pub const SMALL_PELLET_FREEZE_FRAMES: u32 = 1;
pub const LARGE_PELLET_FREEZE_FRAMES: u32 = 3;

pub const GHOST_EATEN_SPEED_MULTIPLIER: f32 = 2.0;
pub const GHOST_FRIGHTENED_SPEED_MULTIPLIER: f32 = 0.625;
pub const GHOST_SLOW_ZONE_SPEED_MULTIPLIER: f32 = 0.5;
pub const GHOST_NORMAL_SPEED_MULTIPLIER: f32 = 0.9375;

pub const FRIGHTENED_SECONDS: f32 = 6.0;
pub const RELEASE_TIMER_SECONDS: f32 = 4.0;
pub const FLASH_TIME_MS: u64 = 1_500;
pub const FLASH_INTERVAL_MS: u64 = 300;

pub const AMBUSH_LOOKAHEAD_TILES: i32 = 4;
pub const FLANK_LOOKAHEAD_TILES: i32 = 2;
pub const PATROL_RETREAT_DISTANCE: f32 = 8.0;

pub const GHOST_CAPTURE_BASE_VALUE: u32 = 200;
pub const SMALL_PELLET_VALUE: u32 = 10;
pub const LARGE_PELLET_VALUE: u32 = 50;
pub const STARTING_LIVES: u32 = 3;

/// Creation order; pursuer spawn markers are consumed in this order.
pub const SPAWN_ORDER: [ChaseStrategy; 4] = [
    ChaseStrategy::Direct,
    ChaseStrategy::Ambush,
    ChaseStrategy::Flank,
    ChaseStrategy::Patrol,
];

/// Per-frame update order. Seniority scans walk this in reverse.
pub const UPDATE_ORDER: [ChaseStrategy; 4] = [
    ChaseStrategy::Patrol,
    ChaseStrategy::Flank,
    ChaseStrategy::Ambush,
    ChaseStrategy::Direct,
];

pub fn get_dot_limit(strategy: ChaseStrategy) -> u32 {
    match strategy {
        ChaseStrategy::Direct | ChaseStrategy::Ambush => 0,
        ChaseStrategy::Flank => 30,
        ChaseStrategy::Patrol => 60,
    }
}

pub fn get_global_dot_limit(strategy: ChaseStrategy) -> u32 {
    match strategy {
        ChaseStrategy::Direct => 0,
        ChaseStrategy::Ambush => 7,
        ChaseStrategy::Flank => 17,
        ChaseStrategy::Patrol => 32,
    }
}

pub fn get_ghost_speed_multiplier(state: PursuerState, on_slow_zone: bool) -> f32 {
    match state {
        PursuerState::Eaten => GHOST_EATEN_SPEED_MULTIPLIER,
        PursuerState::Frightened | PursuerState::Reverse => GHOST_FRIGHTENED_SPEED_MULTIPLIER,
        PursuerState::Home | PursuerState::Chase => {
            if on_slow_zone {
                GHOST_SLOW_ZONE_SPEED_MULTIPLIER
            } else {
                GHOST_NORMAL_SPEED_MULTIPLIER
            }
        }
    }
}

pub fn get_player_speed_multiplier(frightened_active: bool) -> f32 {
    if frightened_active {
        PLAYER_FRIGHTENED_SPEED_MULTIPLIER
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghost_speed_multipliers_follow_state_before_tile() {
        assert_eq!(get_ghost_speed_multiplier(PursuerState::Eaten, true), 2.0);
        assert_eq!(
            get_ghost_speed_multiplier(PursuerState::Reverse, true),
            0.625
        );
        assert_eq!(get_ghost_speed_multiplier(PursuerState::Chase, true), 0.5);
        assert_eq!(
            get_ghost_speed_multiplier(PursuerState::Home, false),
            0.9375
        );
    }

    #[test]
    fn update_order_is_spawn_order_reversed() {
        let mut reversed = SPAWN_ORDER;
        reversed.reverse();
        assert_eq!(reversed, UPDATE_ORDER);
    }
}
