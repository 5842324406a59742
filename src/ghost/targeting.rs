use crate::constants::{AMBUSH_LOOKAHEAD_TILES, FLANK_LOOKAHEAD_TILES, PATROL_RETREAT_DISTANCE};
use crate::types::{ChaseStrategy, Direction, TileCoord};

/// Everything a chase strategy may look at. Built fresh every frame by the
/// round controller so no pursuer holds a reference to another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChaseInputs {
    pub player_tile: TileCoord,
    pub player_direction: Direction,
    pub own_tile: TileCoord,
    /// Current tile of the direct pursuer, the flank strategy's partner.
    pub partner_tile: TileCoord,
    pub retreat_tile: TileCoord,
}

/// Projection `tiles` ahead of the player. Facing up also shifts the point
/// `tiles` to the left, as the arcade game did.
pub fn ahead_of_player(player_tile: TileCoord, player_direction: Direction, tiles: i32) -> TileCoord {
    let mut origin = player_tile;
    if player_direction == Direction::Up {
        origin.x -= tiles;
    }
    origin + player_direction.vector() * tiles
}

pub fn compute_chase_target(strategy: ChaseStrategy, inputs: &ChaseInputs) -> TileCoord {
    match strategy {
        ChaseStrategy::Direct => inputs.player_tile,
        ChaseStrategy::Ambush => ahead_of_player(
            inputs.player_tile,
            inputs.player_direction,
            AMBUSH_LOOKAHEAD_TILES,
        ),
        ChaseStrategy::Flank => {
            let pivot = ahead_of_player(
                inputs.player_tile,
                inputs.player_direction,
                FLANK_LOOKAHEAD_TILES,
            );
            pivot * 2 - inputs.partner_tile
        }
        ChaseStrategy::Patrol => {
            if inputs.own_tile.distance(inputs.player_tile) >= PATROL_RETREAT_DISTANCE {
                inputs.player_tile
            } else {
                inputs.retreat_tile
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(player_direction: Direction) -> ChaseInputs {
        ChaseInputs {
            player_tile: TileCoord::new(10, 10),
            player_direction,
            own_tile: TileCoord::new(1, 1),
            partner_tile: TileCoord::new(12, 14),
            retreat_tile: TileCoord::new(0, 35),
        }
    }

    #[test]
    fn direct_targets_player_tile() {
        assert_eq!(
            compute_chase_target(ChaseStrategy::Direct, &inputs(Direction::Left)),
            TileCoord::new(10, 10)
        );
    }

    #[test]
    fn ambush_facing_up_is_shifted_left() {
        assert_eq!(
            compute_chase_target(ChaseStrategy::Ambush, &inputs(Direction::Up)),
            TileCoord::new(6, 6)
        );
        assert_eq!(
            compute_chase_target(ChaseStrategy::Ambush, &inputs(Direction::Down)),
            TileCoord::new(10, 14)
        );
        assert_eq!(
            compute_chase_target(ChaseStrategy::Ambush, &inputs(Direction::Right)),
            TileCoord::new(14, 10)
        );
    }

    #[test]
    fn stationary_player_projects_onto_itself() {
        assert_eq!(
            compute_chase_target(ChaseStrategy::Ambush, &inputs(Direction::None)),
            TileCoord::new(10, 10)
        );
    }

    #[test]
    fn flank_reflects_partner_through_projection() {
        // pivot (10, 12); partner (12, 14) -> (8, 10)
        assert_eq!(
            compute_chase_target(ChaseStrategy::Flank, &inputs(Direction::Down)),
            TileCoord::new(8, 10)
        );
        // facing up: pivot (8, 8); partner (12, 14) -> (4, 2)
        assert_eq!(
            compute_chase_target(ChaseStrategy::Flank, &inputs(Direction::Up)),
            TileCoord::new(4, 2)
        );
    }

    #[test]
    fn patrol_switches_exactly_at_eight_tiles() {
        let mut far = inputs(Direction::Left);
        far.own_tile = TileCoord::new(10, 18);
        assert_eq!(
            compute_chase_target(ChaseStrategy::Patrol, &far),
            TileCoord::new(10, 10)
        );

        let mut near = far;
        near.own_tile = TileCoord::new(10, 17);
        assert_eq!(
            compute_chase_target(ChaseStrategy::Patrol, &near),
            TileCoord::new(0, 35)
        );

        // distance sqrt(2 * 36) ~ 8.49 is still far
        let mut diagonal = far;
        diagonal.own_tile = TileCoord::new(16, 16);
        assert_eq!(
            compute_chase_target(ChaseStrategy::Patrol, &diagonal),
            TileCoord::new(10, 10)
        );
    }
}
