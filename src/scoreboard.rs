use serde::Serialize;

use crate::config::SimulationConfig;
use crate::types::{PelletKind, RoundEvent};

/// In-memory score collaborator fed from drained round events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub score: u64,
    #[serde(rename = "smallPellets")]
    pub small_pellets: u32,
    #[serde(rename = "largePellets")]
    pub large_pellets: u32,
    #[serde(rename = "ghostsCaptured")]
    pub ghosts_captured: u32,
    #[serde(rename = "bestChain")]
    pub best_chain: u32,
    #[serde(skip)]
    small_value: u32,
    #[serde(skip)]
    large_value: u32,
}

impl Scoreboard {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            small_value: config.small_pellet_value,
            large_value: config.large_pellet_value,
            ..Self::default()
        }
    }

    /// Adds the points carried by `event` and returns them.
    pub fn record(&mut self, event: &RoundEvent) -> u32 {
        let points = match event {
            RoundEvent::PelletEaten {
                kind: PelletKind::Small,
                ..
            } => {
                self.small_pellets += 1;
                self.small_value
            }
            RoundEvent::PelletEaten {
                kind: PelletKind::Large,
                ..
            } => {
                self.large_pellets += 1;
                self.large_value
            }
            RoundEvent::GhostCaptured { points, chain, .. } => {
                self.ghosts_captured += 1;
                self.best_chain = self.best_chain.max(*chain);
                *points
            }
            _ => 0,
        };
        self.score += u64::from(points);
        points
    }

    pub fn record_all(&mut self, events: &[RoundEvent]) {
        for event in events {
            self.record(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChaseStrategy;

    #[test]
    fn pellets_and_captures_add_up() {
        let mut board = Scoreboard::new(&SimulationConfig::default());
        board.record_all(&[
            RoundEvent::PelletEaten {
                kind: PelletKind::Small,
                x: 1,
                y: 4,
            },
            RoundEvent::PelletEaten {
                kind: PelletKind::Large,
                x: 1,
                y: 6,
            },
            RoundEvent::GhostCaptured {
                ghost: ChaseStrategy::Ambush,
                points: 200,
                chain: 1,
            },
            RoundEvent::GhostCaptured {
                ghost: ChaseStrategy::Flank,
                points: 400,
                chain: 2,
            },
            RoundEvent::FrightenedEnded,
        ]);
        assert_eq!(board.score, 10 + 50 + 200 + 400);
        assert_eq!(board.small_pellets, 1);
        assert_eq!(board.large_pellets, 1);
        assert_eq!(board.ghosts_captured, 2);
        assert_eq!(board.best_chain, 2);
    }

    #[test]
    fn non_scoring_events_are_free() {
        let mut board = Scoreboard::new(&SimulationConfig::default());
        let points = board.record(&RoundEvent::PlayerCaught {
            ghost: ChaseStrategy::Direct,
            lives_left: 2,
        });
        assert_eq!(points, 0);
        assert_eq!(board.score, 0);
    }
}
