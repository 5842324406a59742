use super::*;

use crate::player::PelletPickup;
use crate::types::{PelletKind, PursuerState};

impl GameEngine {
    /// Applies a pickup reported by the player controller.
    pub(super) fn consume_pellet(&mut self, pickup: PelletPickup) {
        let kind = self.maze.get_tile(pickup.tile);
        self.maze.set_tile(pickup.tile, kind.consumed());
        self.pellets_remaining = self.pellets_remaining.saturating_sub(1);
        self.stats.pellets_eaten += 1;
        self.events.push(RoundEvent::PelletEaten {
            kind: pickup.kind,
            x: pickup.tile.x,
            y: pickup.tile.y,
        });

        match pickup.kind {
            PelletKind::Small => {
                self.release_timer = self.config.release_timer_seconds;
                self.credit_dot();
            }
            PelletKind::Large => {
                self.pellet_timer = self.config.frightened_seconds;
                self.capture_value = self.config.ghost_capture_base_value;
                self.capture_chain = 0;
                for ghost in &mut self.ghosts {
                    ghost.frighten(&self.maze);
                }
                self.events.push(RoundEvent::FrightenedStarted {
                    seconds: self.config.frightened_seconds,
                });
            }
        }
    }

    /// Tile coincidence between the player and pursuer `idx`. Returns true when
    /// the player was caught.
    pub(super) fn resolve_collision(&mut self, idx: usize) -> bool {
        let player_tile = self.player.current_tile(&self.maze);
        let ghost = &mut self.ghosts[idx];
        if ghost.current_tile(&self.maze) != player_tile {
            return false;
        }

        if ghost.state.is_vulnerable() {
            ghost.eat();
            self.capture_chain += 1;
            self.stats.ghosts_captured += 1;
            self.events.push(RoundEvent::GhostCaptured {
                ghost: ghost.strategy,
                points: self.capture_value,
                chain: self.capture_chain,
            });
            self.capture_value = self.capture_value.saturating_mul(2);
            return false;
        }
        if ghost.state == PursuerState::Eaten {
            return false;
        }

        let strategy = ghost.strategy;
        self.lose_life(strategy);
        true
    }

    fn lose_life(&mut self, caught_by: ChaseStrategy) {
        self.lives = self.lives.saturating_sub(1);
        self.stats.lives_lost += 1;
        self.events.push(RoundEvent::PlayerCaught {
            ghost: caught_by,
            lives_left: self.lives,
        });

        if self.lives == 0 {
            info!(level = self.level, tick = self.tick, "game over");
            self.events.push(RoundEvent::GameOver { level: self.level });
            self.ended = true;
            return;
        }

        info!(
            ghost = ?caught_by,
            lives_left = self.lives,
            tick = self.tick,
            "player caught"
        );
        self.reset_entities();
        self.global_dot_counter = Some(0);
    }

    pub(super) fn update_frightened_timer(&mut self, delta_seconds: f32) {
        if self.pellet_timer <= 0.0 {
            return;
        }
        self.pellet_timer -= delta_seconds;
        if self.pellet_timer > 0.0 {
            return;
        }

        self.pellet_timer = 0.0;
        self.capture_value = self.config.ghost_capture_base_value;
        self.capture_chain = 0;
        for ghost in &mut self.ghosts {
            ghost.calm();
        }
        self.events.push(RoundEvent::FrightenedEnded);
    }

    /// Vulnerable pursuers blink during the last stretch of the timer.
    pub(super) fn is_flashing(&self) -> bool {
        if self.pellet_timer <= 0.0 {
            return false;
        }
        let remaining_ms = (self.pellet_timer * 1000.0) as u64;
        let flash_time_ms = self.config.flash_time_ms;
        if remaining_ms >= flash_time_ms {
            return false;
        }
        let interval = self.config.flash_interval_ms.max(1);
        (flash_time_ms - remaining_ms) % (2 * interval) > interval
    }
}
