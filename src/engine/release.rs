use super::*;

use crate::types::PursuerState;

impl GameEngine {
    /// Attributes one eaten pellet to the release bookkeeping: the global
    /// counter while it is active, otherwise the most senior caged pursuer.
    pub(super) fn credit_dot(&mut self) {
        if let Some(count) = self.global_dot_counter {
            let count = count + 1;
            let patrol_caged_at_limit = self.ghost(ChaseStrategy::Patrol).is_some_and(|ghost| {
                ghost.state == PursuerState::Home
                    && !ghost.released
                    && count >= ghost.global_dot_limit
            });
            self.global_dot_counter = if patrol_caged_at_limit {
                None
            } else {
                Some(count)
            };
            return;
        }

        if let Some(ghost) = self
            .ghosts
            .iter_mut()
            .rev()
            .find(|ghost| ghost.state == PursuerState::Home && !ghost.released)
        {
            ghost.dot_counter += 1;
        }
    }

    /// Forces out the next caged pursuer when no pellet has been eaten for a
    /// while.
    pub(super) fn update_release_timer(&mut self, delta_seconds: f32) {
        self.release_timer -= delta_seconds;
        if self.release_timer > 0.0 {
            return;
        }
        self.release_timer = self.config.release_timer_seconds;

        if let Some(ghost) = self
            .ghosts
            .iter_mut()
            .rev()
            .find(|ghost| ghost.state == PursuerState::Home && !ghost.released)
        {
            ghost.force_release();
            self.events.push(RoundEvent::GhostReleased {
                ghost: ghost.strategy,
            });
        }
    }
}
