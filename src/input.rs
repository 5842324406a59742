use serde::{Deserialize, Serialize};

use crate::types::Direction;

/// Input collaborator, polled once per frame by the player controller.
pub trait InputSource {
    fn is_held(&self, dir: Direction) -> bool;
}

/// Plain held-key state, set by whatever owns the keyboard or socket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldKeys {
    pub left: bool,
    pub up: bool,
    pub right: bool,
    pub down: bool,
}

impl HeldKeys {
    pub fn only(dir: Direction) -> Self {
        let mut keys = Self::default();
        keys.set(dir, true);
        keys
    }

    pub fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Left => self.left = held,
            Direction::Up => self.up = held,
            Direction::Right => self.right = held,
            Direction::Down => self.down = held,
            Direction::None => *self = Self::default(),
        }
    }
}

impl InputSource for HeldKeys {
    fn is_held(&self, dir: Direction) -> bool {
        match dir {
            Direction::Left => self.left,
            Direction::Up => self.up,
            Direction::Right => self.right,
            Direction::Down => self.down,
            Direction::None => false,
        }
    }
}

/// First held key wins, in the order left, up, right, down.
pub fn read_queued_direction(input: &dyn InputSource) -> Option<Direction> {
    Direction::CARDINAL
        .into_iter()
        .find(|dir| input.is_held(*dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_beats_other_held_keys() {
        let keys = HeldKeys {
            left: true,
            up: true,
            right: false,
            down: true,
        };
        assert_eq!(read_queued_direction(&keys), Some(Direction::Left));
    }

    #[test]
    fn no_keys_leaves_queue_untouched() {
        assert_eq!(read_queued_direction(&HeldKeys::default()), None);
    }

    #[test]
    fn setting_none_releases_everything() {
        let mut keys = HeldKeys::only(Direction::Down);
        assert!(keys.is_held(Direction::Down));
        keys.set(Direction::None, true);
        assert_eq!(keys, HeldKeys::default());
    }
}
