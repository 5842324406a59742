use serde::{Deserialize, Serialize};

/// Small seeded generator (mulberry32). The whole state is one word, so a
/// round can be saved and resumed with an identical random stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next_f32(&mut self) -> f32 {
        self.state = self.state.wrapping_add(0x6d2b79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        (out as f64 / 4_294_967_296.0) as f32
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_f32() * len as f32).floor().min((len - 1) as f32) as usize
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.pick_index(items.len());
        items.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_stream() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..32 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn pick_index_stays_in_range() {
        let mut rng = Rng::new(99);
        for len in 1..6 {
            for _ in 0..50 {
                assert!(rng.pick_index(len) < len);
            }
        }
        assert_eq!(rng.choose::<u8>(&[]), None);
    }

    #[test]
    fn resuming_from_saved_state_continues_stream() {
        let mut rng = Rng::new(3);
        rng.next_f32();
        let mut resumed = Rng::new(rng.state());
        assert_eq!(rng.next_f32().to_bits(), resumed.next_f32().to_bits());
    }
}
