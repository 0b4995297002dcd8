use std::hash::{Hash, Hasher};

use rand::prelude::*;

use crate::GameRng;

/// Construct a throwaway random number generator seeded by a noise value.
///
/// Good for short-term use in immutable contexts given a varying source of
/// noise like map position coordinates.
pub fn srng(seed: &(impl Hash + ?Sized)) -> GameRng {
    let mut h = crate::FastHasher::default();
    seed.hash(&mut h);
    GameRng::seed_from_u64(h.finish())
}

pub trait RngExt {
    /// Draw a single uniform sample and test it against a probability.
    fn chance(&mut self, p: f32) -> bool;
}

impl<T: Rng + ?Sized> RngExt for T {
    fn chance(&mut self, p: f32) -> bool {
        self.gen::<f32>() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rngs_repeat() {
        assert_eq!(
            srng("dungeon").gen_range(0..1000),
            srng("dungeon").gen_range(0..1000)
        );
    }

    #[test]
    fn certain_chances() {
        let mut rng = srng(&1);
        for _ in 0..100 {
            assert!(rng.chance(1.0));
            assert!(!rng.chance(0.0));
        }
    }
}
