//! Hit chance and damage rolls.

use std::{fmt, str::FromStr};

use anyhow::bail;
use rand::Rng;
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Base chance to hit between evenly matched opponents.
const BASE_HIT: f32 = 0.6;

/// Hit chance change per point of attack over defense.
const HIT_PER_POINT: f32 = 0.1;

/// Chance that an attack by the player hits.
///
/// Always leaves some chance of both hitting and missing.
pub fn player_hit_chance(attack: i32, defense: i32) -> f32 {
    (BASE_HIT + (attack - defense) as f32 * HIT_PER_POINT).clamp(0.05, 0.95)
}

/// Chance that an attack by a monster hits the player.
///
/// Only the lower end is clamped, a strong enough monster never misses.
pub fn monster_hit_chance(attack: i32, defense: i32) -> f32 {
    (BASE_HIT + (attack - defense) as f32 * HIT_PER_POINT).max(0.05)
}

/// Damage roll of `count` dice with `sides` faces, written like "2d6".
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
}

impl Dice {
    pub const fn new(count: u32, sides: u32) -> Self {
        Dice { count, sides }
    }

    pub fn roll(&self, rng: &mut (impl Rng + ?Sized)) -> i32 {
        if self.sides == 0 {
            return 0;
        }
        (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides) as i32)
            .sum()
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

impl FromStr for Dice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((count, sides)) = s.trim().split_once('d') else {
            bail!("bad dice {s:?}, expected something like 2d6");
        };
        // "d6" means a single die.
        let count = if count.is_empty() { 1 } else { count.parse()? };
        Ok(Dice::new(count, sides.parse()?))
    }
}
