//! Action point bookkeeping for creatures.

use serde::{Deserialize, Serialize};

/// Per-round action budget of a creature.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
#[serde(default, rename_all = "kebab-case")]
pub struct ActionEconomy {
    /// Points left to spend this round.
    pub action: i32,
    /// Points banked by passing, carried to the next round.
    pub action_reservoir: i32,
    /// Regeneration rate, also caps how much of the reservoir one round can
    /// draw.
    pub agility: i32,
}

impl ActionEconomy {
    pub fn new(agility: i32) -> Self {
        ActionEconomy {
            agility,
            ..Default::default()
        }
    }

    /// Refill action points at the start of a round.
    pub fn start_round(&mut self) {
        self.action = 1
            + self.agility
            + self.action_reservoir.min(self.agility);
        self.action_reservoir = 0;
    }

    /// Bank the remaining action points for the next round.
    pub fn pass(&mut self) {
        self.action_reservoir += self.action.max(0);
        self.action = 0;
    }

    pub fn spend(&mut self, cost: i32) {
        self.action -= cost;
    }

    pub fn can_act(&self) -> bool {
        self.action > 0
    }

    /// Drop all points, used when a monster changes its mind about the
    /// player.
    pub fn reset(&mut self) {
        self.action = 0;
    }
}

/// Whether a monster is chasing the player.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Aggro {
    #[default]
    Idle,
    Aggro,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservoir_draw_is_capped() {
        let mut e = ActionEconomy {
            action: 0,
            action_reservoir: 5,
            agility: 2,
        };
        e.start_round();
        assert_eq!(e.action, 1 + 2 + 2);
        assert_eq!(e.action_reservoir, 0);
    }

    #[test]
    fn passing_banks_actions() {
        let mut e = ActionEconomy::new(1);
        e.start_round();
        assert_eq!(e.action, 2);
        e.spend(1);
        e.pass();
        assert_eq!(e.action, 0);
        assert_eq!(e.action_reservoir, 1);
        assert!(!e.can_act());

        e.start_round();
        assert_eq!(e.action, 3);
        assert_eq!(e.action_reservoir, 0);
    }
}
