use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::ThingId;

/// Commands the player can issue on their turn.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Wait and bank the remaining action points.
    Pass,
    /// Step, attack, open or take an exit in a direction depending on what's
    /// there.
    Bump(IVec2),
    /// Fire the ranged weapon at a monster.
    Shoot(ThingId),
    /// Use the inventory item at the index.
    Use(usize),
}
