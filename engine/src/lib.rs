//! Game logic layer machinery.

/// How far can the player see.
pub const VIEW_RADIUS: i32 = 10;

/// From how far away do idle monsters notice the player.
pub const ALERT_RADIUS: i32 = 10;

/// How long a single step animates, in milliseconds.
pub const MOVE_ANIM_MS: f64 = 120.0;

/// How long an attack lunge animates, in milliseconds.
pub const ATTACK_ANIM_MS: f64 = 80.0;

/// Action point cost of a step, opening a door or using an item.
pub const MOVE_COST: i32 = 1;

/// Experience needed per character level to advance to the next one.
pub const LEVEL_XP: i32 = 10;

mod action;
pub use action::Action;

mod anim;
pub use anim::{Animation, Animations};

mod combat;
pub use combat::{monster_hit_chance, player_hit_chance, Dice};

mod data;
pub use data::ThingDb;

mod economy;
pub use economy::{ActionEconomy, Aggro};

mod layer;
pub use layer::{DenseLayer, Layer, Occupant, Placed, SparseLayer};

mod map;
pub use map::{Lighting, Map, Visibility};

mod mapgen;
pub use mapgen::{Arena, MapGen};

mod msg;
pub use msg::Msg;

mod pathing;
pub use pathing::find_path;

mod player;
pub use player::Player;

pub mod prelude;

mod runtime;
pub use runtime::{Runtime, Turn};

mod save;
pub use save::{DirStore, FloorState, MemoryStore, SaveStore, SessionState};

mod sight;

mod thing;
pub use thing::{
    Container, Exit, Fixture, Item, LightSource, Monster, Thing, ThingId,
    ThingKind, Weapon,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ScenarioStatus {
    Ongoing,
    Lost,
}
