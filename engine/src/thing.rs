//! Placeable game objects.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{ActionEconomy, Aggro, Dice, Occupant};

/// Identity of a thing.
///
/// Templates in the thing database and every placed instance get their own
/// id, clones made from a template get a fresh one.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Display,
    Serialize,
    Deserialize,
)]
#[display("#{_0}")]
pub struct ThingId(pub(crate) u32);

/// Any placeable entity, terrain tiles and creatures alike.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Thing {
    #[serde(default)]
    pub id: ThingId,
    #[serde(default)]
    pub name: String,
    /// Character for text displays.
    pub icon: char,
    /// Sprite reference for graphical displays.
    #[serde(default)]
    pub image: String,
    #[serde(default = "white")]
    pub color: [u8; 3],
    #[serde(default)]
    pub passable: bool,
    /// Whether line of sight passes through the thing.
    #[serde(default)]
    pub transparent: bool,
    pub kind: ThingKind,
}

fn white() -> [u8; 3] {
    [0xff, 0xff, 0xff]
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThingKind {
    Tile,
    Fixture(Fixture),
    Door { open: bool },
    Exit(Exit),
    Container(Container),
    Monster(Monster),
    Player,
    Item(Item),
}

#[derive(Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Fixture {
    /// Radius of light cast by the fixture, zero for unlit fixtures.
    pub light_radius: i32,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Exit {
    /// Change in dungeon depth when taking the exit.
    pub delta: i32,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Container {
    pub gold: i32,
    /// Names of the item templates inside.
    pub items: Vec<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Monster {
    pub health: i32,
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    pub damage: Dice,
    #[serde(default = "one")]
    pub action_cost: i32,
    #[serde(default)]
    pub experience: i32,
    #[serde(default)]
    pub gold: i32,
    /// Shallowest dungeon level the monster shows up on.
    #[serde(default = "one")]
    pub min_depth: i32,
    #[serde(flatten)]
    pub economy: ActionEconomy,
    #[serde(default)]
    pub aggro: Aggro,
}

fn one() -> i32 {
    1
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Item {
    Weapon(Weapon),
    Armor { defense: i32 },
    Light(LightSource),
    Potion { heal: Dice },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Weapon {
    #[serde(default)]
    pub attack: i32,
    pub damage: Dice,
    #[serde(default = "one")]
    pub action_cost: i32,
    #[serde(default)]
    pub ranged: bool,
}

impl Weapon {
    /// Bare-handed melee.
    pub const FISTS: Weapon = Weapon {
        attack: 0,
        damage: Dice::new(1, 2),
        action_cost: 1,
        ranged: false,
    };
}

/// Consumable light that burns down one step each round.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct LightSource {
    pub radius: i32,
    pub duration: i32,
}

impl Occupant for Thing {
    fn id(&self) -> ThingId {
        self.id
    }
}

impl Thing {
    pub fn as_monster(&self) -> Option<&Monster> {
        match &self.kind {
            ThingKind::Monster(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_monster_mut(&mut self) -> Option<&mut Monster> {
        match &mut self.kind {
            ThingKind::Monster(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match &self.kind {
            ThingKind::Item(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_weapon(&self) -> Option<&Weapon> {
        match &self.kind {
            ThingKind::Item(Item::Weapon(w)) => Some(w),
            _ => None,
        }
    }

    /// Light radius of a lit fixture.
    pub fn light_radius(&self) -> i32 {
        match &self.kind {
            ThingKind::Fixture(f) => f.light_radius,
            _ => 0,
        }
    }

    pub fn is_closed_door(&self) -> bool {
        matches!(self.kind, ThingKind::Door { open: false })
    }

    /// Open a door, letting movement and sight through.
    ///
    /// Does nothing for things that aren't doors.
    pub fn open(&mut self) {
        if let ThingKind::Door { open } = &mut self.kind {
            *open = true;
            self.passable = true;
            self.transparent = true;
            self.icon = '\'';
        }
    }
}
