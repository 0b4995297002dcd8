//! The player character.

use serde::{Deserialize, Serialize};

use crate::{
    ActionEconomy, Item, LightSource, Occupant, Thing, ThingId, ThingKind,
    Weapon, LEVEL_XP,
};

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Player {
    /// The player's presence on the map.
    pub body: Thing,
    pub health: i32,
    pub max_health: i32,
    pub level: i32,
    pub experience: i32,
    pub gold: i32,
    pub attack: i32,
    pub defense: i32,
    /// How far the player sees clearly without a carried light.
    pub light_radius: i32,
    pub economy: ActionEconomy,
    pub melee: Option<Thing>,
    pub ranged: Option<Thing>,
    pub armor: Option<Thing>,
    pub light: Option<LightSource>,
    pub inventory: Vec<Thing>,
}

impl Default for Player {
    fn default() -> Self {
        Player::new(Thing {
            id: Default::default(),
            name: "player".into(),
            icon: '@',
            image: Default::default(),
            color: [0xff, 0xff, 0xff],
            passable: false,
            transparent: true,
            kind: ThingKind::Player,
        })
    }
}

impl Occupant for Player {
    fn id(&self) -> ThingId {
        self.body.id
    }
}

impl Player {
    pub fn new(body: Thing) -> Self {
        Player {
            body,
            health: 20,
            max_health: 20,
            level: 1,
            experience: 0,
            gold: 0,
            attack: 2,
            defense: 1,
            light_radius: 4,
            economy: ActionEconomy::new(1),
            melee: None,
            ranged: None,
            armor: None,
            light: None,
            inventory: Vec::new(),
        }
    }

    pub fn melee_weapon(&self) -> Weapon {
        self.melee
            .as_ref()
            .and_then(Thing::as_weapon)
            .copied()
            .unwrap_or(Weapon::FISTS)
    }

    pub fn ranged_weapon(&self) -> Option<Weapon> {
        self.ranged.as_ref().and_then(Thing::as_weapon).copied()
    }

    /// Defense including worn armor.
    pub fn total_defense(&self) -> i32 {
        let armor = match self.armor.as_ref().and_then(Thing::as_item) {
            Some(Item::Armor { defense }) => *defense,
            _ => 0,
        };
        self.defense + armor
    }

    /// Light radius including the carried light source.
    pub fn total_light_radius(&self) -> i32 {
        self.light_radius + self.light.map_or(0, |l| l.radius)
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Experience needed to gain the next level.
    pub fn next_level_xp(&self) -> i32 {
        LEVEL_XP * self.level
    }

    /// Gain a level if there's enough experience for it.
    ///
    /// Returns whether a level was gained.
    pub fn try_level_up(&mut self) -> bool {
        let cost = self.next_level_xp();
        if self.experience < cost {
            return false;
        }
        self.experience -= cost;
        self.level += 1;
        self.max_health += 5;
        self.health = self.max_health;
        self.attack += 1;
        true
    }

    /// Burn the carried light down by one round.
    ///
    /// Returns true if the light went out.
    pub fn burn_light(&mut self) -> bool {
        let Some(light) = &mut self.light else {
            return false;
        };
        light.duration -= 1;
        if light.duration <= 0 {
            self.light = None;
            true
        } else {
            false
        }
    }
}
