//! Registry of thing templates.

use anyhow::Result;
use util::{HashMap, IndexMap};

use crate::{Layer, Map, Thing, ThingId};

/// Templates of every kind of thing in the game, looked up by id or name.
///
/// Placed instances are cloned from templates and get their own ids from
/// the same counter.
#[derive(Clone, Debug)]
pub struct ThingDb {
    templates: IndexMap<ThingId, Thing>,
    names: HashMap<String, ThingId>,
    next_id: u32,
}

impl Default for ThingDb {
    fn default() -> Self {
        ThingDb {
            templates: Default::default(),
            names: Default::default(),
            // Zero is the default id, keep it unused.
            next_id: 1,
        }
    }
}

impl ThingDb {
    /// Database with the game's own thing definitions.
    pub fn builtin() -> Result<Self> {
        ThingDb::from_json(include_str!("../data/things.json"))
    }

    /// Parse an object of named thing templates.
    pub fn from_json(json: &str) -> Result<Self> {
        let things: IndexMap<String, Thing> = serde_json::from_str(json)?;
        let mut ret = ThingDb::default();
        for (name, mut thing) in things {
            thing.name = name;
            ret.insert(thing);
        }
        Ok(ret)
    }

    /// Add a template and return its freshly assigned id.
    pub fn insert(&mut self, mut thing: Thing) -> ThingId {
        let id = self.alloc_id();
        thing.id = id;
        self.names.insert(thing.name.clone(), id);
        self.templates.insert(id, thing);
        id
    }

    pub fn alloc_id(&mut self) -> ThingId {
        let id = ThingId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: ThingId) -> Option<&Thing> {
        self.templates.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Thing> {
        self.get(*self.names.get(name)?)
    }

    /// Make a new instance of a named template.
    ///
    /// Panics if there is no such template, thing names used by game code
    /// must exist.
    pub fn spawn(&mut self, name: &str) -> Thing {
        let mut thing = self
            .by_name(name)
            .unwrap_or_else(|| panic!("ThingDb::spawn: unknown thing {name:?}"))
            .clone();
        thing.id = self.alloc_id();
        thing
    }

    /// Instance a named template if it exists.
    pub fn try_spawn(&mut self, name: &str) -> Option<Thing> {
        self.names.contains_key(name).then(|| self.spawn(name))
    }

    /// Every monster template.
    pub fn monsters(&self) -> impl Iterator<Item = &Thing> + '_ {
        self.templates.values().filter(|t| t.as_monster().is_some())
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Move the id counter forward, used when restoring saved floors so new
    /// things don't reuse ids already on the map.
    pub fn set_next_id(&mut self, next_id: u32) {
        self.next_id = self.next_id.max(next_id);
    }

    /// Bump the id counter past every thing on a map.
    pub fn reserve_ids(&mut self, map: &Map) {
        let max = map
            .tiles
            .things()
            .chain(map.fixtures.things())
            .chain(map.exits.things())
            .chain(map.monsters.things())
            .chain(map.containers.things())
            .chain(std::iter::once(&map.player.thing.body))
            .map(|t| t.id.0)
            .max()
            .unwrap_or(0);
        self.set_next_id(max + 1);
    }
}
