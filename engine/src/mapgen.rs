//! Building new dungeon floors.

use glam::{ivec2, IVec2};
use rand::seq::SliceRandom;
use util::{GameRng, Rect};

use crate::{Layer, Map, Player, ThingDb};

/// Source of fresh floors for the runtime.
pub trait MapGen {
    /// Make a new floor at the given depth with the player placed on it.
    fn generate(
        &mut self,
        db: &mut ThingDb,
        depth: i32,
        player: Player,
        rng: &mut GameRng,
    ) -> Map;
}

/// Two walled rooms joined by a door.
///
/// The player starts in the west room, monsters, the treasure chest and the
/// way down are in the east room.
#[derive(Copy, Clone, Debug)]
pub struct Arena {
    pub width: i32,
    pub height: i32,
}

impl Default for Arena {
    fn default() -> Self {
        Arena {
            width: 24,
            height: 14,
        }
    }
}

impl Arena {
    /// Where things get scattered in the east room.
    ///
    /// Leaves the columns next to the door and next to the stairs clear so
    /// that nothing can cut off the way down.
    fn scatter_area(&self) -> Rect {
        Rect::new([self.width / 2 + 2, 1], [self.width - 2, self.height - 1])
    }
}

impl MapGen for Arena {
    fn generate(
        &mut self,
        db: &mut ThingDb,
        depth: i32,
        player: Player,
        rng: &mut GameRng,
    ) -> Map {
        assert!(
            self.width >= 8 && self.height >= 6,
            "Arena: {}x{} is too small",
            self.width,
            self.height
        );

        let (w, h) = (self.width, self.height);
        let spawn = ivec2(2, h / 2);
        let mut map = Map::new(w, h, depth, player, spawn);

        let divider = w / 2;
        let door = ivec2(divider, h / 2);
        for p in Rect::sized([w, h]) {
            let is_wall = p.x == 0
                || p.y == 0
                || p.x == w - 1
                || p.y == h - 1
                || (p.x == divider && p != door);
            let tile = db.spawn(if is_wall { "wall" } else { "floor" });
            map.tiles.set(p, tile);
        }
        map.fixtures.set(door, db.spawn("door"));

        if depth > 1 {
            map.exits.set(spawn + ivec2(-1, 0), db.spawn("stairs-up"));
        }
        map.exits.set(ivec2(w - 2, h / 2), db.spawn("stairs-down"));
        map.fixtures.set(ivec2(w - 2, 1), db.spawn("torch"));

        for _ in 0..(w * h / 60) {
            if let Some(p) = free_cell(&map, self.scatter_area(), rng) {
                map.fixtures.set(p, db.spawn("pillar"));
            }
        }

        if let Some(p) = free_cell(&map, self.scatter_area(), rng) {
            map.containers.set(p, db.spawn("chest"));
        }

        let roster: Vec<String> = db
            .monsters()
            .filter(|t| t.as_monster().is_some_and(|m| m.min_depth <= depth))
            .map(|t| t.name.clone())
            .collect();
        for _ in 0..(depth + 2) {
            let Some(name) = roster.choose(rng) else {
                break;
            };
            let Some(p) = free_cell(&map, self.scatter_area(), rng) else {
                break;
            };
            map.monsters.set(p, db.spawn(name));
        }

        log::debug!(
            "Arena: generated depth {depth} with {} monsters",
            map.monsters.len()
        );
        map
    }
}

/// Random empty floor cell within the area.
fn free_cell(map: &Map, area: Rect, rng: &mut GameRng) -> Option<IVec2> {
    let cells: Vec<IVec2> = area
        .into_iter()
        .filter(|&p| {
            map.is_passable(p)
                && map.fixture_at(p).is_none()
                && map.exit_at(p).is_none()
                && map.container_at(p).is_none()
                && map.monster_at(p).is_none()
        })
        .collect();
    cells.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use util::srng;

    use super::*;
    use crate::{find_path, Aggro, ThingKind};

    fn generate(depth: i32) -> Map {
        let mut db = ThingDb::builtin().unwrap();
        Arena::default().generate(
            &mut db,
            depth,
            Player::default(),
            &mut srng(&depth),
        )
    }

    #[test]
    fn floor_layout() {
        let map = generate(1);
        assert_eq!(map.depth, 1);
        assert!(map.in_bounds(map.player_pos()));
        assert_eq!(map.monsters.len(), 3);
        assert_eq!(map.containers.len(), 1);

        let exits: Vec<i32> = map
            .exits
            .things()
            .filter_map(|t| match t.kind {
                ThingKind::Exit(e) => Some(e.delta),
                _ => None,
            })
            .collect();
        assert_eq!(exits, vec![1]);

        for m in map.monsters.things() {
            let m = m.as_monster().unwrap();
            assert!(m.min_depth <= 1);
            assert_eq!(m.aggro, Aggro::Idle);
        }
    }

    #[test]
    fn deeper_floors_have_more() {
        let map = generate(3);
        assert_eq!(map.monsters.len(), 5);
        assert_eq!(map.exits.len(), 2);
    }

    #[test]
    fn stairs_are_reachable_through_the_door() {
        let mut map = generate(2);
        let door = map
            .fixtures
            .within(map.bounds())
            .find(|p| p.thing.is_closed_door())
            .map(|p| p.pos)
            .unwrap();
        // Monsters can block the way, clear them out first.
        let ids: Vec<_> = map.monsters.things().map(|t| t.id).collect();
        for id in ids {
            map.monsters.delete(id);
        }
        assert!(map.open_door(door));

        let stairs = ivec2(map.width() - 2, map.height() / 2);
        let path = find_path(&map, map.player_pos(), stairs);
        assert_eq!(path.last(), Some(&stairs));
    }
}
