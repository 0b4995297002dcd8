//! A single dungeon floor and what can be seen on it.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use util::{Grid, Rect, VecExt};

use crate::{DenseLayer, Layer, Placed, Player, SparseLayer, Thing, ThingId};

/// How well the player can see a cell.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// Not in view and never seen.
    #[default]
    None,
    /// Not in view, but seen before.
    Fog,
    /// In line of sight but outside of any light.
    Dark,
    /// In line of sight and lit.
    Visible,
}

/// Ambient lighting mode of a floor.
///
/// Stored with the floor but not used for anything yet.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Lighting {
    #[default]
    Normal,
    Lit,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawMap")]
pub struct Map {
    width: i32,
    height: i32,
    /// Dungeon floor index, starting from 1.
    pub depth: i32,
    pub tiles: DenseLayer<Thing>,
    pub fixtures: SparseLayer<Thing>,
    pub exits: SparseLayer<Thing>,
    pub monsters: SparseLayer<Thing>,
    pub containers: SparseLayer<Thing>,
    pub player: Placed<Player>,
    visibility: Grid<Visibility>,
    /// Cells that have been visible at some point.
    seen: Grid<bool>,
    #[serde(default)]
    pub lighting: Lighting,
}

/// Deserialization proxy, checked for consistency before it becomes a map.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawMap {
    width: i32,
    height: i32,
    depth: i32,
    tiles: DenseLayer<Thing>,
    fixtures: SparseLayer<Thing>,
    exits: SparseLayer<Thing>,
    monsters: SparseLayer<Thing>,
    containers: SparseLayer<Thing>,
    player: Placed<Player>,
    visibility: Grid<Visibility>,
    seen: Grid<bool>,
    #[serde(default)]
    lighting: Lighting,
}

impl TryFrom<RawMap> for Map {
    type Error = String;

    fn try_from(raw: RawMap) -> Result<Self, Self::Error> {
        let bounds = Rect::sized([raw.width, raw.height]);
        if bounds.is_empty() {
            return Err(format!("empty map {}x{}", raw.width, raw.height));
        }
        for (name, b) in [
            ("tiles", raw.tiles.bounds()),
            ("visibility", raw.visibility.bounds()),
            ("seen", raw.seen.bounds()),
        ] {
            if b != bounds {
                return Err(format!(
                    "{name} {}x{} don't match map {}x{}",
                    b.width(),
                    b.height(),
                    raw.width,
                    raw.height
                ));
            }
        }
        for (name, layer) in [
            ("fixtures", &raw.fixtures),
            ("exits", &raw.exits),
            ("monsters", &raw.monsters),
            ("containers", &raw.containers),
        ] {
            if layer.within(bounds).count() != layer.len() {
                return Err(format!("{name} placed outside the map"));
            }
        }
        if !bounds.contains(raw.player.pos) {
            return Err(format!("player at {} outside the map", raw.player.pos));
        }

        Ok(Map {
            width: raw.width,
            height: raw.height,
            depth: raw.depth,
            tiles: raw.tiles,
            fixtures: raw.fixtures,
            exits: raw.exits,
            monsters: raw.monsters,
            containers: raw.containers,
            player: raw.player,
            visibility: raw.visibility,
            seen: raw.seen,
            lighting: raw.lighting,
        })
    }
}

impl Map {
    /// Create an empty floor with the player at `player_pos`.
    ///
    /// Panics if the player position is out of bounds.
    pub fn new(
        width: i32,
        height: i32,
        depth: i32,
        player: Player,
        player_pos: IVec2,
    ) -> Self {
        assert!(
            Rect::sized([width, height]).contains(player_pos),
            "Map::new: player at {player_pos} outside {width}x{height} map"
        );
        Map {
            width,
            height,
            depth,
            tiles: DenseLayer::new(width, height),
            fixtures: Default::default(),
            exits: Default::default(),
            monsters: Default::default(),
            containers: Default::default(),
            player: Placed::new(player_pos, player),
            visibility: Grid::new(width, height),
            seen: Grid::new(width, height),
            lighting: Default::default(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::sized([self.width, self.height])
    }

    pub fn in_bounds(&self, p: IVec2) -> bool {
        (0..self.width).contains(&p.x) && (0..self.height).contains(&p.y)
    }

    pub fn tile_at(&self, p: IVec2) -> Option<&Thing> {
        self.tiles.at(p)
    }

    pub fn fixture_at(&self, p: IVec2) -> Option<&Thing> {
        self.fixtures.at(p)
    }

    pub fn exit_at(&self, p: IVec2) -> Option<&Thing> {
        self.exits.at(p)
    }

    pub fn container_at(&self, p: IVec2) -> Option<&Thing> {
        self.containers.at(p)
    }

    pub fn monster_at(&self, p: IVec2) -> Option<&Thing> {
        self.monsters.at(p)
    }

    pub fn monster_id_at(&self, p: IVec2) -> Option<ThingId> {
        self.monsters.id_at(p)
    }

    pub fn player_pos(&self) -> IVec2 {
        self.player.pos
    }

    /// Move the player. Positions outside the map are ignored.
    pub fn place_player(&mut self, p: IVec2) -> bool {
        if !self.in_bounds(p) {
            log::warn!("Map::place_player: {p} is out of bounds");
            return false;
        }
        self.player.pos = p;
        true
    }

    /// Everything occupying a cell.
    ///
    /// The order is fixture, tile, container, monster and player, so the
    /// most salient occupant comes last.
    pub fn at(&self, p: IVec2) -> impl Iterator<Item = &Thing> + '_ {
        let player = (self.player.pos == p).then_some(&self.player.thing.body);
        self.fixtures
            .at(p)
            .into_iter()
            .chain(self.tiles.at(p))
            .chain(self.containers.at(p))
            .chain(self.monsters.at(p))
            .chain(player)
    }

    /// Whether something can walk into the cell.
    ///
    /// An in-bounds cell with nothing in it counts as passable.
    pub fn is_passable(&self, p: IVec2) -> bool {
        self.in_bounds(p) && self.at(p).all(|t| t.passable)
    }

    pub fn is_transparent(&self, p: IVec2) -> bool {
        self.at(p).all(|t| t.transparent)
    }

    /// Open a closed door at the position.
    ///
    /// Returns whether there was a door to open.
    pub fn open_door(&mut self, p: IVec2) -> bool {
        let Some(id) = self.fixtures.id_at(p) else {
            return false;
        };
        match self.fixtures.get_mut(id) {
            Some(door) if door.is_closed_door() => {
                door.open();
                true
            }
            _ => false,
        }
    }

    pub fn visibility_at(&self, p: IVec2) -> Visibility {
        self.visibility.get(p).copied().unwrap_or_default()
    }

    /// Whether the cell has ever been seen by the player.
    pub fn seen_at(&self, p: IVec2) -> bool {
        self.seen.get(p).copied().unwrap_or(false)
    }

    /// Current light radius around the player.
    pub fn player_light_radius(&self) -> i32 {
        self.player.thing.total_light_radius()
    }

    /// Recompute what the player sees.
    ///
    /// Cells in line of sight are `Visible` within the player's light radius
    /// and `Dark` outside it. A cell shadowed in any octant scanned after
    /// the one that saw it goes back to `None`. Lit fixtures then brighten the `Dark` cells
    /// they can see within their own radius. Cells out of view are `Fog`
    /// if they have been seen before and `None` otherwise.
    pub fn update_visible(&mut self, radius: i32) {
        let eye = self.player.pos;
        let light = self.player_light_radius();
        let mut vis: Grid<Visibility> = Grid::new(self.width, self.height);

        fov::shadowcast(radius, |offset: IVec2, shadowed| {
            let p = eye + offset;
            if !self.in_bounds(p) {
                return None;
            }
            if shadowed {
                // Another octant may have marked it already.
                vis.set(p, Visibility::None);
                return None;
            }
            let v = if offset.taxi_len() > light {
                Visibility::Dark
            } else {
                Visibility::Visible
            };
            vis.set(p, v);
            Some(!self.is_transparent(p))
        });
        vis.set(eye, Visibility::Visible);

        let lamps: Vec<(IVec2, i32)> = self
            .fixtures
            .within(self.bounds())
            .filter(|p| p.thing.light_radius() > 0)
            .map(|p| (p.pos, p.thing.light_radius()))
            .collect();

        for (source, r) in lamps {
            if vis.get(source) == Some(&Visibility::Dark) {
                vis.set(source, Visibility::Visible);
            }

            fov::shadowcast(r, |offset: IVec2, shadowed| {
                let p = source + offset;
                if shadowed || !self.in_bounds(p) {
                    return None;
                }
                if offset.taxi_len() <= r
                    && vis.get(p) == Some(&Visibility::Dark)
                {
                    vis.set(p, Visibility::Visible);
                }
                Some(!self.is_transparent(p))
            });
        }

        for p in self.bounds() {
            let seen = self.seen.get_mut(p).expect("Map: grid size mismatch");
            match vis.get(p) {
                Some(Visibility::Visible) => *seen = true,
                Some(Visibility::None) if *seen => {
                    vis.set(p, Visibility::Fog);
                }
                _ => {}
            }
        }

        self.visibility = vis;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use glam::ivec2;

    use super::*;
    use crate::{Fixture, ThingKind};

    pub(crate) fn thing(id: u32, kind: ThingKind, passable: bool) -> Thing {
        Thing {
            id: ThingId(id),
            name: format!("thing {id}"),
            icon: '?',
            image: Default::default(),
            color: [0xff, 0xff, 0xff],
            passable,
            transparent: passable,
            kind,
        }
    }

    /// Floor of passable tiles with no other things on it.
    pub(crate) fn open_map(w: i32, h: i32, player_pos: IVec2) -> Map {
        let mut map = Map::new(w, h, 1, Player::default(), player_pos);
        map.player.thing.body.id = ThingId(1_000_000);
        let mut id = 1;
        for p in map.bounds() {
            map.tiles.set(p, thing(id, ThingKind::Tile, true));
            id += 1;
        }
        map
    }

    pub(crate) fn add_wall(map: &mut Map, p: IVec2) {
        let id = map.tiles.id_at(p).unwrap();
        map.tiles.set(p, thing(id.0, ThingKind::Tile, false));
    }

    #[test]
    fn at_precedence() {
        let mut map = open_map(5, 5, ivec2(2, 2));
        map.fixtures.set(
            ivec2(2, 2),
            thing(500, ThingKind::Fixture(Fixture::default()), true),
        );
        map.containers.set(
            ivec2(2, 2),
            thing(501, ThingKind::Container(Default::default()), true),
        );
        let names: Vec<ThingId> = map.at(ivec2(2, 2)).map(|t| t.id).collect();
        let tile = map.tiles.id_at(ivec2(2, 2)).unwrap();
        assert_eq!(
            names,
            vec![ThingId(500), tile, ThingId(501), ThingId(1_000_000)]
        );
    }

    #[test]
    fn passability() {
        let mut map = open_map(5, 5, ivec2(0, 0));
        assert!(map.is_passable(ivec2(3, 3)));
        assert!(!map.is_passable(ivec2(5, 3)));
        assert!(!map.is_passable(ivec2(-1, 0)));
        // Player blocks their own cell.
        assert!(!map.is_passable(ivec2(0, 0)));

        add_wall(&mut map, ivec2(3, 3));
        assert!(!map.is_passable(ivec2(3, 3)));

        // Cells without anything in them are fine.
        map.tiles.delete(map.tiles.id_at(ivec2(4, 4)).unwrap());
        assert!(map.is_passable(ivec2(4, 4)));
    }

    #[test]
    fn eye_is_always_visible() {
        for r in 0..3 {
            let mut map = open_map(3, 3, ivec2(1, 1));
            map.player.thing.light_radius = 0;
            map.update_visible(r);
            assert_eq!(map.visibility_at(ivec2(1, 1)), Visibility::Visible);
        }
    }

    #[test]
    fn wall_hides_what_is_behind() {
        let mut map = open_map(11, 11, ivec2(5, 5));
        add_wall(&mut map, ivec2(5, 7));
        map.update_visible(10);
        assert_eq!(map.visibility_at(ivec2(5, 7)), Visibility::Visible);
        assert_eq!(map.visibility_at(ivec2(5, 9)), Visibility::None);
        assert_eq!(map.visibility_at(ivec2(5, 3)), Visibility::Visible);
    }

    #[test]
    fn later_octant_shadow_wins() {
        let mut map = open_map(20, 20, ivec2(5, 5));
        add_wall(&mut map, ivec2(5, 7));
        map.update_visible(10);
        assert_eq!(map.visibility_at(ivec2(8, 8)), Visibility::None);
        // Same cell on the other side has nothing in the way.
        assert_eq!(map.visibility_at(ivec2(8, 2)), Visibility::Dark);
    }

    #[test]
    fn light_radius_splits_visible_and_dark() {
        let mut map = open_map(20, 20, ivec2(5, 5));
        map.update_visible(10);
        assert_eq!(map.visibility_at(ivec2(9, 5)), Visibility::Visible);
        assert_eq!(map.visibility_at(ivec2(7, 7)), Visibility::Visible);
        assert_eq!(map.visibility_at(ivec2(10, 5)), Visibility::Dark);
        assert_eq!(map.visibility_at(ivec2(8, 7)), Visibility::Dark);
        // Beyond the viewport radius.
        assert_eq!(map.visibility_at(ivec2(16, 5)), Visibility::None);
    }

    #[test]
    fn lamps_light_up_dark_cells() {
        let mut map = open_map(20, 20, ivec2(2, 2));
        map.fixtures.set(
            ivec2(10, 2),
            thing(
                900,
                ThingKind::Fixture(Fixture { light_radius: 2 }),
                true,
            ),
        );
        map.update_visible(10);
        assert_eq!(map.visibility_at(ivec2(10, 2)), Visibility::Visible);
        assert_eq!(map.visibility_at(ivec2(9, 3)), Visibility::Visible);
        assert_eq!(map.visibility_at(ivec2(12, 2)), Visibility::Visible);
        assert_eq!(map.visibility_at(ivec2(13, 2)), Visibility::None);
        assert_eq!(map.visibility_at(ivec2(8, 4)), Visibility::Dark);
    }

    #[test]
    fn seen_cells_turn_to_fog() {
        let mut map = open_map(30, 3, ivec2(1, 1));
        map.update_visible(10);
        assert_eq!(map.visibility_at(ivec2(3, 1)), Visibility::Visible);
        assert!(!map.seen_at(ivec2(8, 1)));

        map.place_player(ivec2(25, 1));
        map.update_visible(10);
        assert_eq!(map.visibility_at(ivec2(3, 1)), Visibility::Fog);
        assert!(map.seen_at(ivec2(3, 1)));
        // Seen only in the dark, never lit.
        assert_eq!(map.visibility_at(ivec2(8, 1)), Visibility::None);
    }

    #[test]
    fn opening_doors() {
        let mut map = open_map(5, 5, ivec2(0, 0));
        let mut door = thing(77, ThingKind::Door { open: false }, false);
        door.transparent = false;
        map.fixtures.set(ivec2(2, 0), door);
        assert!(!map.is_transparent(ivec2(2, 0)));
        assert!(map.open_door(ivec2(2, 0)));
        assert!(map.is_passable(ivec2(2, 0)));
        assert!(map.is_transparent(ivec2(2, 0)));
        assert!(!map.open_door(ivec2(2, 0)));
        assert!(!map.open_door(ivec2(3, 0)));
    }
}
