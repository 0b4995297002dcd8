//! Spatial containers that place things on the board.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use util::{Grid, HashMap, IndexMap, Rect};

use crate::ThingId;

/// Something that can be placed on a layer.
pub trait Occupant {
    fn id(&self) -> ThingId;
}

/// A thing and where it is.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Placed<T> {
    pub pos: IVec2,
    pub thing: T,
}

impl<T> Placed<T> {
    pub fn new(pos: impl Into<IVec2>, thing: T) -> Self {
        Placed {
            pos: pos.into(),
            thing,
        }
    }
}

/// Mapping between board positions and the things occupying them.
///
/// A thing is on a layer at most once and a position holds at most one
/// thing. None of the operations fail, absence is expressed with `None`.
pub trait Layer {
    type Item: Occupant;

    /// Place a thing, removing its earlier placement and evicting whatever
    /// was already at the position.
    fn set(&mut self, pos: IVec2, thing: Self::Item);

    /// Remove a thing and return it, does nothing if it isn't present.
    fn delete(&mut self, id: ThingId) -> Option<Self::Item>;

    fn at(&self, pos: IVec2) -> Option<&Self::Item>;

    fn pos_of(&self, id: ThingId) -> Option<IVec2>;

    fn get(&self, id: ThingId) -> Option<&Self::Item>;

    fn get_mut(&mut self, id: ThingId) -> Option<&mut Self::Item>;

    /// Iterate the placed things whose position is inside `area`.
    ///
    /// Collect the results before mutating the layer.
    fn within(
        &self,
        area: Rect,
    ) -> impl Iterator<Item = Placed<&Self::Item>> + '_;

    /// Iterate every thing on the layer regardless of position.
    fn things(&self) -> impl Iterator<Item = &Self::Item> + '_;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn has(&self, id: ThingId) -> bool {
        self.pos_of(id).is_some()
    }

    fn id_at(&self, pos: IVec2) -> Option<ThingId> {
        self.at(pos).map(Occupant::id)
    }

    /// Move a thing already on the layer to a new position.
    fn relocate(&mut self, id: ThingId, pos: IVec2) {
        if let Some(thing) = self.delete(id) {
            self.set(pos, thing);
        }
    }
}

/// Layer for scattered things like monsters and fixtures.
///
/// Things are kept in placement order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "Vec<Placed<T>>", into = "Vec<Placed<T>>")]
#[serde(bound(
    serialize = "T: Occupant + Clone + Serialize",
    deserialize = "T: Occupant + Deserialize<'de>"
))]
pub struct SparseLayer<T> {
    things: IndexMap<ThingId, Placed<T>>,
    cells: HashMap<IVec2, ThingId>,
}

impl<T> Default for SparseLayer<T> {
    fn default() -> Self {
        SparseLayer {
            things: Default::default(),
            cells: Default::default(),
        }
    }
}

impl<T: Occupant> Layer for SparseLayer<T> {
    type Item = T;

    fn set(&mut self, pos: IVec2, thing: T) {
        let id = thing.id();
        self.delete(id);
        if let Some(&other) = self.cells.get(&pos) {
            self.delete(other);
        }

        self.cells.insert(pos, id);
        self.things.insert(id, Placed { pos, thing });
    }

    fn delete(&mut self, id: ThingId) -> Option<T> {
        let placed = self.things.shift_remove(&id)?;
        self.cells.remove(&placed.pos);
        Some(placed.thing)
    }

    fn at(&self, pos: IVec2) -> Option<&T> {
        let id = self.cells.get(&pos)?;
        self.things.get(id).map(|p| &p.thing)
    }

    fn pos_of(&self, id: ThingId) -> Option<IVec2> {
        self.things.get(&id).map(|p| p.pos)
    }

    fn get(&self, id: ThingId) -> Option<&T> {
        self.things.get(&id).map(|p| &p.thing)
    }

    fn get_mut(&mut self, id: ThingId) -> Option<&mut T> {
        self.things.get_mut(&id).map(|p| &mut p.thing)
    }

    fn within(&self, area: Rect) -> impl Iterator<Item = Placed<&T>> + '_ {
        self.things
            .values()
            .filter(move |p| area.contains(p.pos))
            .map(|p| Placed {
                pos: p.pos,
                thing: &p.thing,
            })
    }

    fn things(&self) -> impl Iterator<Item = &T> + '_ {
        self.things.values().map(|p| &p.thing)
    }

    fn len(&self) -> usize {
        self.things.len()
    }
}

impl<T: Occupant> From<Vec<Placed<T>>> for SparseLayer<T> {
    fn from(placed: Vec<Placed<T>>) -> Self {
        let mut ret = SparseLayer::default();
        for p in placed {
            ret.set(p.pos, p.thing);
        }
        ret
    }
}

impl<T> From<SparseLayer<T>> for Vec<Placed<T>> {
    fn from(layer: SparseLayer<T>) -> Self {
        layer.things.into_values().collect()
    }
}

/// Layer that fills a fixed-size area, used for terrain tiles.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "RawDenseLayer<T>", into = "RawDenseLayer<T>")]
#[serde(bound(
    serialize = "T: Occupant + Clone + Serialize",
    deserialize = "T: Occupant + Deserialize<'de>"
))]
pub struct DenseLayer<T> {
    cells: Grid<Option<T>>,
    index: HashMap<ThingId, IVec2>,
}

impl<T> DenseLayer<T> {
    pub fn new(width: i32, height: i32) -> Self {
        DenseLayer {
            cells: Grid::new(width, height),
            index: Default::default(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.cells.bounds()
    }
}

impl<T: Occupant> Layer for DenseLayer<T> {
    type Item = T;

    fn set(&mut self, pos: IVec2, thing: T) {
        if !self.cells.contains(pos) {
            log::debug!(
                "DenseLayer::set: {pos} outside {:?}, dropping {}",
                self.cells.bounds(),
                thing.id()
            );
            return;
        }

        let id = thing.id();
        self.delete(id);
        if let Some(Some(evicted)) = self.cells.set(pos, Some(thing)) {
            self.index.remove(&evicted.id());
        }
        self.index.insert(id, pos);
    }

    fn delete(&mut self, id: ThingId) -> Option<T> {
        let pos = self.index.remove(&id)?;
        self.cells.get_mut(pos).and_then(Option::take)
    }

    fn at(&self, pos: IVec2) -> Option<&T> {
        self.cells.get(pos).and_then(Option::as_ref)
    }

    fn pos_of(&self, id: ThingId) -> Option<IVec2> {
        self.index.get(&id).copied()
    }

    fn get(&self, id: ThingId) -> Option<&T> {
        self.at(self.pos_of(id)?)
    }

    fn get_mut(&mut self, id: ThingId) -> Option<&mut T> {
        let pos = self.pos_of(id)?;
        self.cells.get_mut(pos).and_then(Option::as_mut)
    }

    fn within(&self, area: Rect) -> impl Iterator<Item = Placed<&T>> + '_ {
        self.cells.within(area).filter_map(|(pos, c)| {
            c.as_ref().map(|thing| Placed { pos, thing })
        })
    }

    fn things(&self) -> impl Iterator<Item = &T> + '_ {
        self.cells.iter().filter_map(|(_, c)| c.as_ref())
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

/// Serialization proxy that only lists the occupied cells.
#[derive(Serialize, Deserialize)]
struct RawDenseLayer<T> {
    width: i32,
    height: i32,
    things: Vec<Placed<T>>,
}

impl<T: Occupant> From<RawDenseLayer<T>> for DenseLayer<T> {
    fn from(raw: RawDenseLayer<T>) -> Self {
        let mut ret = DenseLayer::new(raw.width, raw.height);
        for p in raw.things {
            ret.set(p.pos, p.thing);
        }
        ret
    }
}

impl<T> From<DenseLayer<T>> for RawDenseLayer<T> {
    fn from(layer: DenseLayer<T>) -> Self {
        let bounds = layer.cells.bounds();
        let things = layer
            .cells
            .into_iter()
            .filter_map(|(pos, c)| c.map(|thing| Placed { pos, thing }))
            .collect();
        RawDenseLayer {
            width: bounds.width(),
            height: bounds.height(),
            things,
        }
    }
}
