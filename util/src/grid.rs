use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::Rect;

/// Dense two-dimensional array of values indexed by lattice points.
///
/// The grid covers the rectangle from origin to `(width, height)`.
/// Accessing points outside it yields `None` instead of panicking.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawGrid<T>", into = "RawGrid<T>")]
#[serde(bound(
    serialize = "T: Clone + Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct Grid<T> {
    bounds: Rect,
    cells: Vec<T>,
}

impl<T: Default> Grid<T> {
    /// Create a new grid filled with default values.
    pub fn new(width: i32, height: i32) -> Self {
        let bounds = Rect::sized([width, height]);
        Grid {
            bounds,
            cells: std::iter::repeat_with(T::default)
                .take(bounds.len())
                .collect(),
        }
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn contains(&self, p: impl Into<IVec2>) -> bool {
        self.bounds.contains(p)
    }

    pub fn get(&self, p: impl Into<IVec2>) -> Option<&T> {
        self.bounds.idx(p).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, p: impl Into<IVec2>) -> Option<&mut T> {
        self.bounds.idx(p).map(|i| &mut self.cells[i])
    }

    /// Write a value into a cell and return the previous value.
    ///
    /// Writes outside the grid are dropped and return `None`.
    pub fn set(&mut self, p: impl Into<IVec2>, value: T) -> Option<T> {
        let i = self.bounds.idx(p)?;
        Some(std::mem::replace(&mut self.cells[i], value))
    }

    /// Iterate every cell with its position.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (self.bounds.get(i), c))
    }

    /// Iterate the cells that fall within the given area.
    ///
    /// Parts of the area outside the grid are skipped.
    pub fn within(&self, area: Rect) -> impl Iterator<Item = (IVec2, &T)> + '_ {
        area.intersection(&self.bounds)
            .into_iter()
            .map(|p| {
                let i = self.bounds.idx(p).expect("Grid: point out of bounds");
                (p, &self.cells[i])
            })
    }
}

impl<T> IntoIterator for Grid<T> {
    type Item = (IVec2, T);

    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            bounds: self.bounds,
            inner: self.cells.into_iter().enumerate(),
        }
    }
}

/// Consuming iterator over grid cells and their positions.
pub struct IntoIter<T> {
    bounds: Rect,
    inner: std::iter::Enumerate<std::vec::IntoIter<T>>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = (IVec2, T);

    fn next(&mut self) -> Option<Self::Item> {
        let (i, c) = self.inner.next()?;
        Some((self.bounds.get(i), c))
    }
}

/// Serialization proxy, stores the dimensions and the row-major cells.
#[derive(Serialize, Deserialize)]
struct RawGrid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = String;

    fn try_from(raw: RawGrid<T>) -> Result<Self, Self::Error> {
        let bounds = Rect::sized([raw.width, raw.height]);
        if bounds.len() != raw.cells.len() {
            return Err(format!(
                "grid size {}x{} does not match {} cells",
                raw.width,
                raw.height,
                raw.cells.len()
            ));
        }
        Ok(Grid {
            bounds,
            cells: raw.cells,
        })
    }
}

impl<T> From<Grid<T>> for RawGrid<T> {
    fn from(grid: Grid<T>) -> Self {
        RawGrid {
            width: grid.bounds.width(),
            height: grid.bounds.height(),
            cells: grid.cells,
        }
    }
}
