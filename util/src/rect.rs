use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle over the cell lattice.
///
/// The `p0` corner is inclusive and the `p1` corner is exclusive, so the
/// rectangle `[0, 0]..[2, 2]` covers four cells.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug)]
pub struct Rect {
    pub p0: IVec2,
    pub p1: IVec2,
}

impl Serialize for Rect {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        [self.p0.x, self.p0.y, self.p1.x, self.p1.y].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Rect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let [x0, y0, x1, y1] = <[i32; 4]>::deserialize(deserializer)?;
        Ok(Rect::new([x0, y0], [x1, y1]))
    }
}

impl Rect {
    /// Create a new rectangle. If p1 has components that are smaller than
    /// p0's, the corresponding range is clamped to zero.
    pub fn new(p0: impl Into<IVec2>, p1: impl Into<IVec2>) -> Self {
        let (p0, p1) = (p0.into(), p1.into());
        Rect {
            p0,
            p1: p1.max(p0),
        }
    }

    /// Create a rectangle that includes the point `p1`.
    pub fn new_inclusive(p0: impl Into<IVec2>, p1: impl Into<IVec2>) -> Self {
        Rect::new(p0, p1.into() + IVec2::ONE)
    }

    /// Create a rectangle of the given size at origin.
    pub fn sized(dim: impl Into<IVec2>) -> Self {
        Rect::new(IVec2::ZERO, dim)
    }

    /// Rectangle of the cells at most `radius` cells away from `center`
    /// along both axes.
    pub fn around(center: impl Into<IVec2>, radius: i32) -> Self {
        let center = center.into();
        let r = ivec2(radius, radius);
        Rect::new_inclusive(center - r, center + r)
    }

    pub fn width(&self) -> i32 {
        self.p1.x - self.p0.x
    }

    pub fn height(&self) -> i32 {
        self.p1.y - self.p0.y
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Number of cells in the rectangle.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.width() * self.height()) as usize
        }
    }

    pub fn contains(&self, p: impl Into<IVec2>) -> bool {
        let p = p.into();
        (self.p0.x..self.p1.x).contains(&p.x)
            && (self.p0.y..self.p1.y).contains(&p.y)
    }

    /// Return the rectangle of the intersection of `self` and `rhs`.
    ///
    /// Disjoint rectangles produce an empty rectangle.
    pub fn intersection(&self, rhs: &Self) -> Self {
        Rect::new(self.p0.max(rhs.p0), self.p1.min(rhs.p1))
    }

    /// Get the index of a point in row-major order.
    ///
    /// Returns `None` for points outside the rectangle.
    pub fn idx(&self, p: impl Into<IVec2>) -> Option<usize> {
        let p = p.into();
        if !self.contains(p) {
            return None;
        }
        let d = p - self.p0;
        Some((d.x + d.y * self.width()) as usize)
    }

    /// Get the point for a row-major index.
    pub fn get(&self, n: usize) -> IVec2 {
        let w = self.width() as usize;
        self.p0 + ivec2((n % w) as i32, (n / w) as i32)
    }
}

impl IntoIterator for Rect {
    type Item = IVec2;

    type IntoIter = RectIter;

    fn into_iter(self) -> Self::IntoIter {
        RectIter {
            rect: self,
            i: 0,
            len: self.len(),
        }
    }
}

/// Row-major iterator over the cells of a rectangle.
pub struct RectIter {
    rect: Rect,
    i: usize,
    len: usize,
}

impl Iterator for RectIter {
    type Item = IVec2;

    fn next(&mut self) -> Option<Self::Item> {
        if self.i >= self.len {
            return None;
        }
        let ret = self.rect.get(self.i);
        self.i += 1;
        Some(ret)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.i;
        (n, Some(n))
    }
}
