use glam::IVec2;
use util::bresenham_line;

use crate::Map;

impl Map {
    /// Whether the target cell can be seen from `eye`.
    ///
    /// Walks a straight line from the eye. The first opaque cell on the way
    /// stops the walk, the target is still seen if it is that cell.
    pub fn has_line_of_sight(&self, eye: IVec2, target: IVec2) -> bool {
        for p in bresenham_line(eye, target)
            .skip(1)
            .chain(std::iter::once(target))
        {
            if !self.is_transparent(p) {
                return p == target;
            }
        }
        true
    }
}
