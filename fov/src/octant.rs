/// One of the eight 45 degree wedges around the viewpoint.
///
/// Scans run in octant-local coordinates where `y` is the row distance from
/// the eye and `0 <= x <= y`. The octant maps local points to offsets from
/// the eye.
///
/// ```notrust
///      7 | 4
///    6   |   5
///   -----@-----
///    1   |   2
///      0 | 3
/// ```
///
/// Y axis points down.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Octant(u8);

impl Octant {
    pub const ALL: [Octant; 8] = [
        Octant(0),
        Octant(1),
        Octant(2),
        Octant(3),
        Octant(4),
        Octant(5),
        Octant(6),
        Octant(7),
    ];

    /// Panics if `i` is not a valid octant index.
    pub fn new(i: u8) -> Self {
        assert!(i < 8, "Octant::new: bad octant index {i}");
        Octant(i)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Map an octant-local point to an offset from the eye.
    pub fn transform(self, [x, y]: [i32; 2]) -> [i32; 2] {
        match self.0 {
            0 => [-x, y],
            1 => [-y, x],
            2 => [y, x],
            3 => [x, y],
            4 => [x, -y],
            5 => [y, -x],
            6 => [-y, -x],
            7 => [-x, -y],
            _ => unreachable!(),
        }
    }
}

/// Wedge of darkness cast by an opaque cell, in octant-local coordinates.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Shadow {
    pub x: i32,
    pub y: i32,
}

impl Shadow {
    /// Whether the shadow covers the octant-local point.
    ///
    /// Only points on rows farther than the shadow's own row are covered.
    /// A shadow on the octant's axis column covers everything beyond it.
    pub fn covers(&self, [x, y]: [i32; 2]) -> bool {
        if y <= self.y {
            return false;
        }
        if self.x == 0 {
            return true;
        }

        let (sx, sy, x, y) = (self.x as f32, self.y as f32, x as f32, y as f32);
        let lower = sx / (sy + 1.0) * y;
        let upper = (sx + 1.0) / sy * y;
        lower < x && x < upper
    }
}

/// Scan a single octant out to `radius` rows.
///
/// The `visit` callback is called with the offset from the eye for every
/// cell of the scan and whether a shadow covers the cell. For uncovered
/// cells it returns `None` if the cell doesn't exist (it's outside the map)
/// or whether the cell blocks sight. The return value is ignored for
/// covered cells. Opaque cells are still visited, they only shadow the
/// cells behind them.
pub fn scan_octant<V>(
    octant: Octant,
    radius: i32,
    visit: &mut impl FnMut(V, bool) -> Option<bool>,
) where
    V: From<[i32; 2]>,
{
    let mut shadows: Vec<Shadow> = Vec::new();

    for y in 1..=radius {
        for x in 0..=y {
            let p = V::from(octant.transform([x, y]));
            if shadows.iter().any(|s| s.covers([x, y])) {
                visit(p, true);
                continue;
            }

            if let Some(true) = visit(p, false) {
                shadows.push(Shadow { x, y });
            }
        }
    }
}

/// Run the shadowcasting scan on all eight octants around the eye.
///
/// Cells on octant boundaries get visited more than once, possibly
/// shadowed in one octant and not in another. The eye cell itself is
/// never visited.
pub fn shadowcast<V>(
    radius: i32,
    mut visit: impl FnMut(V, bool) -> Option<bool>,
) where
    V: From<[i32; 2]>,
{
    for octant in Octant::ALL {
        scan_octant(octant, radius, &mut visit);
    }
}
