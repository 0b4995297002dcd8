//! Unopinionated standalone utilities.

mod geom;
pub use geom::{bresenham_line, VecExt, DIR_4};

mod grid;
pub use grid::Grid;

mod path;
pub use path::astar_path;

mod rect;
pub use rect::Rect;

mod rng;
pub use rng::{srng, RngExt};

pub type FastHasher = rustc_hash::FxHasher;

/// Map with an efficient hash function.
pub use rustc_hash::FxHashMap as HashMap;

/// Set with an efficient hash function.
pub use rustc_hash::FxHashSet as HashSet;

type DefaultHashBuilder = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// Insertion order preserving map with an efficient hash function.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, DefaultHashBuilder>;

/// Good default concrete rng.
///
/// The state is four 32-bit words and serializes as such.
pub type GameRng = rand_xorshift::XorShiftRng;
