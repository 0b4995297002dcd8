//! Generic field-of-view computation.

mod octant;
pub use octant::{scan_octant, shadowcast, Octant, Shadow};
