pub use crate::{
    msg, Action, Layer, Map, Msg, Occupant, Placed, Player, Runtime,
    ScenarioStatus, Thing, ThingDb, ThingId, ThingKind, Visibility,
};
pub use glam::{ivec2, vec2, IVec2, Vec2};
pub use util::{HashMap, HashSet, IndexMap, Rect, VecExt, DIR_4};
