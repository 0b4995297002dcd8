//! Events reported to the display layer.

use glam::IVec2;

use crate::ThingId;

/// Something that happened during a tick that the UI may want to show.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Msg {
    /// Text message.
    Message(String),

    /// Thing took damage.
    Hurt(ThingId),

    /// An attack missed a thing.
    Miss(ThingId),

    /// Something died at the position.
    Death(IVec2),

    /// The player reached the given level.
    LevelUp(i32),

    /// The player died.
    Defeat,

    /// The player arrived on the floor of the given depth.
    Descended(i32),
}

/// Queue a formatted text message on a runtime.
#[macro_export]
macro_rules! msg {
    ($r:expr, $($arg:tt)*) => {
        $r.send_msg($crate::Msg::Message(format!($($arg)*)))
    };
}
