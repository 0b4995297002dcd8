//! Text display of the game state.

use std::fmt::Write;

use engine::{prelude::*, Visibility};

/// Visible window radius around the player.
const SCREEN_RADIUS: i32 = 12;

/// One line of text for the event log, if the event has any.
pub fn describe(msg: &Msg) -> Option<String> {
    match msg {
        Msg::Message(text) => Some(text.clone()),
        Msg::LevelUp(level) => Some(format!("*** Level {level} ***")),
        Msg::Defeat => Some("*** Game over ***".into()),
        Msg::Descended(depth) => Some(format!("--- Depth {depth} ---")),
        Msg::Hurt(_) | Msg::Miss(_) | Msg::Death(_) => None,
    }
}

/// Draw the map around the player followed by a status line.
pub fn screen(r: &Runtime) -> String {
    let map = &r.map;
    let area = Rect::around(r.player_pos(), SCREEN_RADIUS)
        .intersection(&map.bounds());

    let mut cells: HashMap<IVec2, char> = HashMap::default();
    for p in map.tiles.within(area) {
        cells.insert(p.pos, p.thing.icon);
    }
    for layer in [&map.exits, &map.containers, &map.fixtures] {
        for p in layer.within(area) {
            cells.insert(p.pos, p.thing.icon);
        }
    }

    // Things in motion are drawn where their animation has them. Monsters
    // only show up in lit cells.
    for p in map.monsters.within(area) {
        let pos = r
            .anims
            .position(p.thing.id)
            .map_or(p.pos, |v| v.round().as_ivec2());
        if map.visibility_at(p.pos) == Visibility::Visible {
            cells.insert(pos, p.thing.icon);
        }
    }
    let player = &map.player;
    let pos = r
        .anims
        .position(player.thing.id())
        .map_or(player.pos, |v| v.round().as_ivec2());
    cells.insert(pos, player.thing.body.icon);

    let mut ret = String::new();
    for y in area.p0.y..area.p1.y {
        for x in area.p0.x..area.p1.x {
            let p = ivec2(x, y);
            ret.push(match map.visibility_at(p) {
                Visibility::None => ' ',
                _ => cells.get(&p).copied().unwrap_or(' '),
            });
        }
        ret.push('\n');
    }

    let p = r.player();
    let _ = writeln!(
        ret,
        "Depth {}  HP {}/{}  Lv {}  XP {}/{}  Gold {}  Round {}",
        map.depth,
        p.health,
        p.max_health,
        p.level,
        p.experience,
        p.next_level_xp(),
        p.gold,
        r.round()
    );
    ret
}
