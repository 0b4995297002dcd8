//! Automatic player for headless runs.

use engine::{find_path, prelude::*, Item, Visibility};

/// Pick the next action for the player.
pub fn decide(r: &Runtime) -> Action {
    let p = r.player();
    let pos = r.player_pos();

    // Drink when hurt, put on anything useful that's being carried.
    for (i, thing) in p.inventory.iter().enumerate() {
        match thing.as_item() {
            Some(Item::Potion { .. }) if p.health * 2 < p.max_health => {
                return Action::Use(i);
            }
            Some(Item::Weapon(w)) if w.ranged && p.ranged.is_none() => {
                return Action::Use(i);
            }
            Some(Item::Weapon(w))
                if !w.ranged && w.attack > p.melee_weapon().attack =>
            {
                return Action::Use(i);
            }
            Some(Item::Armor { .. }) if p.armor.is_none() => {
                return Action::Use(i);
            }
            Some(Item::Light(_)) if p.light.is_none() => {
                return Action::Use(i);
            }
            _ => {}
        }
    }

    let enemy = r
        .map
        .monsters
        .within(r.map.bounds())
        .filter(|m| r.map.visibility_at(m.pos) == Visibility::Visible)
        .min_by_key(|m| (m.pos - pos).taxi_len());

    if let Some(enemy) = enemy {
        let dist = (enemy.pos - pos).taxi_len();
        if dist > 1
            && p.ranged_weapon().is_some()
            && r.map.has_line_of_sight(pos, enemy.pos)
        {
            return Action::Shoot(enemy.thing.id);
        }
        if let Some(&step) = find_path(&r.map, pos, enemy.pos).first() {
            return Action::Bump(step - pos);
        }
    }

    // Loot, then doors, then the way down.
    let goals = r
        .map
        .containers
        .within(r.map.bounds())
        .filter(|c| r.map.seen_at(c.pos))
        .map(|c| c.pos)
        .chain(
            r.map
                .fixtures
                .within(r.map.bounds())
                .filter(|f| f.thing.is_closed_door() && r.map.seen_at(f.pos))
                .map(|f| f.pos),
        )
        .chain(
            r.map
                .exits
                .within(r.map.bounds())
                .filter(|e| {
                    matches!(e.thing.kind, ThingKind::Exit(x) if x.delta > 0)
                })
                .map(|e| e.pos),
        );

    for goal in goals {
        if let Some(&step) = find_path(&r.map, pos, goal).first() {
            return Action::Bump(step - pos);
        }
    }

    Action::Pass
}
