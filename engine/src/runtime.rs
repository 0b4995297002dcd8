use glam::IVec2;
use rand::SeedableRng;
use util::{GameRng, RngExt, VecExt};

use crate::{
    find_path, monster_hit_chance, player_hit_chance, prelude::*, Aggro,
    Animations, Dice, Exit, FloorState, Item, MapGen, SaveStore, SessionState,
    ALERT_RADIUS, ATTACK_ANIM_MS, MOVE_ANIM_MS, MOVE_COST, VIEW_RADIUS,
};

/// Who gets to act next.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Turn {
    /// Waiting for player input.
    Player,
    /// The monster acts on the next tick.
    Monster(ThingId),
    /// Nobody has action points left, start a new round.
    NewRound,
}

/// Main data container for game engine runtime.
pub struct Runtime {
    pub map: Map,
    pub db: ThingDb,
    pub anims: Animations,
    rng: GameRng,
    store: Box<dyn SaveStore>,
    mapgen: Box<dyn MapGen>,
    msgs: Vec<Msg>,
    status: ScenarioStatus,
    round: u64,
    now_ms: f64,
}

impl Runtime {
    /// Resume the saved session from the store or start a new game.
    pub fn new(
        mut db: ThingDb,
        store: impl SaveStore + 'static,
        mapgen: impl MapGen + 'static,
        seed: u64,
    ) -> Self {
        let mut store: Box<dyn SaveStore> = Box::new(store);
        let mut mapgen: Box<dyn MapGen> = Box::new(mapgen);
        let mut msgs = Vec::new();

        let saved = store
            .load_session()
            .and_then(|s| Some((store.load(s.depth)?, s)));

        let (map, rng) = if let Some((floor, session)) = saved {
            log::info!("Resuming saved game at depth {}", session.depth);
            db.set_next_id(session.next_id);
            db.reserve_ids(&floor.map);
            (floor.map, session.rng)
        } else {
            log::info!("Starting a new game with seed {seed}");
            store.clear_all();
            let mut rng = GameRng::seed_from_u64(seed);
            let player = match db.try_spawn("player") {
                Some(body) => Player::new(body),
                None => {
                    let mut player = Player::default();
                    player.body.id = db.alloc_id();
                    player
                }
            };
            let map = mapgen.generate(&mut db, 1, player, &mut rng);
            msgs.push(Msg::Descended(1));
            (map, rng)
        };

        let mut ret = Runtime {
            map,
            db,
            anims: Default::default(),
            rng,
            store,
            mapgen,
            msgs,
            status: ScenarioStatus::Ongoing,
            round: 0,
            now_ms: 0.0,
        };
        ret.map.update_visible(VIEW_RADIUS);
        ret.save();
        ret
    }

    pub fn player(&self) -> &Player {
        &self.map.player.thing
    }

    fn player_mut(&mut self) -> &mut Player {
        &mut self.map.player.thing
    }

    pub fn player_pos(&self) -> IVec2 {
        self.map.player_pos()
    }

    pub fn status(&self) -> ScenarioStatus {
        self.status
    }

    /// Number of rounds started since the runtime was created.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn store(&self) -> &dyn SaveStore {
        self.store.as_ref()
    }

    pub fn send_msg(&mut self, msg: Msg) {
        if let Msg::Message(text) = &msg {
            log::debug!("msg: {text}");
        }
        self.msgs.push(msg);
    }

    /// Take the messages queued since the last drain.
    pub fn drain_msgs(&mut self) -> impl Iterator<Item = Msg> + '_ {
        self.msgs.drain(..)
    }

    /// Whether the runtime is waiting for player input.
    pub fn is_player_turn(&self) -> bool {
        self.status == ScenarioStatus::Ongoing
            && self.anims.is_empty()
            && self.next_turn() == Turn::Player
    }

    /// Advance the game to the given wall clock time.
    ///
    /// Turns only advance when no animation is running, so every move
    /// plays out before the next one is decided.
    pub fn tick(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        self.anims.update(now_ms);
        for (id, anim) in self.anims.process_done() {
            if anim.done {
                log::trace!("Runtime::tick: animation of {id} finished");
            }
        }

        if self.anims.is_empty() && self.status == ScenarioStatus::Ongoing {
            self.update_aggro();
            match self.next_turn() {
                Turn::Player => {}
                Turn::Monster(id) => self.monster_act(id),
                Turn::NewRound => self.new_round(),
            }
        }

        self.map.update_visible(VIEW_RADIUS);
    }

    /// Decide whose turn it is.
    ///
    /// The creature with the most action points goes first, the player wins
    /// ties. Only monsters chasing the player take part.
    pub fn next_turn(&self) -> Turn {
        let player = self.player().economy.action;

        let mut best: Option<(ThingId, i32)> = None;
        for t in self.map.monsters.things() {
            let Some(m) = t.as_monster() else { continue };
            if m.aggro != Aggro::Aggro || !m.economy.can_act() {
                continue;
            }
            match best {
                Some((_, a)) if a >= m.economy.action => {}
                _ => best = Some((t.id, m.economy.action)),
            }
        }

        match best {
            Some((id, action)) if action > player => Turn::Monster(id),
            _ if player > 0 => Turn::Player,
            _ => Turn::NewRound,
        }
    }

    /// Monsters notice the player when they get a line of sight and lose
    /// interest when they lose it.
    ///
    /// Changing state drops the monster's action points, so it doesn't get
    /// to act right away on the turn it spots the player.
    ///
    /// On top of the line of sight, the player must also be within
    /// `ALERT_RADIUS` to be noticed.
    fn update_aggro(&mut self) {
        let eye = self.player_pos();
        let changes: Vec<(ThingId, Aggro)> = self
            .map
            .monsters
            .within(self.map.bounds())
            .filter_map(|p| {
                let m = p.thing.as_monster()?;
                let sees = (p.pos - eye).chess_len() <= ALERT_RADIUS
                    && self.map.has_line_of_sight(p.pos, eye);
                let aggro = if sees { Aggro::Aggro } else { Aggro::Idle };
                (aggro != m.aggro).then_some((p.thing.id, aggro))
            })
            .collect();

        for (id, aggro) in changes {
            if let Some(m) =
                self.map.monsters.get_mut(id).and_then(Thing::as_monster_mut)
            {
                log::debug!("Runtime: {id} goes {aggro:?}");
                m.aggro = aggro;
                m.economy.reset();
            }
        }
    }

    fn new_round(&mut self) {
        self.round += 1;
        log::debug!("Runtime: round {}", self.round);

        let ids: Vec<ThingId> =
            self.map.monsters.things().map(|t| t.id).collect();
        for id in ids {
            if let Some(m) =
                self.map.monsters.get_mut(id).and_then(Thing::as_monster_mut)
            {
                if m.aggro == Aggro::Aggro {
                    m.economy.start_round();
                }
            }
        }
        self.player_mut().economy.start_round();

        if self.player_mut().burn_light() {
            msg!(self, "Your light burns out.");
        }

        while self.player_mut().try_level_up() {
            let level = self.player().level;
            msg!(self, "You reach level {level}.");
            self.send_msg(Msg::LevelUp(level));
        }

        self.save();

        if self.player().is_dead() {
            self.defeat();
        }
    }

    /// Issue a player command.
    ///
    /// Commands are only taken when the runtime is waiting for the player,
    /// returns whether the command was accepted.
    pub fn act(&mut self, action: Action) -> bool {
        if !self.is_player_turn() {
            log::debug!("Runtime::act: not the player's turn, ignoring {action:?}");
            return false;
        }

        match action {
            Action::Pass => self.player_mut().economy.pass(),
            Action::Bump(dir) => self.bump(dir),
            Action::Shoot(id) => self.shoot(id),
            Action::Use(idx) => self.use_item(idx),
        }
        true
    }

    fn bump(&mut self, dir: IVec2) {
        if !dir.is_adjacent() {
            msg!(self, "You can only move one step at a time.");
            return;
        }
        let from = self.player_pos();
        let target = from + dir;

        let player = self.player().id();

        if let Some(id) = self.map.monster_id_at(target) {
            let weapon = self.player().melee_weapon();
            self.lunge(player, from, target);
            self.player_mut().economy.spend(weapon.action_cost);
            self.player_attack(id, weapon.attack, weapon.damage);
            return;
        }

        if self.map.open_door(target) {
            msg!(self, "You open the door.");
            self.player_mut().economy.spend(MOVE_COST);
            return;
        }

        if self.map.container_at(target).is_some() {
            self.open_container(target);
            self.player_mut().economy.spend(MOVE_COST);
            return;
        }

        if !self.map.is_passable(target) {
            msg!(self, "Something blocks your way.");
            return;
        }

        self.map.place_player(target);
        let now = self.now_ms;
        self.anims.insert(
            player,
            from.as_vec2(),
            target.as_vec2(),
            now,
            MOVE_ANIM_MS,
        );
        self.player_mut().economy.spend(MOVE_COST);

        if let Some(exit) = self.map.exit_at(target).and_then(as_exit) {
            self.change_floor(self.map.depth + exit.delta);
        }
    }

    fn shoot(&mut self, id: ThingId) {
        let Some(weapon) = self.player().ranged_weapon() else {
            panic!("Runtime::shoot: no ranged weapon equipped");
        };

        let Some(pos) = self.map.monsters.pos_of(id) else {
            msg!(self, "There's nothing there to shoot.");
            return;
        };

        if self.map.visibility_at(pos) != Visibility::Visible
            || !self.map.has_line_of_sight(self.player_pos(), pos)
        {
            msg!(self, "You don't have a clear shot.");
            return;
        }

        self.player_mut().economy.spend(weapon.action_cost);
        self.player_attack(id, weapon.attack, weapon.damage);
    }

    fn use_item(&mut self, idx: usize) {
        if idx >= self.player().inventory.len() {
            msg!(self, "You have nothing like that.");
            return;
        }
        let thing = self.player_mut().inventory.remove(idx);
        let Some(item) = thing.as_item().cloned() else {
            msg!(self, "You can't use the {}.", thing.name);
            self.player_mut().inventory.insert(idx, thing);
            return;
        };

        let name = thing.name.clone();
        match item {
            Item::Potion { heal } => {
                let amount = heal.roll(&mut self.rng);
                let p = self.player_mut();
                p.health = (p.health + amount).min(p.max_health);
                msg!(self, "You drink the {name} and heal {amount}.");
            }
            Item::Weapon(w) => {
                let p = self.player_mut();
                let slot = if w.ranged { &mut p.ranged } else { &mut p.melee };
                if let Some(old) = slot.replace(thing) {
                    p.inventory.push(old);
                }
                msg!(self, "You wield the {name}.");
            }
            Item::Armor { .. } => {
                let p = self.player_mut();
                if let Some(old) = p.armor.replace(thing) {
                    p.inventory.push(old);
                }
                msg!(self, "You put on the {name}.");
            }
            Item::Light(light) => {
                self.player_mut().light = Some(light);
                msg!(self, "You light the {name}.");
            }
        }
        self.player_mut().economy.spend(MOVE_COST);
    }

    fn open_container(&mut self, pos: IVec2) {
        let Some(id) = self.map.containers.id_at(pos) else {
            return;
        };
        let Some(chest) = self.map.containers.delete(id) else {
            return;
        };
        let ThingKind::Container(contents) = chest.kind else {
            return;
        };

        msg!(self, "You open the {}.", chest.name);
        if contents.gold > 0 {
            self.player_mut().gold += contents.gold;
            msg!(self, "You find {} gold.", contents.gold);
        }
        for name in &contents.items {
            match self.db.try_spawn(name) {
                Some(item) => {
                    msg!(self, "You find a {}.", item.name);
                    self.player_mut().inventory.push(item);
                }
                None => log::warn!("Container holds unknown item {name:?}"),
            }
        }
    }

    fn player_attack(&mut self, id: ThingId, bonus: i32, damage: Dice) {
        let Some(target) = self.map.monsters.get(id) else {
            return;
        };
        let Some(m) = target.as_monster() else {
            return;
        };
        let name = target.name.clone();
        let chance =
            player_hit_chance(self.player().attack + bonus, m.defense);

        if !self.rng.chance(chance) {
            msg!(self, "You miss the {name}.");
            self.send_msg(Msg::Miss(id));
            return;
        }

        let dmg = damage.roll(&mut self.rng);
        let Some(m) =
            self.map.monsters.get_mut(id).and_then(Thing::as_monster_mut)
        else {
            return;
        };
        m.health -= dmg;
        let dead = m.health < 0;
        msg!(self, "You hit the {name} for {dmg}.");
        self.send_msg(Msg::Hurt(id));

        if dead {
            self.defeat_monster(id);
        }
    }

    /// Remove a slain monster and give the player its experience and gold.
    fn defeat_monster(&mut self, id: ThingId) {
        let Some(pos) = self.map.monsters.pos_of(id) else {
            return;
        };
        let Some(thing) = self.map.monsters.delete(id) else {
            return;
        };
        self.anims.remove(id);

        if let Some(m) = thing.as_monster() {
            let p = self.player_mut();
            p.experience += m.experience;
            p.gold += m.gold;
        }
        msg!(self, "The {} dies.", thing.name);
        self.send_msg(Msg::Death(pos));
    }

    fn monster_act(&mut self, id: ThingId) {
        let Some(pos) = self.map.monsters.pos_of(id) else {
            return;
        };
        let Some(cost) = self
            .map
            .monsters
            .get(id)
            .and_then(Thing::as_monster)
            .map(|m| m.action_cost.max(1))
        else {
            return;
        };
        let eye = self.player_pos();

        if (eye - pos).is_adjacent() {
            self.lunge(id, pos, eye);
            self.spend_monster(id, cost);
            self.monster_attack(id);
            return;
        }

        match find_path(&self.map, pos, eye).first() {
            Some(&next) if self.map.is_passable(next) => {
                self.map.monsters.relocate(id, next);
                let now = self.now_ms;
                self.anims.insert(
                    id,
                    pos.as_vec2(),
                    next.as_vec2(),
                    now,
                    MOVE_ANIM_MS,
                );
                self.spend_monster(id, cost);
            }
            _ => {
                log::debug!("Runtime: {id} has nowhere to go, passing");
                if let Some(m) =
                    self.map.monsters.get_mut(id).and_then(Thing::as_monster_mut)
                {
                    m.economy.pass();
                }
            }
        }
    }

    fn spend_monster(&mut self, id: ThingId, cost: i32) {
        if let Some(m) =
            self.map.monsters.get_mut(id).and_then(Thing::as_monster_mut)
        {
            m.economy.spend(cost);
        }
    }

    fn monster_attack(&mut self, id: ThingId) {
        let Some(thing) = self.map.monsters.get(id) else {
            return;
        };
        let Some(m) = thing.as_monster() else {
            return;
        };
        let (name, attack, damage) = (thing.name.clone(), m.attack, m.damage);
        let player_id = self.player().id();
        let chance = monster_hit_chance(attack, self.player().total_defense());

        if !self.rng.chance(chance) {
            msg!(self, "The {name} misses you.");
            self.send_msg(Msg::Miss(player_id));
            return;
        }

        let dmg = damage.roll(&mut self.rng);
        self.player_mut().health -= dmg;
        msg!(self, "The {name} hits you for {dmg}.");
        self.send_msg(Msg::Hurt(player_id));

        if self.player().is_dead() {
            self.defeat();
        }
    }

    fn defeat(&mut self) {
        if self.status != ScenarioStatus::Ongoing {
            return;
        }
        log::info!("Player died on depth {}", self.map.depth);
        self.status = ScenarioStatus::Lost;
        msg!(self, "You die.");
        self.send_msg(Msg::Defeat);
        self.store.clear_all();
    }

    /// Short jab towards the target and back.
    fn lunge(&mut self, id: ThingId, from: IVec2, to: IVec2) {
        let from = from.as_vec2();
        let start = from.lerp(to.as_vec2(), 0.5);
        let now = self.now_ms;
        self.anims.insert(id, start, from, now, ATTACK_ANIM_MS);
    }

    /// Leave the current floor for the one at `depth`.
    ///
    /// The current floor is saved first. A floor visited before is loaded
    /// from the store, otherwise a new one is generated. The player arrives
    /// on the exit leading back, if there is one.
    pub fn change_floor(&mut self, depth: i32) {
        if depth < 1 {
            msg!(self, "The way out is sealed.");
            return;
        }
        let old_depth = self.map.depth;
        self.save();

        let player = self.player().clone();
        let mut map = match self.store.load(depth) {
            Some(FloorState { mut map }) => {
                map.player.thing = player;
                map
            }
            None => self.mapgen.generate(
                &mut self.db,
                depth,
                player,
                &mut self.rng,
            ),
        };

        let back = old_depth - depth;
        let arrival = map
            .exits
            .within(map.bounds())
            .find(|p| as_exit(p.thing).is_some_and(|e| e.delta == back))
            .map(|p| p.pos);
        if let Some(pos) = arrival {
            map.place_player(pos);
        }

        log::info!("Runtime: moving from depth {old_depth} to {depth}");
        self.map = map;
        self.db.reserve_ids(&self.map);
        self.anims = Default::default();
        self.map.update_visible(VIEW_RADIUS);
        self.send_msg(Msg::Descended(depth));
        self.save();
    }

    /// Write the current floor and session to the store.
    pub fn save(&mut self) {
        let depth = self.map.depth;
        self.store.save(
            depth,
            &FloorState {
                map: self.map.clone(),
            },
        );
        self.store.save_session(&SessionState {
            rng: self.rng.clone(),
            depth,
            next_id: self.db.next_id(),
        });
    }
}

fn as_exit(thing: &Thing) -> Option<Exit> {
    match thing.kind {
        ThingKind::Exit(exit) => Some(exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;
    use crate::{LightSource, MemoryStore};

    /// Open 12x12 floor with the player at (2, 2).
    struct TestGen(fn(&mut Map, &mut ThingDb));

    impl MapGen for TestGen {
        fn generate(
            &mut self,
            db: &mut ThingDb,
            depth: i32,
            player: Player,
            _rng: &mut GameRng,
        ) -> Map {
            let mut map = Map::new(12, 12, depth, player, ivec2(2, 2));
            for p in map.bounds() {
                map.tiles.set(p, db.spawn("floor"));
            }
            (self.0)(&mut map, db);
            map
        }
    }

    fn runtime(setup: fn(&mut Map, &mut ThingDb)) -> Runtime {
        Runtime::new(
            ThingDb::builtin().unwrap(),
            MemoryStore::default(),
            TestGen(setup),
            1,
        )
    }

    fn monster_id(r: &Runtime) -> ThingId {
        r.map.monsters.things().next().unwrap().id
    }

    fn monster(r: &Runtime) -> &crate::Monster {
        r.map.monsters.things().next().unwrap().as_monster().unwrap()
    }

    #[test]
    fn mismatched_floor_save_starts_fresh() {
        let old = runtime(|_, _| {});
        let mut store = MemoryStore::default();
        store.save_session(&old.store().load_session().unwrap());
        let blob = old.store().read("delve.floor.1").unwrap();
        assert!(blob.contains("\"width\":12"));
        store
            .write(
                "delve.floor.1",
                blob.replacen("\"width\":12", "\"width\":30", 1),
            )
            .unwrap();

        let mut r = Runtime::new(
            ThingDb::builtin().unwrap(),
            store,
            TestGen(|_, _| {}),
            2,
        );
        assert_eq!(r.map.width(), 12);
        // Only new games announce the first floor.
        assert!(r.drain_msgs().any(|m| m == Msg::Descended(1)));
    }

    #[test]
    fn first_tick_starts_a_round() {
        let mut r = runtime(|_, _| {});
        assert_eq!(r.next_turn(), Turn::NewRound);
        assert!(!r.act(Action::Pass));

        r.tick(0.0);
        assert_eq!(r.round(), 1);
        assert_eq!(r.player().economy.action, 2);
        assert_eq!(r.next_turn(), Turn::Player);
        assert!(r.is_player_turn());
    }

    #[test]
    fn passing_banks_actions() {
        let mut r = runtime(|_, _| {});
        r.tick(0.0);
        assert!(r.act(Action::Pass));
        assert_eq!(r.player().economy.action, 0);
        assert_eq!(r.player().economy.action_reservoir, 2);

        r.tick(16.0);
        // Only agility worth of the reservoir carries over.
        assert_eq!(r.player().economy.action, 1 + 1 + 1);
        assert_eq!(r.player().economy.action_reservoir, 0);
    }

    #[test]
    fn animations_gate_input() {
        let mut r = runtime(|_, _| {});
        r.tick(0.0);
        assert!(r.act(Action::Bump(ivec2(1, 0))));
        assert_eq!(r.player_pos(), ivec2(3, 2));
        assert_eq!(r.player().economy.action, 1);

        r.tick(MOVE_ANIM_MS / 2.0);
        assert!(!r.anims.is_empty());
        assert!(!r.act(Action::Bump(ivec2(1, 0))));
        assert_eq!(r.player_pos(), ivec2(3, 2));

        r.tick(MOVE_ANIM_MS);
        assert!(r.anims.is_empty());
        assert!(r.act(Action::Bump(ivec2(1, 0))));
        assert_eq!(r.player_pos(), ivec2(4, 2));
    }

    #[test]
    fn walls_cost_nothing() {
        let mut r = runtime(|map, db| {
            map.tiles.set(ivec2(3, 2), db.spawn("wall"));
        });
        r.tick(0.0);
        r.drain_msgs().for_each(drop);
        assert!(r.act(Action::Bump(ivec2(1, 0))));
        assert_eq!(r.player_pos(), ivec2(2, 2));
        assert_eq!(r.player().economy.action, 2);
        assert!(r
            .drain_msgs()
            .any(|m| matches!(m, Msg::Message(s) if s.contains("blocks"))));
    }

    #[test]
    fn bumps_are_single_steps() {
        let mut r = runtime(|map, db| {
            for y in 0..12 {
                map.tiles.set(ivec2(4, y), db.spawn("wall"));
            }
        });
        r.tick(0.0);
        r.drain_msgs().for_each(drop);
        for dir in [ivec2(5, 0), ivec2(1, 1), ivec2(0, 0)] {
            assert!(r.act(Action::Bump(dir)));
            assert_eq!(r.player_pos(), ivec2(2, 2));
            assert_eq!(r.player().economy.action, 2);
        }
        assert!(r.anims.is_empty());
        assert_eq!(
            r.drain_msgs()
                .filter(|m| matches!(m, Msg::Message(s) if s.contains("one step")))
                .count(),
            3
        );
    }

    #[test]
    fn spotting_the_player_resets_actions() {
        let mut r = runtime(|map, db| {
            let mut goblin = db.spawn("goblin");
            goblin.as_monster_mut().unwrap().economy.action = 5;
            map.monsters.set(ivec2(6, 2), goblin);
        });
        r.tick(0.0);
        assert_eq!(monster(&r).aggro, Aggro::Aggro);
        // Reset on noticing, then refilled by the round start.
        assert_eq!(monster(&r).economy.action, 2);
        // Ties go to the player.
        assert_eq!(r.player().economy.action, 2);
        assert_eq!(r.next_turn(), Turn::Player);
    }

    #[test]
    fn losing_sight_calms_monsters() {
        let mut r = runtime(|map, db| {
            map.monsters.set(ivec2(6, 2), db.spawn("goblin"));
        });
        r.tick(0.0);
        assert_eq!(monster(&r).aggro, Aggro::Aggro);
        assert_eq!(monster(&r).economy.action, 2);

        for y in 0..12 {
            let wall = r.db.spawn("wall");
            r.map.tiles.set(ivec2(4, y), wall);
        }
        r.tick(16.0);
        assert_eq!(monster(&r).aggro, Aggro::Idle);
        assert_eq!(monster(&r).economy.action, 0);
        assert_eq!(r.next_turn(), Turn::Player);
    }

    #[test]
    fn unseen_monsters_stay_idle() {
        let mut r = runtime(|map, db| {
            for y in 0..12 {
                map.tiles.set(ivec2(5, y), db.spawn("wall"));
            }
            map.monsters.set(ivec2(8, 2), db.spawn("goblin"));
        });
        r.tick(0.0);
        r.tick(16.0);
        assert_eq!(monster(&r).aggro, Aggro::Idle);
        assert_eq!(monster(&r).economy.action, 0);
        assert_eq!(r.map.visibility_at(ivec2(8, 2)), Visibility::None);
    }

    #[test]
    fn strictly_more_actions_win_the_turn() {
        let mut r = runtime(|map, db| {
            map.monsters.set(ivec2(6, 2), db.spawn("goblin"));
            map.monsters.set(ivec2(6, 3), db.spawn("rat"));
        });
        r.tick(0.0);
        let ids: Vec<ThingId> = r.map.monsters.things().map(|t| t.id).collect();
        for &id in &ids {
            let m = r.map.monsters.get_mut(id).unwrap();
            m.as_monster_mut().unwrap().economy.action = 3;
        }
        // First of the equals goes first.
        assert_eq!(r.next_turn(), Turn::Monster(ids[0]));

        r.map.player.thing.economy.action = 3;
        assert_eq!(r.next_turn(), Turn::Player);
    }

    #[test]
    fn monsters_approach() {
        let mut r = runtime(|map, db| {
            map.monsters.set(ivec2(6, 2), db.spawn("rat"));
        });
        r.tick(0.0);
        r.act(Action::Pass);
        // The rat has the initiative now.
        let id = monster_id(&r);
        assert_eq!(r.next_turn(), Turn::Monster(id));
        r.tick(16.0);
        assert_eq!(r.map.monsters.pos_of(id), Some(ivec2(5, 2)));
        assert!(r.anims.position(id).is_some());
        assert_eq!(monster(&r).economy.action, 1);
    }

    #[test]
    fn adjacent_monsters_attack() {
        let mut r = runtime(|map, db| {
            map.monsters.set(ivec2(3, 2), db.spawn("rat"));
        });
        r.tick(0.0);
        r.drain_msgs().for_each(drop);
        r.act(Action::Pass);
        r.tick(16.0);

        let player = r.player().id();
        let msgs: Vec<Msg> = r.drain_msgs().collect();
        assert!(
            msgs.contains(&Msg::Hurt(player))
                || msgs.contains(&Msg::Miss(player))
        );
        assert_eq!(r.map.monsters.pos_of(monster_id(&r)), Some(ivec2(3, 2)));
    }

    #[test]
    fn melee_resolves() {
        let mut r = runtime(|map, db| {
            map.monsters.set(ivec2(3, 2), db.spawn("orc"));
        });
        r.tick(0.0);
        let id = monster_id(&r);
        r.drain_msgs().for_each(drop);
        assert!(r.act(Action::Bump(ivec2(1, 0))));
        assert_eq!(r.player_pos(), ivec2(2, 2));
        assert_eq!(r.player().economy.action, 1);
        let msgs: Vec<Msg> = r.drain_msgs().collect();
        assert!(msgs.contains(&Msg::Hurt(id)) || msgs.contains(&Msg::Miss(id)));
        assert!(r.anims.position(r.player().id()).is_some());
    }

    #[test]
    fn slain_monsters_pay_out() {
        let mut r = runtime(|map, db| {
            map.monsters.set(ivec2(3, 2), db.spawn("goblin"));
        });
        r.tick(0.0);
        let id = monster_id(&r);
        r.map.player.thing.experience = 7;
        r.defeat_monster(id);

        assert!(r.map.monsters.is_empty());
        assert_eq!(r.player().experience, 7 + 4);
        assert_eq!(r.player().gold, 3);
        assert!(r.drain_msgs().any(|m| m == Msg::Death(ivec2(3, 2))));

        // Level up waits for the next round.
        assert_eq!(r.player().level, 1);
        r.act(Action::Pass);
        r.tick(16.0);
        assert_eq!(r.player().level, 2);
        assert_eq!(r.player().experience, 1);
        assert!(r.drain_msgs().any(|m| m == Msg::LevelUp(2)));
    }

    #[test]
    fn death_ends_the_game() {
        let mut r = runtime(|_, _| {});
        r.tick(0.0);
        r.map.player.thing.health = 0;
        r.act(Action::Pass);
        r.tick(16.0);
        assert_eq!(r.status(), ScenarioStatus::Lost);
        assert!(r.drain_msgs().any(|m| m == Msg::Defeat));
        assert!(!r.act(Action::Pass));
        assert!(r.store().load_session().is_none());
    }

    #[test]
    fn doors_and_chests() {
        let mut r = runtime(|map, db| {
            map.fixtures.set(ivec2(3, 2), db.spawn("door"));
            map.containers.set(ivec2(2, 3), db.spawn("chest"));
        });
        r.tick(0.0);
        assert!(r.act(Action::Bump(ivec2(1, 0))));
        assert!(r.map.is_passable(ivec2(3, 2)));
        assert_eq!(r.player_pos(), ivec2(2, 2));

        assert!(r.act(Action::Bump(ivec2(0, 1))));
        assert!(r.map.containers.is_empty());
        assert_eq!(r.player().gold, 10);
        assert_eq!(r.player().inventory.len(), 1);
        assert_eq!(r.player().inventory[0].name, "potion");
    }

    #[test]
    fn using_items() {
        let mut r = runtime(|_, _| {});
        r.tick(0.0);
        let sword = r.db.spawn("sword");
        let potion = r.db.spawn("potion");
        let lantern = r.db.spawn("lantern");
        let p = &mut r.map.player.thing;
        p.inventory = vec![sword, potion, lantern];
        p.health = 5;

        assert!(r.act(Action::Use(0)));
        assert_eq!(r.player().melee_weapon().attack, 2);
        assert!(r.act(Action::Use(0)));
        assert!(r.player().health > 5);
        assert!(r.player().health <= r.player().max_health);

        r.act(Action::Pass);
        r.tick(16.0);
        assert!(r.act(Action::Use(0)));
        assert_eq!(
            r.player().light,
            Some(LightSource {
                radius: 3,
                duration: 50
            })
        );
        assert!(r.player().inventory.is_empty());

        // Out of range, no cost.
        let before = r.player().economy.action;
        assert!(r.act(Action::Use(3)));
        assert_eq!(r.player().economy.action, before);
    }

    #[test]
    #[should_panic]
    fn shooting_needs_a_bow() {
        let mut r = runtime(|map, db| {
            map.monsters.set(ivec2(6, 2), db.spawn("rat"));
        });
        r.tick(0.0);
        let id = monster_id(&r);
        r.act(Action::Shoot(id));
    }

    #[test]
    fn shooting_needs_a_clear_view() {
        let mut r = runtime(|map, db| {
            map.tiles.set(ivec2(4, 2), db.spawn("wall"));
            map.monsters.set(ivec2(6, 2), db.spawn("rat"));
            map.monsters.set(ivec2(2, 5), db.spawn("rat"));
        });
        r.tick(0.0);
        let bow = r.db.spawn("bow");
        r.map.player.thing.ranged = Some(bow);
        let ids: Vec<ThingId> = r.map.monsters.things().map(|t| t.id).collect();

        assert!(r.act(Action::Shoot(ids[0])));
        assert_eq!(r.player().economy.action, 2);

        assert!(r.act(Action::Shoot(ids[1])));
        assert_eq!(r.player().economy.action, 1);
    }

    #[test]
    fn light_burns_down_each_round() {
        let mut r = runtime(|_, _| {});
        r.map.player.thing.light = Some(LightSource {
            radius: 2,
            duration: 2,
        });
        r.tick(0.0);
        assert_eq!(r.player().light.map(|l| l.duration), Some(1));
        r.act(Action::Pass);
        r.tick(16.0);
        assert_eq!(r.player().light, None);
    }

    #[test]
    fn taking_the_stairs() {
        let mut r = runtime(|map, db| {
            let name = if map.depth > 1 { "stairs-up" } else { "stairs-down" };
            map.exits.set(ivec2(3, 2), db.spawn(name));
        });
        r.tick(0.0);
        let player = r.player().id();
        assert!(r.act(Action::Bump(ivec2(1, 0))));
        assert_eq!(r.map.depth, 2);
        // Arrived on the way back up.
        assert_eq!(r.player_pos(), ivec2(3, 2));
        assert_eq!(r.player().id(), player);
        assert!(r.anims.is_empty());
        assert!(r.drain_msgs().any(|m| m == Msg::Descended(2)));
        assert!(r.store().load(1).is_some());
        assert_eq!(r.store().load_session().unwrap().depth, 2);

        // Step off and back on the stairs up.
        r.tick(16.0);
        r.act(Action::Bump(ivec2(0, 1)));
        r.tick(200.0);
        r.tick(216.0);
        if !r.is_player_turn() {
            r.tick(232.0);
        }
        assert!(r.act(Action::Bump(ivec2(0, -1))));
        assert_eq!(r.map.depth, 1);
        assert_eq!(r.player_pos(), ivec2(3, 2));
        assert!(matches!(
            r.map.exit_at(ivec2(3, 2)).map(|t| &t.kind),
            Some(ThingKind::Exit(crate::Exit { delta: 1 }))
        ));
    }
}
