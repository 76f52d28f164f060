//! Room state and the two scheduled ticks

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::util::time::tick_delta;

use super::character::Character;
use super::item::{check_pickup, spawn_item, Item, ItemKind, RespawnQueue, INITIAL_ITEM_COUNT};
use super::map::{clamp_to_bounds, BoundingBox, OBSTACLES, PREDEFINED_POSITIONS};
use super::mode::{create_mode, GameMode, ModeKind};
use super::snapshot::{build_snapshot, RoomSnapshot};
use super::variant::CharacterKind;
use super::Vec3;

/// Room lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Accepting characters, loop not armed
    Idle,
    /// Both ticks armed
    Running,
    /// Loop cancelled, never restarts
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("Unknown character type: {0}")]
    UnknownVariant(u8),

    #[error("No spawn position available")]
    NoSpawnPosition,

    #[error("Character already in room: {0}")]
    DuplicateCharacter(String),

    #[error("Room has already started")]
    AlreadyStarted,

    #[error("Room is terminated")]
    Terminated,
}

/// Receives the room's outward-facing events
pub trait LoopObserver: Send {
    fn on_tick(&mut self, snapshot: &RoomSnapshot);
    fn on_game_over(&mut self, report: &GameOverReport);
}

/// Highest elevation reached by any character this match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighestRecord {
    pub character_id: String,
    pub nick_name: String,
    pub max_pos_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverReport {
    pub room_id: String,
    pub remain_running_time: u32,
    /// Set when the match ended with exactly one character left
    pub winner_id: Option<String>,
    pub highest: Option<HighestRecord>,
    pub ended_at: DateTime<Utc>,
}

/// Authoritative simulation of one room
pub struct RoomSimulation {
    room_id: String,
    phase: RoomPhase,
    remaining_time: u32,
    tick: u64,
    characters: Vec<Character>,
    items: Vec<Item>,
    available_positions: Vec<Vec3>,
    obstacles: Vec<BoundingBox>,
    respawns: RespawnQueue,
    mode: Box<dyn GameMode>,
    joined: usize,
    highest: Option<HighestRecord>,
    rng: ChaCha8Rng,
    observer: Option<Box<dyn LoopObserver>>,
}

impl RoomSimulation {
    pub fn new(room_id: impl Into<String>, time_budget: u32, mode: ModeKind) -> Self {
        Self::with_seed(room_id, time_budget, mode, rand::random())
    }

    pub fn with_seed(room_id: impl Into<String>, time_budget: u32, mode: ModeKind, seed: u64) -> Self {
        Self {
            room_id: room_id.into(),
            phase: RoomPhase::Idle,
            remaining_time: time_budget,
            tick: 0,
            characters: Vec::new(),
            items: Vec::new(),
            available_positions: PREDEFINED_POSITIONS.to_vec(),
            obstacles: OBSTACLES.to_vec(),
            respawns: RespawnQueue::default(),
            mode: create_mode(mode),
            joined: 0,
            highest: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            observer: None,
        }
    }

    /// Replace the spawn pool
    pub fn with_spawn_positions(mut self, positions: Vec<Vec3>) -> Self {
        self.available_positions = positions;
        self
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    pub fn mode(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn remaining_time(&self) -> u32 {
        self.remaining_time
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    fn character_mut(&mut self, id: &str) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[cfg(test)]
    pub(crate) fn available_positions(&self) -> usize {
        self.available_positions.len()
    }

    #[cfg(test)]
    pub(crate) fn highest(&self) -> Option<&HighestRecord> {
        self.highest.as_ref()
    }

    /// Add a character at an unused spawn position
    pub fn add_character(&mut self, id: &str, display_name: &str, char_type: u8) -> Result<(), RoomError> {
        match self.phase {
            RoomPhase::Running => return Err(RoomError::AlreadyStarted),
            RoomPhase::Terminated => return Err(RoomError::Terminated),
            RoomPhase::Idle => {}
        }
        if self.character(id).is_some() {
            return Err(RoomError::DuplicateCharacter(id.to_string()));
        }

        let kind = CharacterKind::try_from(char_type)?;
        let position = self.take_spawn_position()?;

        let mut character = Character::new(id.to_string(), display_name.to_string(), kind, position);
        self.mode.on_join(&mut character, self.joined);
        self.joined += 1;
        self.characters.push(character);

        info!(
            room_id = %self.room_id,
            character_id = %id,
            char_type,
            characters = self.characters.len(),
            "Character joined room"
        );
        Ok(())
    }

    fn take_spawn_position(&mut self) -> Result<Vec3, RoomError> {
        if self.available_positions.is_empty() {
            warn!(room_id = %self.room_id, "Spawn position pool exhausted");
            return Err(RoomError::NoSpawnPosition);
        }
        let idx = self.rng.gen_range(0..self.available_positions.len());
        Ok(self.available_positions.swap_remove(idx))
    }

    /// Remove a character. Its spawn position stays consumed.
    pub fn remove_character(&mut self, id: &str) -> bool {
        let before = self.characters.len();
        self.characters.retain(|c| c.id != id);
        let removed = self.characters.len() != before;
        if removed {
            info!(room_id = %self.room_id, character_id = %id, "Character left room");
        }
        removed
    }

    /// Arm both ticks. Spawns the initial items.
    pub fn start_loop(&mut self, observer: Box<dyn LoopObserver>) -> Result<(), RoomError> {
        match self.phase {
            RoomPhase::Running => return Err(RoomError::AlreadyStarted),
            RoomPhase::Terminated => return Err(RoomError::Terminated),
            RoomPhase::Idle => {}
        }

        for _ in 0..INITIAL_ITEM_COUNT {
            self.spawn_new_item();
        }
        self.observer = Some(observer);
        self.phase = RoomPhase::Running;

        info!(
            room_id = %self.room_id,
            mode = ?self.mode.kind(),
            remaining_time = self.remaining_time,
            "Room loop started"
        );
        Ok(())
    }

    /// Cancel both ticks. Safe to call repeatedly.
    pub fn stop_loop(&mut self) {
        if self.phase == RoomPhase::Terminated {
            return;
        }
        self.phase = RoomPhase::Terminated;
        self.observer = None;
        self.respawns.clear();
        info!(room_id = %self.room_id, tick = self.tick, "Room loop stopped");
    }

    fn is_game_over(&self) -> bool {
        self.remaining_time == 0 || self.characters.len() == 1
    }

    /// One-second countdown. Returns the report if this tick ended the match.
    pub fn countdown_tick(&mut self) -> Option<GameOverReport> {
        if self.phase != RoomPhase::Running {
            return None;
        }

        self.remaining_time = self.remaining_time.saturating_sub(1);
        if !self.is_game_over() {
            return None;
        }

        let report = GameOverReport {
            room_id: self.room_id.clone(),
            remain_running_time: self.remaining_time,
            winner_id: match self.characters.as_slice() {
                [last] => Some(last.id.clone()),
                _ => None,
            },
            highest: self.highest.clone(),
            ended_at: Utc::now(),
        };

        let observer = self.observer.take();
        self.stop_loop();
        if let Some(mut observer) = observer {
            observer.on_game_over(&report);
        }

        info!(
            room_id = %self.room_id,
            remaining_time = self.remaining_time,
            winner = ?report.winner_id,
            "Game over"
        );
        Some(report)
    }

    /// Advance the simulation one step and emit a snapshot.
    ///
    /// Order: character update, bounds clamp, item pickup, mode interaction,
    /// stats, snapshot, motion flag reset.
    pub fn simulation_tick(&mut self) -> Option<RoomSnapshot> {
        if self.phase != RoomPhase::Running {
            return None;
        }
        self.tick += 1;

        let dt = tick_delta();
        for character in self.characters.iter_mut() {
            character.update();
            character.integrate(dt);
            character.position = clamp_to_bounds(character.position);
        }

        for _ in 0..self.respawns.tick() {
            self.spawn_new_item();
        }

        for pickup in check_pickup(&mut self.characters, &mut self.items) {
            debug!(
                room_id = %self.room_id,
                character_id = %pickup.character_id,
                item_id = %pickup.item_id,
                kind = ?pickup.kind,
                "Item picked up"
            );
            self.respawns.schedule();
        }

        self.mode.resolve_tick(&mut self.characters);
        self.update_highest();

        let snapshot = build_snapshot(self.remaining_time, &self.characters, &self.items);
        if let Some(observer) = self.observer.as_mut() {
            observer.on_tick(&snapshot);
        }

        for character in self.characters.iter_mut() {
            character.reset_motion_flags();
        }

        Some(snapshot)
    }

    fn spawn_new_item(&mut self) {
        let item = spawn_item(&mut self.rng, &self.obstacles);
        self.items.push(item);
    }

    fn update_highest(&mut self) {
        for character in &self.characters {
            let best = self.highest.as_ref().map(|h| h.max_pos_y).unwrap_or(0.0);
            if character.position.y > best {
                self.highest = Some(HighestRecord {
                    character_id: character.id.clone(),
                    nick_name: character.display_name.clone(),
                    max_pos_y: character.position.y,
                });
            }
        }
    }

    /// Movement input. Out-of-range or stunned input is dropped.
    pub fn set_velocity(&mut self, id: &str, velocity: Vec3) -> bool {
        if self.phase == RoomPhase::Terminated {
            return false;
        }
        let accepted = self
            .character_mut(id)
            .map(|c| c.set_velocity(velocity))
            .unwrap_or(false);
        if !accepted {
            debug!(room_id = %self.room_id, character_id = %id, ?velocity, "Velocity rejected");
        }
        accepted
    }

    /// Flag the ability for the next simulation tick
    pub fn request_ability(&mut self, id: &str) {
        if self.phase == RoomPhase::Terminated {
            return;
        }
        if let Some(character) = self.character_mut(id) {
            character.skill_input = true;
        }
    }

    /// Consume the character's oldest item
    pub fn use_item(&mut self, id: &str) -> Option<ItemKind> {
        if self.phase == RoomPhase::Terminated {
            return None;
        }
        let kind = self.character_mut(id)?.use_item()?;
        if kind == ItemKind::Thunder {
            self.apply_thunder(id);
        }
        debug!(room_id = %self.room_id, character_id = %id, ?kind, "Item used");
        Some(kind)
    }

    fn apply_thunder(&mut self, caster_id: &str) {
        for other in self.characters.iter_mut().filter(|c| c.id != caster_id) {
            other.queue_thunder();
        }
    }

    /// Steal request, resolved by the room's mode
    pub fn steal(&mut self, id: &str) -> bool {
        if self.phase == RoomPhase::Terminated {
            return false;
        }
        match self.characters.iter().position(|c| c.id == id) {
            Some(idx) => self.mode.on_steal_request(idx, &mut self.characters),
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn clear_items(&mut self) {
        self.items.clear();
    }

    #[cfg(test)]
    pub(crate) fn place_item(&mut self, item: Item) {
        self.items.push(item);
    }

    #[cfg(test)]
    pub(crate) fn character_for_test(&mut self, id: &str) -> &mut Character {
        self.character_mut(id).expect("character exists")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::character::THUNDER_CAST_TICKS;
    use crate::game::item::ITEM_RESPAWN_TICKS;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorded {
        snapshots: Vec<RoomSnapshot>,
        game_overs: Vec<GameOverReport>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Recorded>>);

    impl LoopObserver for Recorder {
        fn on_tick(&mut self, snapshot: &RoomSnapshot) {
            self.0.lock().snapshots.push(snapshot.clone());
        }

        fn on_game_over(&mut self, report: &GameOverReport) {
            self.0.lock().game_overs.push(report.clone());
        }
    }

    fn room(mode: ModeKind, time: u32) -> RoomSimulation {
        RoomSimulation::with_seed("room-1", time, mode, 42)
    }

    fn started(mode: ModeKind, time: u32, ids: &[&str]) -> (RoomSimulation, Recorder) {
        let mut sim = room(mode, time);
        for id in ids {
            sim.add_character(id, id, 1).unwrap();
        }
        let recorder = Recorder::default();
        sim.start_loop(Box::new(recorder.clone())).unwrap();
        (sim, recorder)
    }

    #[test]
    fn unknown_variant_is_rejected_without_consuming_a_position() {
        let mut sim = room(ModeKind::Gift, 10);
        assert_eq!(sim.add_character("a", "a", 7), Err(RoomError::UnknownVariant(7)));
        assert_eq!(sim.available_positions(), PREDEFINED_POSITIONS.len());
    }

    #[test]
    fn exhausted_spawn_pool_fails_the_join() {
        let mut sim = room(ModeKind::Gift, 10).with_spawn_positions(vec![Vec3::ZERO]);
        sim.add_character("a", "a", 1).unwrap();
        assert_eq!(sim.add_character("b", "b", 2), Err(RoomError::NoSpawnPosition));
        assert_eq!(sim.characters().len(), 1);
    }

    #[test]
    fn removed_characters_do_not_return_positions() {
        let mut sim = room(ModeKind::Gift, 10);
        sim.add_character("a", "a", 1).unwrap();
        assert!(sim.remove_character("a"));
        assert!(!sim.remove_character("a"));
        assert_eq!(sim.available_positions(), PREDEFINED_POSITIONS.len() - 1);
    }

    #[test]
    fn spawn_positions_are_unique() {
        let mut sim = room(ModeKind::Gift, 10);
        for i in 0..PREDEFINED_POSITIONS.len() {
            sim.add_character(&i.to_string(), "n", 1).unwrap();
        }
        let mut positions: Vec<(i32, i32)> = sim
            .characters()
            .iter()
            .map(|c| (c.position.x as i32, c.position.z as i32))
            .collect();
        positions.sort();
        positions.dedup();
        assert_eq!(positions.len(), PREDEFINED_POSITIONS.len());
    }

    #[test]
    fn duplicate_character_is_rejected() {
        let mut sim = room(ModeKind::Gift, 10);
        sim.add_character("a", "a", 1).unwrap();
        assert_eq!(
            sim.add_character("a", "a", 1),
            Err(RoomError::DuplicateCharacter("a".into()))
        );
    }

    #[test]
    fn start_spawns_initial_items_once() {
        let (mut sim, _) = started(ModeKind::Gift, 10, &["a", "b"]);
        assert_eq!(sim.phase(), RoomPhase::Running);
        assert_eq!(sim.items().len(), INITIAL_ITEM_COUNT);
        assert_eq!(
            sim.start_loop(Box::new(Recorder::default())),
            Err(RoomError::AlreadyStarted)
        );
    }

    #[test]
    fn idle_room_does_not_tick() {
        let mut sim = room(ModeKind::Gift, 10);
        sim.add_character("a", "a", 1).unwrap();
        assert!(sim.simulation_tick().is_none());
        assert!(sim.countdown_tick().is_none());
        assert_eq!(sim.remaining_time(), 10);
    }

    #[test]
    fn game_over_when_time_runs_out() {
        let (mut sim, recorder) = started(ModeKind::Gift, 1, &["a", "b"]);

        let report = sim.countdown_tick().expect("game over");
        assert_eq!(sim.remaining_time(), 0);
        assert_eq!(report.winner_id, None);
        assert_eq!(sim.phase(), RoomPhase::Terminated);

        assert!(sim.countdown_tick().is_none());
        assert_eq!(recorder.0.lock().game_overs.len(), 1);
    }

    #[test]
    fn game_continues_while_time_and_players_remain() {
        let (mut sim, recorder) = started(ModeKind::Gift, 3, &["a", "b"]);
        assert!(sim.countdown_tick().is_none());
        assert!(sim.countdown_tick().is_none());
        assert_eq!(sim.remaining_time(), 1);
        assert!(recorder.0.lock().game_overs.is_empty());
    }

    #[test]
    fn game_over_when_one_character_remains() {
        let (mut sim, recorder) = started(ModeKind::Gift, 100, &["a", "b", "c"]);
        sim.remove_character("a");
        assert!(sim.countdown_tick().is_none());

        sim.remove_character("b");
        let report = sim.countdown_tick().expect("game over");
        assert_eq!(report.winner_id.as_deref(), Some("c"));
        assert_eq!(report.remain_running_time, 98);
        assert_eq!(recorder.0.lock().game_overs.len(), 1);
    }

    #[test]
    fn stop_is_idempotent_and_silences_snapshots() {
        let (mut sim, recorder) = started(ModeKind::Gift, 100, &["a", "b"]);
        assert!(sim.simulation_tick().is_some());
        assert_eq!(recorder.0.lock().snapshots.len(), 1);

        sim.stop_loop();
        sim.stop_loop();

        assert!(sim.simulation_tick().is_none());
        assert!(sim.countdown_tick().is_none());
        assert_eq!(recorder.0.lock().snapshots.len(), 1);
        assert!(recorder.0.lock().game_overs.is_empty());
        assert_eq!(sim.start_loop(Box::new(recorder.clone())), Err(RoomError::Terminated));
    }

    #[test]
    fn running_room_refuses_new_characters() {
        let (mut sim, _) = started(ModeKind::Gift, 100, &["a", "b"]);
        let free = sim.available_positions();
        assert_eq!(sim.add_character("c", "c", 1), Err(RoomError::AlreadyStarted));
        assert_eq!(sim.characters().len(), 2);
        assert_eq!(sim.available_positions(), free);
    }

    #[test]
    fn terminated_room_ignores_input() {
        let (mut sim, _) = started(ModeKind::Gift, 100, &["a", "b"]);
        sim.stop_loop();
        assert!(!sim.set_velocity("a", Vec3::new(1.0, 0.0, 0.0)));
        assert!(sim.use_item("a").is_none());
        assert!(!sim.steal("a"));
        assert_eq!(sim.add_character("c", "c", 1), Err(RoomError::Terminated));
    }

    #[test]
    fn velocity_moves_and_clamps_characters() {
        let (mut sim, _) = started(ModeKind::Gift, 100, &["a", "b"]);
        sim.character_for_test("a").position = Vec3::new(39.5, 0.0, 0.0);
        assert!(sim.set_velocity("a", Vec3::new(10.0, 0.0, 0.0)));
        assert!(!sim.set_velocity("a", Vec3::new(100.0, 0.0, 0.0)));

        sim.simulation_tick();
        assert_eq!(sim.character("a").unwrap().position.x, 40.0);
    }

    #[test]
    fn pickup_through_tick_schedules_respawn() {
        let (mut sim, _) = started(ModeKind::Gift, 100, &["a", "b"]);
        sim.clear_items();
        let pos = sim.character("a").unwrap().position;
        sim.place_item(Item {
            id: "near".into(),
            kind: ItemKind::Shield,
            position: pos,
        });

        sim.simulation_tick();
        assert_eq!(sim.character("a").unwrap().inventory().len(), 1);
        assert!(sim.items().is_empty());

        for _ in 0..ITEM_RESPAWN_TICKS - 1 {
            sim.simulation_tick();
        }
        assert!(sim.items().is_empty());
        sim.simulation_tick();
        assert_eq!(sim.items().len(), 1);
    }

    #[test]
    fn inventory_stays_bounded_over_many_ticks() {
        let (mut sim, _) = started(ModeKind::Gift, 100, &["a", "b"]);
        sim.clear_items();
        let pos = sim.character("a").unwrap().position;
        for i in 0..5 {
            sim.place_item(Item {
                id: format!("stack-{}", i),
                kind: ItemKind::Gift,
                position: pos,
            });
        }
        for _ in 0..5 {
            sim.simulation_tick();
            assert!(sim.character("a").unwrap().inventory().len() <= 2);
        }
        assert_eq!(sim.character("a").unwrap().inventory().len(), 2);
    }

    #[test]
    fn thunder_hits_everyone_but_the_caster() {
        let (mut sim, _) = started(ModeKind::Gift, 100, &["a", "b", "c"]);
        sim.character_for_test("a").pick_up(ItemKind::Thunder);

        assert_eq!(sim.use_item("a"), Some(ItemKind::Thunder));
        assert!(sim.character("a").unwrap().thunder_timers.is_empty());
        assert_eq!(sim.character("b").unwrap().thunder_timers, vec![THUNDER_CAST_TICKS]);
        assert_eq!(sim.character("c").unwrap().thunder_timers, vec![THUNDER_CAST_TICKS]);

        for _ in 0..THUNDER_CAST_TICKS {
            sim.simulation_tick();
        }
        assert!(sim.character("b").unwrap().is_stunned());
        assert!(!sim.character("a").unwrap().is_stunned());
    }

    #[test]
    fn tail_transfer_flag_lasts_one_tick() {
        let mut sim = room(ModeKind::TailTag, 100);
        // join order deals the tail to "b" only
        sim.add_character("b", "b", 1).unwrap();
        sim.add_character("a", "a", 1).unwrap();
        let recorder = Recorder::default();
        sim.start_loop(Box::new(recorder.clone())).unwrap();

        sim.character_for_test("b").position = Vec3::new(10.0, 0.0, 10.0);
        sim.character_for_test("a").position = Vec3::new(13.0, 0.0, 14.0);
        assert!(sim.character("b").unwrap().has_tail);
        assert!(!sim.character("a").unwrap().has_tail);

        let first = sim.simulation_tick().unwrap();
        let b = first.characters.iter().find(|c| c.id == "b").unwrap();
        let a = first.characters.iter().find(|c| c.id == "a").unwrap();
        assert!(a.has_tail);
        assert!(!b.has_tail);
        assert!(b.is_being_stolen);

        assert!(!sim.character("b").unwrap().is_being_stolen);

        // move apart so nothing changes hands on the next tick
        sim.character_for_test("b").position = Vec3::new(-30.0, 0.0, -30.0);
        let second = sim.simulation_tick().unwrap();
        let b = second.characters.iter().find(|c| c.id == "b").unwrap();
        assert!(!b.is_being_stolen);
        assert!(second.characters.iter().find(|c| c.id == "a").unwrap().has_tail);
    }

    #[test]
    fn gift_steal_sets_one_tick_flags() {
        let (mut sim, _) = started(ModeKind::Gift, 100, &["a", "b"]);
        sim.character_for_test("a").position = Vec3::new(5.0, 0.0, 5.0);
        sim.character_for_test("b").position = Vec3::new(6.0, 0.0, 5.0);
        sim.character_for_test("b").gift_count = 1;

        assert!(sim.steal("a"));
        let snapshot = sim.simulation_tick().unwrap();
        assert!(snapshot.characters.iter().find(|c| c.id == "a").unwrap().steal);
        assert!(snapshot.characters.iter().find(|c| c.id == "b").unwrap().stolen);

        assert!(!sim.character("a").unwrap().steal);
        assert!(!sim.character("b").unwrap().stolen);
        assert_eq!(sim.character("a").unwrap().gift_count, 1);
    }

    #[test]
    fn highest_elevation_is_recorded() {
        let (mut sim, _) = started(ModeKind::Gift, 100, &["a", "b"]);
        sim.character_for_test("b").position.y = 12.0;
        sim.simulation_tick();
        sim.character_for_test("b").position.y = 3.0;
        sim.simulation_tick();

        let highest = sim.highest().unwrap();
        assert_eq!(highest.character_id, "b");
        assert_eq!(highest.max_pos_y, 12.0);
    }

    #[test]
    fn snapshots_follow_join_order() {
        let (mut sim, recorder) = started(ModeKind::Gift, 100, &["x", "y", "z"]);
        sim.simulation_tick();
        let recorded = recorder.0.lock();
        let ids: Vec<&str> = recorded.snapshots[0].characters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
        assert_eq!(recorded.snapshots[0].map_items.len(), INITIAL_ITEM_COUNT);
    }
}
