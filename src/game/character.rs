//! Character state and the per-tick update rule

use std::collections::VecDeque;

use crate::util::time::secs_to_ticks;

use super::item::ItemKind;
use super::variant::CharacterKind;
use super::Vec3;

/// Max items carried at once
pub const INVENTORY_CAPACITY: usize = 2;
/// Speed lost per carried gift
pub const GIFT_SPEED_PENALTY: f32 = 1.5;
/// Speed gained while a boost item is active
pub const SPEED_UP_BONUS: f32 = 5.0;

pub const BOOST_DURATION: u32 = secs_to_ticks(5);
pub const SHIELD_DURATION: u32 = secs_to_ticks(5);
/// Delay between a thunder cast and the stun landing
pub const THUNDER_CAST_TICKS: u32 = secs_to_ticks(2);
/// Stun applied by a landed thunder
pub const THUNDER_EVENT_BLOCK: u32 = secs_to_ticks(3);
/// Stun applied to the victim of a gift steal
pub const ITEM_EVENT_BLOCK: u32 = secs_to_ticks(1);

/// Allowed slack over the current speed when validating client velocity
pub const VELOCITY_TOLERANCE: f32 = 1.0;
pub const MIN_VERTICAL_VELOCITY: f32 = -30.0;
pub const MAX_VERTICAL_VELOCITY: f32 = 15.0;

/// Remaining ticks of timed item effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveEffects {
    pub boost: u32,
    pub shield: u32,
}

/// Authoritative state of one character in a room
#[derive(Debug, Clone)]
pub struct Character {
    pub id: String,
    pub display_name: String,
    pub kind: CharacterKind,

    // Movement
    pub position: Vec3,
    pub velocity: Vec3,
    pub base_speed: f32,
    pub speed: f32,

    // Items
    items: VecDeque<ItemKind>,
    pub gift_count: u32,
    pub effects: ActiveEffects,
    /// Pending thunder countdowns, oldest first
    pub thunder_timers: Vec<u32>,

    // Status counters
    pub protect: u32,
    pub event_block: u32,

    // Ability
    pub current_skill_cooldown: u32,
    pub total_skill_cooldown: u32,
    pub skill_active_ticks: u32,
    pub skill_input: bool,

    // Tail tag
    pub has_tail: bool,

    // One-tick motion flags, cleared after each snapshot
    pub steal: bool,
    pub stolen: bool,
    pub is_being_stolen: bool,
}

impl Character {
    pub fn new(id: String, display_name: String, kind: CharacterKind, position: Vec3) -> Self {
        let ability = kind.ability();
        Self {
            id,
            display_name,
            kind,
            position,
            velocity: Vec3::ZERO,
            base_speed: ability.base_speed(),
            speed: ability.base_speed(),
            items: VecDeque::with_capacity(INVENTORY_CAPACITY),
            gift_count: 0,
            effects: ActiveEffects::default(),
            thunder_timers: Vec::new(),
            protect: 0,
            event_block: 0,
            current_skill_cooldown: 0,
            total_skill_cooldown: ability.total_cooldown(),
            skill_active_ticks: 0,
            skill_input: false,
            has_tail: false,
            steal: false,
            stolen: false,
            is_being_stolen: false,
        }
    }

    /// Advance one simulation tick
    pub fn update(&mut self) {
        self.protect = self.protect.saturating_sub(1);
        self.event_block = self.event_block.saturating_sub(1);
        self.effects.boost = self.effects.boost.saturating_sub(1);

        if self.effects.shield > 0 {
            self.effects.shield -= 1;
            if self.effects.shield == 0 {
                self.protect = 0;
            }
        }

        self.tick_thunder_timers();

        self.kind.ability().on_tick(self);
        self.current_skill_cooldown = self.current_skill_cooldown.saturating_sub(1);

        if self.skill_input {
            self.skill_input = false;
            self.use_ability();
        }

        self.recompute_speed();
    }

    fn tick_thunder_timers(&mut self) {
        let mut landed = 0;
        self.thunder_timers.retain_mut(|remaining| {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                landed += 1;
                false
            } else {
                true
            }
        });

        if landed > 0 && !self.is_shielded() {
            self.stun(THUNDER_EVENT_BLOCK);
        }
    }

    /// Speed derived from base speed, carried gifts, boost and ability
    pub fn recompute_speed(&mut self) {
        let penalty = self.gift_count as f32 * GIFT_SPEED_PENALTY;
        let boost = if self.effects.boost > 0 { SPEED_UP_BONUS } else { 0.0 };
        self.speed = (self.base_speed / 2.0).max(self.base_speed - penalty)
            + boost
            + self.ability_speed_bonus();
    }

    pub fn ability_speed_bonus(&self) -> f32 {
        if self.skill_active_ticks > 0 {
            self.kind.ability().speed_bonus()
        } else {
            0.0
        }
    }

    pub fn max_speed(&self) -> f32 {
        self.speed
    }

    /// Fire the variant ability if off cooldown. Returns whether it fired.
    pub fn use_ability(&mut self) -> bool {
        if self.current_skill_cooldown > 0 {
            return false;
        }
        self.kind.ability().activate(self);
        self.current_skill_cooldown = self.total_skill_cooldown;
        self.recompute_speed();
        true
    }

    pub fn is_valid_velocity(&self, v: &Vec3) -> bool {
        v.is_finite()
            && v.horizontal_magnitude() <= self.max_speed() + VELOCITY_TOLERANCE
            && (MIN_VERTICAL_VELOCITY..=MAX_VERTICAL_VELOCITY).contains(&v.y)
    }

    /// Apply client movement input. Invalid or stunned input is dropped.
    pub fn set_velocity(&mut self, v: Vec3) -> bool {
        if self.is_stunned() || !self.is_valid_velocity(&v) {
            return false;
        }
        self.velocity = v;
        true
    }

    pub fn integrate(&mut self, dt: f32) {
        self.position.x += self.velocity.x * dt;
        self.position.y += self.velocity.y * dt;
        self.position.z += self.velocity.z * dt;
    }

    pub fn inventory(&self) -> &VecDeque<ItemKind> {
        &self.items
    }

    pub fn has_inventory_room(&self) -> bool {
        self.items.len() < INVENTORY_CAPACITY
    }

    /// Store a picked-up item. Rejected when the inventory is full.
    pub fn pick_up(&mut self, kind: ItemKind) -> bool {
        if !self.has_inventory_room() {
            return false;
        }
        self.items.push_back(kind);
        true
    }

    /// Consume the oldest item and apply its effect to this character.
    ///
    /// Thunder has no self effect; the room applies it to everyone else.
    pub fn use_item(&mut self) -> Option<ItemKind> {
        let kind = self.items.pop_front()?;
        match kind {
            ItemKind::Boost => self.effects.boost = BOOST_DURATION,
            ItemKind::Shield => {
                self.effects.shield = SHIELD_DURATION;
                self.protect = self.protect.max(SHIELD_DURATION);
            }
            ItemKind::Gift => self.gift_count += 1,
            ItemKind::Thunder => {}
        }
        self.recompute_speed();
        Some(kind)
    }

    pub fn queue_thunder(&mut self) {
        self.thunder_timers.push(THUNDER_CAST_TICKS);
    }

    pub fn stun(&mut self, ticks: u32) {
        self.event_block = ticks;
        self.velocity.x = 0.0;
        self.velocity.z = 0.0;
    }

    pub fn is_stunned(&self) -> bool {
        self.event_block > 0
    }

    pub fn is_shielded(&self) -> bool {
        self.protect > 0 || self.effects.shield > 0
    }

    pub fn reset_motion_flags(&mut self) {
        self.steal = false;
        self.stolen = false;
        self.is_being_stolen = false;
    }
}
