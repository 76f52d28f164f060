//! Character variants and their abilities

use crate::util::time::secs_to_ticks;

use super::character::{Character, ITEM_EVENT_BLOCK};
use super::room::RoomError;

pub const RABBIT_BASE_SPEED: f32 = 16.0;
pub const SANTA_BASE_SPEED: f32 = 14.0;
pub const GHOST_BASE_SPEED: f32 = 15.0;

pub const RABBIT_SKILL_SPEED: f32 = 4.0;
pub const SANTA_SKILL_SPEED: f32 = 6.0;

/// Selectable character variants, tagged on the wire as 1/2/3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterKind {
    Rabbit,
    Santa,
    Ghost,
}

impl CharacterKind {
    pub fn tag(self) -> u8 {
        match self {
            Self::Rabbit => 1,
            Self::Santa => 2,
            Self::Ghost => 3,
        }
    }

    pub fn ability(self) -> &'static dyn Ability {
        match self {
            Self::Rabbit => &Hop,
            Self::Santa => &Sprint,
            Self::Ghost => &Vanish,
        }
    }
}

impl TryFrom<u8> for CharacterKind {
    type Error = RoomError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::Rabbit),
            2 => Ok(Self::Santa),
            3 => Ok(Self::Ghost),
            other => Err(RoomError::UnknownVariant(other)),
        }
    }
}

/// Per-variant behaviour layered on the shared character bookkeeping.
///
/// All durations and cooldowns are counted in simulation ticks.
pub trait Ability: Send + Sync {
    fn base_speed(&self) -> f32;

    fn total_cooldown(&self) -> u32;

    /// How long the ability stays active once fired
    fn duration(&self) -> u32;

    /// Extra speed while the ability is active
    fn speed_bonus(&self) -> f32 {
        0.0
    }

    /// Apply the ability's effect. Cooldown gating is done by the caller.
    fn activate(&self, character: &mut Character) {
        character.skill_active_ticks = self.duration();
    }

    /// Advance the ability's own duration by one tick
    fn on_tick(&self, character: &mut Character) {
        character.skill_active_ticks = character.skill_active_ticks.saturating_sub(1);
    }
}

/// Rabbit: short burst of speed
pub struct Hop;

impl Ability for Hop {
    fn base_speed(&self) -> f32 {
        RABBIT_BASE_SPEED
    }

    fn total_cooldown(&self) -> u32 {
        secs_to_ticks(8)
    }

    fn duration(&self) -> u32 {
        secs_to_ticks(2)
    }

    fn speed_bonus(&self) -> f32 {
        RABBIT_SKILL_SPEED
    }
}

/// Santa: long sprint, broken by any stun longer than a gift steal
pub struct Sprint;

impl Ability for Sprint {
    fn base_speed(&self) -> f32 {
        SANTA_BASE_SPEED
    }

    fn total_cooldown(&self) -> u32 {
        secs_to_ticks(15)
    }

    fn duration(&self) -> u32 {
        secs_to_ticks(5)
    }

    fn speed_bonus(&self) -> f32 {
        SANTA_SKILL_SPEED
    }

    fn on_tick(&self, character: &mut Character) {
        if character.skill_active_ticks == 0 {
            return;
        }
        if character.event_block > ITEM_EVENT_BLOCK {
            character.skill_active_ticks = 0;
            return;
        }
        character.skill_active_ticks -= 1;
    }
}

/// Ghost: temporary invulnerability, no speed change
pub struct Vanish;

impl Ability for Vanish {
    fn base_speed(&self) -> f32 {
        GHOST_BASE_SPEED
    }

    fn total_cooldown(&self) -> u32 {
        secs_to_ticks(12)
    }

    fn duration(&self) -> u32 {
        secs_to_ticks(3)
    }

    fn activate(&self, character: &mut Character) {
        character.skill_active_ticks = self.duration();
        character.protect = character.protect.max(self.duration());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_and_unknown_is_rejected() {
        for kind in [CharacterKind::Rabbit, CharacterKind::Santa, CharacterKind::Ghost] {
            assert_eq!(CharacterKind::try_from(kind.tag()).ok(), Some(kind));
        }
        assert!(matches!(
            CharacterKind::try_from(9),
            Err(RoomError::UnknownVariant(9))
        ));
    }

    #[test]
    fn hop_boosts_for_two_seconds_then_cools_down() {
        let mut rabbit = Character::new("r".into(), "rabbit".into(), CharacterKind::Rabbit, Default::default());
        assert_eq!(rabbit.total_skill_cooldown, secs_to_ticks(8));
        assert!(rabbit.use_ability());
        assert_eq!(rabbit.speed, RABBIT_BASE_SPEED + RABBIT_SKILL_SPEED);

        for _ in 0..secs_to_ticks(2) - 1 {
            rabbit.update();
        }
        assert_eq!(rabbit.speed, RABBIT_BASE_SPEED + RABBIT_SKILL_SPEED);
        rabbit.update();
        assert_eq!(rabbit.skill_active_ticks, 0);
        assert_eq!(rabbit.speed, RABBIT_BASE_SPEED);

        for _ in secs_to_ticks(2)..secs_to_ticks(8) - 1 {
            rabbit.update();
        }
        assert!(!rabbit.use_ability());
        rabbit.update();
        assert!(rabbit.use_ability());
    }

    #[test]
    fn sprint_is_cancelled_by_long_stun() {
        let mut santa = Character::new("s".into(), "santa".into(), CharacterKind::Santa, Default::default());
        assert!(santa.use_ability());
        santa.event_block = ITEM_EVENT_BLOCK + 1;
        Sprint.on_tick(&mut santa);
        assert_eq!(santa.skill_active_ticks, 0);
    }

    #[test]
    fn vanish_grants_protection() {
        let mut ghost = Character::new("g".into(), "ghost".into(), CharacterKind::Ghost, Default::default());
        assert!(ghost.use_ability());
        assert_eq!(ghost.protect, Vanish.duration());
        assert!(ghost.is_shielded());
        assert_eq!(ghost.speed, GHOST_BASE_SPEED);
    }
}
