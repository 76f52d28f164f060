//! Game modes: interaction rules layered on the base room simulation

use serde::{Deserialize, Serialize};

use super::character::{Character, ITEM_EVENT_BLOCK};

/// Max horizontal distance for a tail catch
pub const TAIL_STEAL_DISTANCE: f32 = 5.0;
/// Max horizontal distance for a gift steal
pub const GIFT_STEAL_DISTANCE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModeKind {
    /// Collect gifts and steal them from each other
    #[default]
    Gift,
    /// Whoever lacks a tail catches one from a nearby holder
    TailTag,
}

pub trait GameMode: Send {
    fn kind(&self) -> ModeKind;

    /// Called once when a character enters the room
    fn on_join(&mut self, _character: &mut Character, _join_index: usize) {}

    /// Per-tick interaction pass, run after item pickup
    fn resolve_tick(&mut self, _characters: &mut [Character]) {}

    /// Explicit steal request from the character at `thief`. Returns whether
    /// anything changed hands.
    fn on_steal_request(&mut self, _thief: usize, _characters: &mut [Character]) -> bool {
        false
    }
}

pub fn create_mode(kind: ModeKind) -> Box<dyn GameMode> {
    match kind {
        ModeKind::Gift => Box::new(GiftMode),
        ModeKind::TailTag => Box::new(TailTagMode),
    }
}

/// Mutable access to two distinct characters
fn pair_mut(characters: &mut [Character], a: usize, b: usize) -> (&mut Character, &mut Character) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = characters.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = characters.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

pub struct GiftMode;

impl GameMode for GiftMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Gift
    }

    fn on_steal_request(&mut self, thief: usize, characters: &mut [Character]) -> bool {
        if characters[thief].is_stunned() {
            return false;
        }

        let thief_pos = characters[thief].position;
        let victim = characters.iter().enumerate().position(|(idx, other)| {
            idx != thief
                && other.gift_count > 0
                && !other.is_shielded()
                && !other.is_being_stolen
                && thief_pos.horizontal_distance(&other.position) <= GIFT_STEAL_DISTANCE
        });

        let Some(victim) = victim else {
            return false;
        };

        let (thief, victim) = pair_mut(characters, thief, victim);
        victim.gift_count -= 1;
        victim.stolen = true;
        victim.is_being_stolen = true;
        victim.stun(ITEM_EVENT_BLOCK);
        victim.recompute_speed();

        thief.gift_count += 1;
        thief.steal = true;
        thief.recompute_speed();
        true
    }
}

pub struct TailTagMode;

impl GameMode for TailTagMode {
    fn kind(&self) -> ModeKind {
        ModeKind::TailTag
    }

    fn on_join(&mut self, character: &mut Character, join_index: usize) {
        character.has_tail = join_index % 2 == 0;
    }

    fn resolve_tick(&mut self, characters: &mut [Character]) {
        // a tail caught in this pass cannot change hands again until next tick
        let mut caught = vec![false; characters.len()];

        for catcher in 0..characters.len() {
            if characters[catcher].has_tail {
                continue;
            }

            let catcher_pos = characters[catcher].position;
            let target = characters.iter().enumerate().position(|(idx, other)| {
                idx != catcher
                    && other.has_tail
                    && !other.is_being_stolen
                    && !caught[idx]
                    && catcher_pos.horizontal_distance(&other.position) <= TAIL_STEAL_DISTANCE
            });

            if let Some(target) = target {
                caught[catcher] = true;
                let (catcher, holder) = pair_mut(characters, catcher, target);
                holder.is_being_stolen = true;
                holder.has_tail = false;
                holder.stolen = true;
                catcher.has_tail = true;
                catcher.steal = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::variant::CharacterKind;
    use crate::game::Vec3;

    fn at(id: &str, x: f32, z: f32) -> Character {
        Character::new(id.into(), id.into(), CharacterKind::Rabbit, Vec3::new(x, 0.0, z))
    }

    #[test]
    fn tail_moves_to_nearby_catcher() {
        let mut chars = vec![at("a", 0.0, 0.0), at("b", 3.0, 4.0)];
        chars[1].has_tail = true;

        TailTagMode.resolve_tick(&mut chars);

        assert!(chars[0].has_tail);
        assert!(!chars[1].has_tail);
        assert!(chars[1].is_being_stolen);
        assert!(chars[0].steal);
    }

    #[test]
    fn tail_out_of_range_stays() {
        let mut chars = vec![at("a", 0.0, 0.0), at("b", 5.1, 0.0)];
        chars[1].has_tail = true;
        TailTagMode.resolve_tick(&mut chars);
        assert!(!chars[0].has_tail);
        assert!(chars[1].has_tail);
    }

    #[test]
    fn first_catcher_in_order_wins() {
        let mut chars = vec![at("a", 0.0, 0.0), at("b", 1.0, 0.0), at("holder", 2.0, 0.0)];
        chars[2].has_tail = true;

        TailTagMode.resolve_tick(&mut chars);

        assert!(chars[0].has_tail);
        assert!(!chars[1].has_tail);
        assert!(!chars[2].has_tail);
    }

    #[test]
    fn tails_are_dealt_alternately() {
        let mut mode = TailTagMode;
        let mut chars: Vec<Character> = (0..4).map(|i| at(&i.to_string(), 0.0, 0.0)).collect();
        for (idx, c) in chars.iter_mut().enumerate() {
            mode.on_join(c, idx);
        }
        let tails: Vec<bool> = chars.iter().map(|c| c.has_tail).collect();
        assert_eq!(tails, vec![true, false, true, false]);
    }

    #[test]
    fn gift_steal_moves_one_gift() {
        let mut chars = vec![at("thief", 0.0, 0.0), at("victim", 1.0, 1.0)];
        chars[1].gift_count = 2;

        assert!(GiftMode.on_steal_request(0, &mut chars));

        assert_eq!(chars[0].gift_count, 1);
        assert!(chars[0].steal);
        assert_eq!(chars[1].gift_count, 1);
        assert!(chars[1].stolen);
        assert_eq!(chars[1].event_block, ITEM_EVENT_BLOCK);

        // victim is locked for the rest of the tick
        assert!(!GiftMode.on_steal_request(0, &mut chars));
    }

    #[test]
    fn shielded_victim_keeps_gifts() {
        let mut chars = vec![at("thief", 0.0, 0.0), at("victim", 1.0, 0.0)];
        chars[1].gift_count = 1;
        chars[1].protect = 5;

        assert!(!GiftMode.on_steal_request(0, &mut chars));
        assert_eq!(chars[1].gift_count, 1);
    }

    #[test]
    fn tail_tag_ignores_steal_requests() {
        let mut chars = vec![at("a", 0.0, 0.0), at("b", 0.0, 0.0)];
        chars[1].gift_count = 1;
        assert!(!TailTagMode.on_steal_request(0, &mut chars));
    }
}
