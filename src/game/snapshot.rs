//! Snapshot building for network transmission

use serde::{Deserialize, Serialize};

use super::character::{ActiveEffects, Character};
use super::item::{Item, ItemKind};
use super::Vec3;

/// Room state sent to every client after each simulation tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub remain_running_time: u32,
    pub characters: Vec<CharacterSnapshot>,
    pub map_items: Vec<ItemSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSnapshot {
    pub id: String,
    pub nick_name: String,
    pub char_type: u8,
    pub position: Vec3,
    pub velocity: Vec3,
    pub speed: f32,
    pub gift_cnt: u32,
    pub items: Vec<ItemKind>,
    pub has_tail: bool,
    pub steal: bool,
    pub stolen: bool,
    pub is_being_stolen: bool,
    pub protect: u32,
    pub event_block: u32,
    pub current_skill_cooldown: u32,
    pub total_skill_cooldown: u32,
    pub effects: EffectsSnapshot,
}

/// Remaining ticks of active item effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectsSnapshot {
    pub boost: u32,
    pub shield: u32,
}

impl From<ActiveEffects> for EffectsSnapshot {
    fn from(effects: ActiveEffects) -> Self {
        Self {
            boost: effects.boost,
            shield: effects.shield,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub position: Vec3,
}

impl From<&Character> for CharacterSnapshot {
    fn from(c: &Character) -> Self {
        Self {
            id: c.id.clone(),
            nick_name: c.display_name.clone(),
            char_type: c.kind.tag(),
            position: c.position,
            velocity: c.velocity,
            speed: c.speed,
            gift_cnt: c.gift_count,
            items: c.inventory().iter().copied().collect(),
            has_tail: c.has_tail,
            steal: c.steal,
            stolen: c.stolen,
            is_being_stolen: c.is_being_stolen,
            protect: c.protect,
            event_block: c.event_block,
            current_skill_cooldown: c.current_skill_cooldown,
            total_skill_cooldown: c.total_skill_cooldown,
            effects: c.effects.into(),
        }
    }
}

impl From<&Item> for ItemSnapshot {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind,
            position: item.position,
        }
    }
}

/// Build the outward-facing view of a room. Order follows the room's
/// collections.
pub fn build_snapshot(remaining_time: u32, characters: &[Character], items: &[Item]) -> RoomSnapshot {
    RoomSnapshot {
        remain_running_time: remaining_time,
        characters: characters.iter().map(CharacterSnapshot::from).collect(),
        map_items: items.iter().map(ItemSnapshot::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::variant::CharacterKind;

    #[test]
    fn snapshot_serializes_client_field_names() {
        let mut c = Character::new("u1".into(), "Nick".into(), CharacterKind::Ghost, Vec3::ZERO);
        c.pick_up(ItemKind::Thunder);
        let items = vec![Item {
            id: "item-1".into(),
            kind: ItemKind::Boost,
            position: Vec3::new(1.0, 2.0, 3.0),
        }];

        let snapshot = build_snapshot(42, &[c], &items);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["remainRunningTime"], 42);
        assert_eq!(json["characters"][0]["nickName"], "Nick");
        assert_eq!(json["characters"][0]["charType"], 3);
        assert_eq!(json["characters"][0]["items"][0], "thunder");
        assert_eq!(json["characters"][0]["effects"]["boost"], 0);
        assert_eq!(json["mapItems"][0]["type"], "boost");
        assert_eq!(json["mapItems"][0]["position"]["z"], 3.0);
        assert!(json.get("availablePositions").is_none());
    }
}
