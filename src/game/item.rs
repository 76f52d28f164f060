//! Map items: weighted spawning, pickup detection and respawn timing

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::time::secs_to_ticks;

use super::character::Character;
use super::map::{intersects_obstacle, BoundingBox, ITEM_MAX_POS_Y, MAX_GROUND};
use super::Vec3;

/// Items placed when a match starts
pub const INITIAL_ITEM_COUNT: usize = 8;
pub const ITEM_PICKUP_DISTANCE: f32 = 2.0;
/// Delay between a pickup and its replacement appearing
pub const ITEM_RESPAWN_TICKS: u32 = secs_to_ticks(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    /// Temporary speed bonus
    Boost,
    /// Blocks incoming stuns and steals
    Shield,
    /// Delayed stun on every other character
    Thunder,
    /// Carried gift, slows the holder
    Gift,
}

/// Spawn weights, sampled cumulatively in this order
pub const ITEM_WEIGHTS: [(ItemKind, u32); 4] = [
    (ItemKind::Boost, 3),
    (ItemKind::Shield, 3),
    (ItemKind::Thunder, 2),
    (ItemKind::Gift, 2),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: String,
    pub kind: ItemKind,
    pub position: Vec3,
}

/// Pick an item type by cumulative weight
pub fn random_item_kind<R: Rng>(rng: &mut R) -> ItemKind {
    let total: u32 = ITEM_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (kind, weight) in ITEM_WEIGHTS {
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    ItemKind::Gift
}

pub fn is_valid_item_position(obstacles: &[BoundingBox], position: &Vec3) -> bool {
    !intersects_obstacle(obstacles, position)
}

/// Uniform position in the item area, resampled until clear of obstacles
pub fn random_item_position<R: Rng>(rng: &mut R, obstacles: &[BoundingBox]) -> Vec3 {
    let spread = MAX_GROUND - 10.0;
    loop {
        let position = Vec3 {
            x: (rng.gen::<f32>() - 0.5) * spread,
            y: (rng.gen::<f32>() + 0.1) * ITEM_MAX_POS_Y,
            z: (rng.gen::<f32>() - 0.5) * spread,
        };
        if is_valid_item_position(obstacles, &position) {
            return position;
        }
    }
}

pub fn spawn_item<R: Rng>(rng: &mut R, obstacles: &[BoundingBox]) -> Item {
    Item {
        id: format!("item-{}", Uuid::new_v4()),
        kind: random_item_kind(rng),
        position: random_item_position(rng, obstacles),
    }
}

/// A claimed item
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub character_id: String,
    pub item_id: String,
    pub kind: ItemKind,
}

/// Claim at most one item per character, scanning both collections in order.
///
/// Claimed items are removed from `items` immediately, so a later character
/// cannot claim the same item in the same pass.
pub fn check_pickup(characters: &mut [Character], items: &mut Vec<Item>) -> Vec<Pickup> {
    let radius_sq = ITEM_PICKUP_DISTANCE * ITEM_PICKUP_DISTANCE;
    let mut pickups = Vec::new();

    for character in characters.iter_mut() {
        if !character.has_inventory_room() {
            continue;
        }

        let hit = items
            .iter()
            .position(|item| character.position.distance_squared(&item.position) <= radius_sq);

        if let Some(idx) = hit {
            let item = items.remove(idx);
            character.pick_up(item.kind);
            pickups.push(Pickup {
                character_id: character.id.clone(),
                item_id: item.id,
                kind: item.kind,
            });
        }
    }

    pickups
}

/// Tick-counted queue of pending item respawns
#[derive(Debug, Default)]
pub struct RespawnQueue {
    pending: Vec<u32>,
}

impl RespawnQueue {
    pub fn schedule(&mut self) {
        self.pending.push(ITEM_RESPAWN_TICKS);
    }

    /// Advance one tick, returning how many respawns are now due
    pub fn tick(&mut self) -> usize {
        let mut due = 0;
        self.pending.retain_mut(|remaining| {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                due += 1;
                false
            } else {
                true
            }
        });
        due
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
