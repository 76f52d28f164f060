//! Registry of live rooms and of which room each user is in

use dashmap::DashMap;

use crate::game::RoomHandle;

/// Routing lookups only; room lifetime is owned by the room task
pub struct RoomRegistry {
    rooms: DashMap<String, RoomHandle>,
    user_rooms: DashMap<String, String>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            user_rooms: DashMap::new(),
        }
    }

    pub fn get(&self, room_id: &str) -> Option<RoomHandle> {
        self.rooms.get(room_id).map(|r| r.value().clone())
    }

    /// Look up a room, creating it with `create` if absent
    pub fn get_or_insert_with(&self, room_id: &str, create: impl FnOnce() -> RoomHandle) -> RoomHandle {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(create)
            .value()
            .clone()
    }

    /// Drop a room and every user mapping that points at it
    pub fn remove_room(&self, room_id: &str) -> Option<RoomHandle> {
        self.user_rooms.retain(|_, room| room != room_id);
        self.rooms.remove(room_id).map(|(_, h)| h)
    }

    pub fn room_of_user(&self, user_id: &str) -> Option<String> {
        self.user_rooms.get(user_id).map(|r| r.value().clone())
    }

    pub fn assign_user(&self, user_id: &str, room_id: &str) {
        self.user_rooms.insert(user_id.to_string(), room_id.to_string());
    }

    pub fn release_user(&self, user_id: &str) -> Option<String> {
        self.user_rooms.remove(user_id).map(|(_, room)| room)
    }

    pub fn users_in_room(&self, room_id: &str) -> usize {
        self.user_rooms.iter().filter(|r| r.value() == room_id).count()
    }

    pub fn active_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn total_players(&self) -> usize {
        self.rooms.iter().map(|r| r.value().player_count()).sum()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::runner::RoomTask;
    use crate::game::{ModeKind, RoomSimulation};

    fn handle(room_id: &str) -> RoomHandle {
        let (_task, handle) = RoomTask::new(RoomSimulation::with_seed(room_id, 10, ModeKind::Gift, 1));
        handle
    }

    #[test]
    fn existing_room_is_reused() {
        let registry = RoomRegistry::new();
        registry.get_or_insert_with("r1", || handle("r1"));
        let again = registry.get_or_insert_with("r1", || panic!("must not create twice"));
        assert_eq!(again.room_id, "r1");
        assert_eq!(registry.active_rooms(), 1);
    }

    #[test]
    fn removing_a_room_releases_its_users() {
        let registry = RoomRegistry::new();
        registry.get_or_insert_with("r1", || handle("r1"));
        registry.get_or_insert_with("r2", || handle("r2"));
        registry.assign_user("u1", "r1");
        registry.assign_user("u2", "r1");
        registry.assign_user("u3", "r2");

        assert!(registry.remove_room("r1").is_some());

        assert_eq!(registry.room_of_user("u1"), None);
        assert_eq!(registry.room_of_user("u2"), None);
        assert_eq!(registry.room_of_user("u3").as_deref(), Some("r2"));
        assert!(registry.get("r1").is_none());
    }

    #[test]
    fn release_user_returns_previous_room() {
        let registry = RoomRegistry::new();
        registry.assign_user("u1", "r1");
        assert_eq!(registry.release_user("u1").as_deref(), Some("r1"));
        assert_eq!(registry.release_user("u1"), None);
    }
}
