//! Lobby service - room creation, joins, starts and reconnection

use std::sync::Arc;

use tracing::{info, warn};

use crate::game::runner::{RoomCommand, RoomTask};
use crate::game::{ModeKind, RoomError, RoomHandle, RoomSimulation};
use crate::http::middleware::Identity;

use super::registry::RoomRegistry;

#[derive(Debug, Clone, Copy)]
pub struct LobbySettings {
    /// Match length in seconds
    pub room_time_secs: u32,
    /// Characters required before a room can start
    pub min_players: usize,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            room_time_secs: 180,
            min_players: 2,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    #[error("Already in room {0}")]
    AlreadyInRoom(String),

    #[error("Not in a room")]
    NotInRoom,

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Room has already started")]
    RoomStarted,

    #[error("Not enough players: need {needed}, have {have}")]
    NotEnoughPlayers { needed: usize, have: usize },

    #[error(transparent)]
    Room(#[from] RoomError),
}

impl LobbyError {
    /// Stable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            LobbyError::AlreadyInRoom(_) => "already_in_room",
            LobbyError::NotInRoom => "not_in_room",
            LobbyError::RoomNotFound(_) => "room_not_found",
            LobbyError::RoomStarted => "room_started",
            LobbyError::NotEnoughPlayers { .. } => "not_enough_players",
            LobbyError::Room(RoomError::UnknownVariant(_)) => "unknown_character_type",
            LobbyError::Room(RoomError::NoSpawnPosition) => "no_spawn_position",
            LobbyError::Room(RoomError::DuplicateCharacter(_)) => "duplicate_character",
            LobbyError::Room(RoomError::AlreadyStarted) => "room_started",
            LobbyError::Room(RoomError::Terminated) => "room_closed",
        }
    }
}

pub struct LobbyService {
    registry: Arc<RoomRegistry>,
    settings: LobbySettings,
}

impl LobbyService {
    pub fn new(registry: Arc<RoomRegistry>, settings: LobbySettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Join (creating if needed) a room that has not started yet.
    /// Joining the room the user is already in returns its handle.
    pub async fn join_room(
        &self,
        identity: &Identity,
        room_id: &str,
        char_type: u8,
        mode: ModeKind,
    ) -> Result<RoomHandle, LobbyError> {
        if let Some(current) = self.registry.room_of_user(&identity.user_id) {
            if current != room_id {
                return Err(LobbyError::AlreadyInRoom(current));
            }
            if let Some(handle) = self.registry.get(&current) {
                return Ok(handle);
            }
            self.registry.release_user(&identity.user_id);
        }

        let handle = self.get_or_create(room_id, mode);
        if handle.is_started() {
            return Err(LobbyError::RoomStarted);
        }

        handle
            .join(&identity.user_id, &identity.display_name, char_type)
            .await?;
        self.registry.assign_user(&identity.user_id, room_id);

        info!(
            room_id = %room_id,
            user_id = %identity.user_id,
            is_guest = identity.is_guest,
            "User joined room"
        );
        Ok(handle)
    }

    fn get_or_create(&self, room_id: &str, mode: ModeKind) -> RoomHandle {
        self.registry.get_or_insert_with(room_id, || {
            let sim = RoomSimulation::new(room_id, self.settings.room_time_secs, mode);
            let (task, handle) = RoomTask::new(sim);

            let registry = self.registry.clone();
            let room_id = room_id.to_string();
            tokio::spawn(async move {
                let report = task.run().await;
                registry.remove_room(&room_id);
                info!(
                    room_id = %room_id,
                    ended_naturally = report.is_some(),
                    "Room removed from registry"
                );
            });

            info!(room_id = %handle.room_id, mode = ?mode, "Created room");
            handle
        })
    }

    /// Start the caller's room
    pub async fn start_room(&self, user_id: &str) -> Result<(), LobbyError> {
        let handle = self.current_room(user_id)?;
        let have = handle.player_count();
        if have < self.settings.min_players {
            return Err(LobbyError::NotEnoughPlayers {
                needed: self.settings.min_players,
                have,
            });
        }
        handle.start().await?;
        info!(room_id = %handle.room_id, user_id = %user_id, "Room started");
        Ok(())
    }

    /// Remove the user from their room. An empty room that never started is
    /// shut down.
    pub async fn leave_room(&self, user_id: &str) -> Result<(), LobbyError> {
        let handle = self.current_room(user_id)?;
        self.registry.release_user(user_id);
        handle
            .send(RoomCommand::Leave {
                user_id: user_id.to_string(),
            })
            .await;

        if !handle.is_started() && self.registry.users_in_room(&handle.room_id) == 0 {
            handle.stop();
        }

        info!(room_id = %handle.room_id, user_id = %user_id, "User left room");
        Ok(())
    }

    /// Connection dropped. Running matches keep the character for reconnect.
    pub async fn disconnect(&self, user_id: &str) {
        let Some(room_id) = self.registry.room_of_user(user_id) else {
            return;
        };
        match self.registry.get(&room_id) {
            Some(handle) if handle.is_started() => {
                info!(room_id = %room_id, user_id = %user_id, "Keeping character for reconnect");
            }
            Some(_) => {
                if let Err(e) = self.leave_room(user_id).await {
                    warn!(user_id = %user_id, error = %e, "Leave on disconnect failed");
                }
            }
            None => {
                self.registry.release_user(user_id);
            }
        }
    }

    /// Room of an in-progress match the user can return to
    pub fn reconnect(&self, user_id: &str) -> Option<RoomHandle> {
        let room_id = self.registry.room_of_user(user_id)?;
        self.registry.get(&room_id)
    }

    fn current_room(&self, user_id: &str) -> Result<RoomHandle, LobbyError> {
        let room_id = self
            .registry
            .room_of_user(user_id)
            .ok_or(LobbyError::NotInRoom)?;
        self.registry
            .get(&room_id)
            .ok_or(LobbyError::RoomNotFound(room_id))
    }
}
