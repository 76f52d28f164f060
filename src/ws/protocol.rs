//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};

use crate::game::{GameOverReport, ModeKind, RoomSnapshot, Vec3};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Join a room, creating it if it does not exist yet
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        /// Character variant tag
        char_type: u8,
        /// Interaction rules, only used when the room is created
        #[serde(default)]
        mode: ModeKind,
    },

    /// Start the current room
    StartGame,

    /// Desired velocity for the caller's character
    Move { velocity: Vec3 },

    /// Consume the front inventory slot
    UseItem,

    /// Trigger the character ability
    UseSkill,

    /// Attempt a steal against nearby characters
    Steal,

    /// Leave the current room
    LeaveRoom,

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Sent once after connection. `room_id` is set when rejoining a match
    /// still in progress.
    #[serde(rename_all = "camelCase")]
    Welcome {
        user_id: String,
        nick_name: String,
        is_guest: bool,
        room_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    RoomJoined { room_id: String },

    /// Per-tick room state
    GameState(RoomSnapshot),

    GameOver(GameOverReport),

    Error {
        code: String,
        message: String,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

impl ServerMsg {
    pub fn error(code: &str, message: impl ToString) -> Self {
        ServerMsg::Error {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}
