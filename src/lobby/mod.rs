//! Room lobby: registry lookups, joins and reconnection

pub mod registry;
pub mod service;

pub use registry::RoomRegistry;
pub use service::{LobbyService, LobbySettings};
