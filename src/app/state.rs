//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::lobby::{LobbyService, RoomRegistry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<RoomRegistry>,
    pub lobby: Arc<LobbyService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(RoomRegistry::new());
        let lobby = Arc::new(LobbyService::new(registry.clone(), config.lobby_settings()));

        Self {
            config,
            registry,
            lobby,
        }
    }
}
