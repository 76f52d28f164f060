//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

use crate::lobby::LobbySettings;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,

    /// HS256 secret for access tokens. Without it only guests can connect.
    pub jwt_secret: Option<String>,
    /// Allowed client origins for CORS, comma-separated
    pub client_origin: String,

    /// Match length in seconds
    pub room_time_secs: u32,
    /// Characters required before a room can start
    pub min_players: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // hosting platforms hand out PORT, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };

        let defaults = LobbySettings::default();

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json: lookup("LOG_FORMAT")
                .map(|f| f.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.is_empty()),
            client_origin: lookup("CLIENT_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),

            room_time_secs: parse_or("ROOM_TIME_SECS", &lookup, defaults.room_time_secs)?,
            min_players: parse_or("MIN_PLAYERS", &lookup, defaults.min_players)?,
        })
    }

    pub fn lobby_settings(&self) -> LobbySettings {
        LobbySettings {
            room_time_secs: self.room_time_secs,
            min_players: self.min_players,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
