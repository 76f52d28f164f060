//! Time utilities for room simulation

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 5; // one simulation tick every 200ms
pub const UPDATE_INTERVAL: Duration = Duration::from_millis(1_000 / SIMULATION_TPS as u64);
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Calculate delta time for movement integration (in seconds)
pub fn tick_delta() -> f32 {
    1.0 / SIMULATION_TPS as f32
}

/// Convert a duration in whole seconds to simulation ticks
pub const fn secs_to_ticks(secs: u32) -> u32 {
    secs * SIMULATION_TPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_follow_update_interval() {
        assert_eq!(UPDATE_INTERVAL, Duration::from_millis(200));
        assert_eq!(secs_to_ticks(15), 75);
        assert!((tick_delta() - 0.2).abs() < f32::EPSILON);
    }
}
