//! Room simulation modules

pub mod character;
pub mod item;
pub mod map;
pub mod mode;
pub mod room;
pub mod runner;
pub mod snapshot;
pub mod variant;

pub use mode::ModeKind;
pub use room::{GameOverReport, RoomError, RoomSimulation};
pub use runner::{RoomCommand, RoomHandle};
pub use snapshot::RoomSnapshot;

use serde::{Deserialize, Serialize};

/// Position or velocity in world space (y is up)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Vec3) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Distance on the ground plane, ignoring elevation
    pub fn horizontal_distance(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn horizontal_magnitude(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}
