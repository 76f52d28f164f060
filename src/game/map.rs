//! Static map geometry: play bounds, obstacles and the spawn pool

use super::Vec3;

/// Side length of the square ground plane
pub const MAX_GROUND: f32 = 80.0;
/// Highest elevation a character can reach
pub const MAX_HEIGHT: f32 = 40.0;
/// Items float at most this high above the ground
pub const ITEM_MAX_POS_Y: f32 = 3.0;

/// Axis-aligned bounding box of a static obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inclusive containment check on all three axes
    pub fn contains(&self, p: &Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// Scaled bounding boxes of the map's static objects
pub const OBSTACLES: [BoundingBox; 6] = [
    // house
    BoundingBox::new(Vec3::new(-24.0, 0.0, -24.0), Vec3::new(-12.0, 9.0, -14.0)),
    // christmas tree
    BoundingBox::new(Vec3::new(-3.0, 0.0, -3.0), Vec3::new(3.0, 14.0, 3.0)),
    // rock pile
    BoundingBox::new(Vec3::new(14.0, 0.0, 10.0), Vec3::new(22.0, 4.0, 18.0)),
    // sleigh
    BoundingBox::new(Vec3::new(8.0, 0.0, -22.0), Vec3::new(16.0, 3.0, -17.0)),
    // snowman
    BoundingBox::new(Vec3::new(-20.0, 0.0, 16.0), Vec3::new(-16.0, 6.0, 20.0)),
    // fence
    BoundingBox::new(Vec3::new(-6.0, 0.0, 26.0), Vec3::new(6.0, 2.0, 27.0)),
];

/// Spawn positions handed out without replacement as characters join
pub const PREDEFINED_POSITIONS: [Vec3; 8] = [
    Vec3::new(-30.0, 0.0, -30.0),
    Vec3::new(30.0, 0.0, -30.0),
    Vec3::new(-30.0, 0.0, 30.0),
    Vec3::new(30.0, 0.0, 30.0),
    Vec3::new(0.0, 0.0, -32.0),
    Vec3::new(0.0, 0.0, 32.0),
    Vec3::new(-32.0, 0.0, 0.0),
    Vec3::new(32.0, 0.0, 0.0),
];

/// True if the point lies inside any static obstacle
pub fn intersects_obstacle(obstacles: &[BoundingBox], p: &Vec3) -> bool {
    obstacles.iter().any(|b| b.contains(p))
}

/// Clamp a position into the playable volume
pub fn clamp_to_bounds(p: Vec3) -> Vec3 {
    let half = MAX_GROUND / 2.0;
    Vec3 {
        x: p.x.clamp(-half, half),
        y: p.y.clamp(0.0, MAX_HEIGHT),
        z: p.z.clamp(-half, half),
    }
}
