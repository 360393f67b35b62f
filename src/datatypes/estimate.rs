use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub type Position3D = Vec3;

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }
}

impl From<Vector3<f64>> for Vec3 {
    fn from(v: Vector3<f64>) -> Self {
        Vec3 {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

impl From<Vec3> for Vector3<f64> {
    fn from(v: Vec3) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

/// Output of one accepted sample. Plain value, safe to hand to any consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateSnapshot {
    pub timestamp_ms: i64,
    /// Measured interval since the previous accepted sample, in seconds.
    pub dt_s: f64,
    pub position: Position3D,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Gravity compensated earth frame acceleration fed to the filters.
    pub linear_acceleration: Vec3,
    /// Body to earth attitude, `[w, x, y, z]`.
    pub quaternion: [f64; 4],
    pub due_for_visualization: bool,
}
