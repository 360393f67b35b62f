use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Raw accelerometer reading as delivered by the client device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(alias = "timestamp")]
    pub timestamp_ms: i64,
}

impl AccelSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp_ms: i64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_ms,
        }
    }

    pub fn accel_m_s2(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn timestamp_s(&self) -> f64 {
        self.timestamp_ms as f64 / 1000.0
    }
}
