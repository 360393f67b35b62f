use nalgebra::{Quaternion, Vector3};

use crate::math::quaternion::{conjugate, rotate};

/// Removes gravity from a raw accelerometer reading.
///
/// Gravity is subtracted in the body frame first and the residual is then
/// rotated by the conjugate attitude. The order matters for tilted attitudes
/// and is kept as is.
#[derive(Debug, Clone, PartialEq)]
pub struct GravityCompensator {
    gravity_n_m_s2: Vector3<f64>,
}

impl GravityCompensator {
    pub fn new(gravity_n_m_s2: Vector3<f64>) -> Self {
        Self { gravity_n_m_s2 }
    }

    pub fn gravity(&self) -> &Vector3<f64> {
        &self.gravity_n_m_s2
    }

    pub fn compensate(&self, raw_acc_m_s2: &Vector3<f64>, q_nb: &Quaternion<f64>) -> Vector3<f64> {
        rotate(&(raw_acc_m_s2 - self.gravity_n_m_s2), &conjugate(q_nb))
    }
}
