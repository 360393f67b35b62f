use log::debug;
use nalgebra::{Matrix3x4, Quaternion, UnitQuaternion, Vector3};

use super::params::OrientationParams;

/// Gradient descent attitude filter (Madgwick, IMU variant).
///
/// The gyroscope term is kept in the update even though the deployed sensor
/// stream has none: with a zero angular rate the filter only levels the
/// attitude against the measured gravity direction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationEstimator {
    params: OrientationParams,
    q_nb: UnitQuaternion<f64>,
}

impl OrientationEstimator {
    pub fn new(params: OrientationParams) -> Self {
        Self {
            params,
            q_nb: UnitQuaternion::identity(),
        }
    }

    /// Body to earth attitude.
    pub fn quaternion(&self) -> &UnitQuaternion<f64> {
        &self.q_nb
    }

    /// Runs one filter step and returns the new attitude.
    ///
    /// A degenerate accelerometer reading holds the previous attitude.
    pub fn update(
        &mut self,
        accel_m_s2: &Vector3<f64>,
        angvel_rad_s: &Vector3<f64>,
    ) -> UnitQuaternion<f64> {
        if !self.params.accel_correction && angvel_rad_s.norm() == 0.0 {
            return self.q_nb;
        }

        let acc_norm = accel_m_s2.norm();
        if !acc_norm.is_finite() || acc_norm < self.params.min_accel_norm {
            debug!("Degenerate accelerometer norm {acc_norm:e}, holding attitude");
            return self.q_nb;
        }

        let q: Quaternion<f64> = *self.q_nb.quaternion();

        // Rate of change from the gyroscope
        let mut q_dot: Quaternion<f64> = q * Quaternion::from_parts(0.0, *angvel_rad_s) * 0.5;

        let a = accel_m_s2 / acc_norm;
        let (qw, qx, qy, qz) = (q.w, q.i, q.j, q.k);

        // Earth z axis seen from the body, minus the measured gravity direction
        let f = Vector3::new(
            2.0 * (qx * qz - qw * qy) - a.x,
            2.0 * (qw * qx + qy * qz) - a.y,
            2.0 * (0.5 - qx * qx - qy * qy) - a.z,
        );

        if f.norm() > 0.0 {
            #[rustfmt::skip]
            let jacobian = Matrix3x4::new(
                -2.0 * qy,  2.0 * qz, -2.0 * qw, 2.0 * qx,
                 2.0 * qx,  2.0 * qw,  2.0 * qz, 2.0 * qy,
                 0.0,      -4.0 * qx, -4.0 * qy, 0.0,
            );

            // Gradient components are ordered (w, x, y, z)
            let gradient = jacobian.transpose() * f;
            if let Some(step) = gradient.try_normalize(0.0) {
                q_dot -= Quaternion::new(step[0], step[1], step[2], step[3]) * self.params.gain;
            }
        }

        let integrated = q + q_dot * self.params.sample_period;

        match UnitQuaternion::try_new(integrated, f64::EPSILON) {
            Some(q_nb) => self.q_nb = q_nb,
            None => debug!("Attitude collapsed to zero norm, holding attitude"),
        }

        self.q_nb
    }

    pub fn reset(&mut self) {
        self.q_nb = UnitQuaternion::identity();
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::quaternion::{conjugate, rotate};

    fn estimator() -> OrientationEstimator {
        OrientationEstimator::new(OrientationParams::default())
    }

    #[test]
    fn test_level_gravity_keeps_identity() {
        let mut est = estimator();

        for _ in 0..100 {
            est.update(&Vector3::new(0.0, 0.0, 9.81), &Vector3::zeros());
        }

        assert_relative_eq!(
            *est.quaternion(),
            UnitQuaternion::identity(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_unit_norm_after_update() {
        let mut est = estimator();
        let samples = [
            Vector3::new(3.0, -1.0, 9.0),
            Vector3::new(-7.5, 2.0, 1.0),
            Vector3::new(0.1, 9.7, -0.5),
            Vector3::new(0.0, 0.0, -9.81),
        ];

        for acc in samples.iter().cycle().take(400) {
            let q = est.update(acc, &Vector3::zeros());
            assert_relative_eq!(q.quaternion().norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_converges_to_tilted_gravity() {
        let mut est = estimator();
        let tilt: f64 = 0.4;
        let acc = Vector3::new(0.0, 9.81 * tilt.sin(), 9.81 * tilt.cos());

        for _ in 0..20000 {
            est.update(&acc, &Vector3::zeros());
        }

        // Earth z axis expressed in the body frame
        let z_b = rotate(&Vector3::z(), &conjugate(est.quaternion().quaternion()));
        assert_relative_eq!(z_b, acc.normalize(), epsilon = 5e-3);
    }

    #[test]
    fn test_zero_accel_holds_attitude() {
        let mut est = estimator();
        est.update(&Vector3::new(2.0, 1.0, 9.0), &Vector3::zeros());
        let before = *est.quaternion();

        let q = est.update(&Vector3::zeros(), &Vector3::zeros());

        assert_eq!(q, before);
        assert_eq!(*est.quaternion(), before);
    }

    #[test]
    fn test_gyro_term_integrates() {
        let mut est = estimator();
        let rate = Vector3::new(0.0, 0.0, 1.0);

        est.update(&Vector3::new(0.0, 0.0, 9.81), &rate);

        // Pure yaw leaves the gravity residual at zero, only the gyro acts
        let expected = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.01);
        assert_relative_eq!(*est.quaternion(), expected, epsilon = 1e-4);
    }

    #[test]
    fn test_accel_correction_disabled_holds_on_zero_gyro() {
        let mut est = OrientationEstimator::new(OrientationParams {
            accel_correction: false,
            ..Default::default()
        });

        est.update(&Vector3::new(5.0, 0.0, 5.0), &Vector3::zeros());
        assert_eq!(*est.quaternion(), UnitQuaternion::identity());
    }

    #[test]
    fn test_reset() {
        let mut est = estimator();
        est.update(&Vector3::new(5.0, 0.0, 5.0), &Vector3::zeros());
        assert_ne!(*est.quaternion(), UnitQuaternion::identity());

        est.reset();
        assert_eq!(*est.quaternion(), UnitQuaternion::identity());
    }
}
