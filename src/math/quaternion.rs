//! Closed-form quaternion helpers.
//!
//! Quaternions follow the `(w, x, y, z)` convention, stored as
//! `nalgebra::Quaternion` (`w`, `i`, `j`, `k`).

use nalgebra::{Quaternion, Vector3};

/// Negates the vector part, leaving `w` unchanged.
pub fn conjugate(q: &Quaternion<f64>) -> Quaternion<f64> {
    Quaternion::new(q.w, -q.i, -q.j, -q.k)
}

/// Rotates `v` by `q` using the expanded sandwich product `q * v * q'`.
///
/// `q` is expected to be unit norm.
pub fn rotate(v: &Vector3<f64>, q: &Quaternion<f64>) -> Vector3<f64> {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);

    Vector3::new(
        v[0] * (1.0 - 2.0 * y * y - 2.0 * z * z)
            + v[1] * (2.0 * x * y - 2.0 * w * z)
            + v[2] * (2.0 * x * z + 2.0 * w * y),
        v[0] * (2.0 * x * y + 2.0 * w * z)
            + v[1] * (1.0 - 2.0 * x * x - 2.0 * z * z)
            + v[2] * (2.0 * y * z - 2.0 * w * x),
        v[0] * (2.0 * x * z - 2.0 * w * y)
            + v[1] * (2.0 * y * z + 2.0 * w * x)
            + v[2] * (1.0 - 2.0 * x * x - 2.0 * y * y),
    )
}

/// Converts to the `[w, x, y, z]` layout used by snapshots.
pub fn to_wxyz(q: &Quaternion<f64>) -> [f64; 4] {
    [q.w, q.i, q.j, q.k]
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    use super::*;

    #[test]
    fn test_conjugate() {
        let q = Quaternion::new(0.5, 0.1, -0.2, 0.3);
        let c = conjugate(&q);

        assert_eq!(to_wxyz(&c), [0.5, -0.1, 0.2, -0.3]);
        assert_eq!(conjugate(&c), q);
    }

    #[test]
    fn test_rotate_identity() {
        let v = Vector3::new(1.0, -2.0, 9.81);

        assert_relative_eq!(rotate(&v, &Quaternion::identity()), v);
    }

    #[test]
    fn test_rotate_quarter_turn_about_z() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);

        assert_relative_eq!(
            rotate(&Vector3::x(), q.quaternion()),
            Vector3::y(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            rotate(&Vector3::y(), q.quaternion()),
            -Vector3::x(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rotate_matches_nalgebra() {
        let q = UnitQuaternion::from_euler_angles(0.3, -1.1, 2.4);
        let v = Vector3::new(0.7, -3.2, 5.5);

        assert_relative_eq!(
            rotate(&v, q.quaternion()),
            q.transform_vector(&v),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            rotate(&v, &conjugate(q.quaternion())),
            q.inverse_transform_vector(&v),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_conjugate_undoes_rotation() {
        let q = UnitQuaternion::from_euler_angles(-0.4, 0.9, 0.05);
        let v = Vector3::new(1.0, 2.0, 3.0);

        let back = rotate(&rotate(&v, q.quaternion()), &conjugate(q.quaternion()));
        assert_relative_eq!(back, v, epsilon = 1e-12);
    }
}
