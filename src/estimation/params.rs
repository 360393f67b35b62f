use std::num::NonZero;

use nalgebra::Vector3;
use thiserror::Error;

use crate::parameters::{self, Section};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParamsError {
    #[error(transparent)]
    Parameter(#[from] parameters::Error),

    #[error("Invalid value for '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Constant-acceleration filter tuning, shared by the three axes.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanParams {
    /// Prediction step in seconds. Fixed, independent of the sample spacing.
    pub dt: f64,
    /// Variance of the acceleration measurement.
    pub measurement_noise: f64,
    /// Variance of the discrete white-noise process model.
    pub process_noise_var: f64,
    /// Diagonal of the initial state covariance.
    pub initial_covariance: f64,
}

impl Default for KalmanParams {
    fn default() -> Self {
        KalmanParams {
            dt: 0.1,
            measurement_noise: 0.1,
            process_noise_var: 0.1,
            initial_covariance: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrientationParams {
    /// Gradient descent step gain (beta).
    pub gain: f64,
    /// Integration period of the attitude filter, in seconds.
    pub sample_period: f64,
    /// Accelerometer norms below this hold the previous attitude.
    pub min_accel_norm: f64,
    /// When false, a zero gyro reading leaves the attitude untouched instead of
    /// running the accelerometer correction.
    pub accel_correction: bool,
}

impl Default for OrientationParams {
    fn default() -> Self {
        OrientationParams {
            gain: 0.033,
            sample_period: 0.01,
            min_accel_norm: 1e-9,
            accel_correction: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorParams {
    pub kalman: KalmanParams,
    pub orientation: OrientationParams,
    /// Earth frame gravity, m/s^2.
    pub gravity_n_m_s2: Vector3<f64>,
    pub trajectory_capacity: NonZero<usize>,
    /// Minimum wall-clock time between two visualization refreshes, in seconds.
    pub visualization_interval_s: f64,
}

pub const DEFAULT_TRAJECTORY_CAPACITY: NonZero<usize> = NonZero::new(500).unwrap();

impl Default for EstimatorParams {
    fn default() -> Self {
        EstimatorParams {
            kalman: KalmanParams::default(),
            orientation: OrientationParams::default(),
            gravity_n_m_s2: Vector3::new(0.0, 0.0, 9.81),
            trajectory_capacity: DEFAULT_TRAJECTORY_CAPACITY,
            visualization_interval_s: 5.0,
        }
    }
}

impl EstimatorParams {
    /// Reads the estimator configuration from its section of the parameter
    /// file (usually `estimator`).
    pub fn from_params(params: &Section<'_>) -> Result<Self, ParamsError> {
        let kalman = params.section("kalman")?;
        let kalman = KalmanParams {
            dt: kalman.get("dt")?,
            measurement_noise: kalman.get("measurement_noise")?,
            process_noise_var: kalman.get("process_noise_var")?,
            initial_covariance: kalman.get("initial_covariance")?,
        };

        let orientation = params.section("orientation")?;
        let orientation = OrientationParams {
            gain: orientation.get("gain")?,
            sample_period: orientation.get("sample_period")?,
            min_accel_norm: orientation.get("min_accel_norm")?,
            accel_correction: orientation.get("accel_correction")?,
        };

        let gravity: Vec<f64> = params.get("gravity_n_m_s2")?;
        if gravity.len() != 3 {
            return Err(ParamsError::Invalid {
                name: "gravity_n_m_s2",
                reason: format!("expected 3 components, found {}", gravity.len()),
            });
        }

        let capacity: i64 = params.get("trajectory.capacity")?;
        let trajectory_capacity = usize::try_from(capacity)
            .ok()
            .and_then(NonZero::new)
            .ok_or_else(|| ParamsError::Invalid {
                name: "trajectory.capacity",
                reason: format!("must be a positive integer, found {capacity}"),
            })?;

        let out = EstimatorParams {
            kalman,
            orientation,
            gravity_n_m_s2: Vector3::from_column_slice(&gravity),
            trajectory_capacity,
            visualization_interval_s: params.get("visualization.interval_s")?,
        };

        out.validate()?;
        Ok(out)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        fn positive(name: &'static str, v: f64) -> Result<(), ParamsError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ParamsError::Invalid {
                    name,
                    reason: format!("must be finite and positive, found {v}"),
                })
            }
        }

        positive("kalman.dt", self.kalman.dt)?;
        positive("kalman.measurement_noise", self.kalman.measurement_noise)?;
        positive("kalman.process_noise_var", self.kalman.process_noise_var)?;
        positive("kalman.initial_covariance", self.kalman.initial_covariance)?;
        positive("orientation.gain", self.orientation.gain)?;
        positive("orientation.sample_period", self.orientation.sample_period)?;
        positive("orientation.min_accel_norm", self.orientation.min_accel_norm)?;

        if !self.gravity_n_m_s2.iter().all(|g| g.is_finite()) {
            return Err(ParamsError::Invalid {
                name: "gravity_n_m_s2",
                reason: "components must be finite".to_string(),
            });
        }

        let interval = self.visualization_interval_s;
        if !(interval.is_finite() && interval >= 0.0) {
            return Err(ParamsError::Invalid {
                name: "visualization.interval_s",
                reason: format!("must be finite and non-negative, found {interval}"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parameters::ParameterSet;

    const PARAMS: &str = include_str!("../../config/params.toml");

    fn from_toml(toml_str: &str) -> Result<EstimatorParams, ParamsError> {
        let params = ParameterSet::parse(toml_str).unwrap();
        EstimatorParams::from_params(&params.section("estimator").unwrap())
    }

    #[test]
    fn test_shipped_params_match_defaults() {
        let parsed = from_toml(PARAMS).unwrap();

        assert_eq!(parsed, EstimatorParams::default());
    }

    #[test]
    fn test_default_is_valid() {
        assert_eq!(EstimatorParams::default().validate(), Ok(()));
        assert_eq!(
            EstimatorParams::default().trajectory_capacity,
            DEFAULT_TRAJECTORY_CAPACITY
        );
        assert_eq!(DEFAULT_TRAJECTORY_CAPACITY.get(), 500);
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(
            from_toml(&PARAMS.replace("gain =", "beta =")),
            Err(ParamsError::Parameter(parameters::Error::NotFound {
                path: "estimator.orientation.gain".to_string()
            }))
        );
    }

    #[test]
    fn test_bad_gravity() {
        assert!(matches!(
            from_toml(&PARAMS.replace("[0.0, 0.0, 9.81]", "[0.0, 9.81]")),
            Err(ParamsError::Invalid {
                name: "gravity_n_m_s2",
                ..
            })
        ));
    }

    #[test]
    fn test_bad_capacity() {
        assert!(matches!(
            from_toml(&PARAMS.replace("val = 500", "val = 0")),
            Err(ParamsError::Invalid {
                name: "trajectory.capacity",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let mut params = EstimatorParams::default();
        params.kalman.dt = 0.0;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::Invalid {
                name: "kalman.dt",
                ..
            })
        ));

        let mut params = EstimatorParams::default();
        params.visualization_interval_s = f64::NAN;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::Invalid {
                name: "visualization.interval_s",
                ..
            })
        ));
    }
}
