pub mod gravity;
pub mod kalman;
pub mod orientation;
pub mod params;

pub use gravity::GravityCompensator;
pub use kalman::{AxisKalmanFilter, PositionEstimator};
pub use orientation::OrientationEstimator;
pub use params::{EstimatorParams, KalmanParams, OrientationParams, ParamsError};
