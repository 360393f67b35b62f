use nalgebra::{Matrix3, RowVector3, Vector3};

use super::params::KalmanParams;

/// Process noise of a discretized continuous white noise acceleration jerk,
/// for the `[position, velocity, acceleration]` state.
pub fn discrete_white_noise_3(dt: f64, var: f64) -> Matrix3<f64> {
    let dt2 = dt * dt;
    let dt3 = dt2 * dt;
    let dt4 = dt3 * dt;

    #[rustfmt::skip]
    let q = Matrix3::new(
        0.25 * dt4, 0.5 * dt3, 0.5 * dt2,
        0.5 * dt3,  dt2,       dt,
        0.5 * dt2,  dt,        1.0,
    );

    q * var
}

/// Constant acceleration Kalman filter over a single axis.
///
/// State is `[position, velocity, acceleration]`; only the acceleration is
/// measured.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisKalmanFilter {
    x: Vector3<f64>,
    p: Matrix3<f64>,

    f: Matrix3<f64>,
    q: Matrix3<f64>,
    h: RowVector3<f64>,
    r: f64,
    p0: f64,
}

impl AxisKalmanFilter {
    pub fn new(params: &KalmanParams) -> Self {
        let dt = params.dt;

        #[rustfmt::skip]
        let f = Matrix3::new(
            1.0, dt,  0.5 * dt * dt,
            0.0, 1.0, dt,
            0.0, 0.0, 1.0,
        );

        Self {
            x: Vector3::zeros(),
            p: Matrix3::identity() * params.initial_covariance,
            f,
            q: discrete_white_noise_3(dt, params.process_noise_var),
            h: RowVector3::new(0.0, 0.0, 1.0),
            r: params.measurement_noise,
            p0: params.initial_covariance,
        }
    }

    pub fn predict(&mut self) {
        self.x = self.f * self.x;
        self.p = self.f * self.p * self.f.transpose() + self.q;
    }

    pub fn update(&mut self, measured_acc: f64) {
        let innovation = measured_acc - (self.h * self.x)[(0, 0)];
        let s = (self.h * self.p * self.h.transpose())[(0, 0)] + self.r;

        let k: Vector3<f64> = self.p * self.h.transpose() / s;

        self.x += k * innovation;

        // Joseph form keeps P symmetric positive definite
        let i_kh = Matrix3::identity() - k * self.h;
        self.p = i_kh * self.p * i_kh.transpose() + k * k.transpose() * self.r;
    }

    pub fn state(&self) -> &Vector3<f64> {
        &self.x
    }

    pub fn covariance(&self) -> &Matrix3<f64> {
        &self.p
    }

    pub fn position(&self) -> f64 {
        self.x[0]
    }

    pub fn velocity(&self) -> f64 {
        self.x[1]
    }

    pub fn acceleration(&self) -> f64 {
        self.x[2]
    }

    pub fn reset(&mut self) {
        self.x = Vector3::zeros();
        self.p = Matrix3::identity() * self.p0;
    }
}

/// Three independent axis filters. Cross-axis covariance is not modeled.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionEstimator {
    axes: [AxisKalmanFilter; 3],
}

impl PositionEstimator {
    pub fn new(params: &KalmanParams) -> Self {
        let axis = AxisKalmanFilter::new(params);

        Self {
            axes: [axis.clone(), axis.clone(), axis],
        }
    }

    /// Predicts all axes, then corrects each with its linear acceleration.
    pub fn step(&mut self, lin_acc_n_m_s2: &Vector3<f64>) {
        for axis in self.axes.iter_mut() {
            axis.predict();
        }

        for (axis, acc) in self.axes.iter_mut().zip(lin_acc_n_m_s2.iter()) {
            axis.update(*acc);
        }
    }

    pub fn axis(&self, i: usize) -> Option<&AxisKalmanFilter> {
        self.axes.get(i)
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::from_fn(|i, _| self.axes[i].position())
    }

    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::from_fn(|i, _| self.axes[i].velocity())
    }

    pub fn acceleration(&self) -> Vector3<f64> {
        Vector3::from_fn(|i, _| self.axes[i].acceleration())
    }

    pub fn reset(&mut self) {
        for axis in self.axes.iter_mut() {
            axis.reset();
        }
    }
}
