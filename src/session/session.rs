use chrono::TimeDelta;
use log::{debug, info, trace, warn};
use nalgebra::{UnitQuaternion, Vector3};
use thiserror::Error;

use crate::{
    core::time::{Clock, Instant, SystemClock, sec_f64_to_td, td_to_sec_f64},
    datatypes::{AccelSample, EstimateSnapshot, Position3D},
    estimation::{
        EstimatorParams, GravityCompensator, OrientationEstimator, ParamsError, PositionEstimator,
    },
    math::quaternion::to_wxyz,
    trajectory::{TrajectoryBuffer, VisualizationFrame},
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("Sample at {timestamp_ms} ms has a non-finite acceleration component")]
    NonFinite { timestamp_ms: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No sample accepted yet.
    Uninitialized,
    Tracking { last_update_ms: i64 },
}

/// One tracking session: attitude filter, gravity compensation, per-axis
/// position filters and the trajectory history.
///
/// A session has a single owner; concurrent sessions share nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSession<C: Clock = SystemClock> {
    params: EstimatorParams,

    orientation: OrientationEstimator,
    gravity: GravityCompensator,
    position: PositionEstimator,
    trajectory: TrajectoryBuffer,

    state: SessionState,

    clock: C,
    visualization_interval: TimeDelta,
    last_visualization: Instant,
}

impl Default for MotionSession<SystemClock> {
    fn default() -> Self {
        Self::build(EstimatorParams::default(), SystemClock::default())
    }
}

impl MotionSession<SystemClock> {
    pub fn new(params: EstimatorParams) -> Result<Self, ParamsError> {
        Self::with_clock(params, SystemClock::default())
    }
}

impl<C: Clock> MotionSession<C> {
    pub fn with_clock(params: EstimatorParams, clock: C) -> Result<Self, ParamsError> {
        params.validate()?;

        Ok(Self::build(params, clock))
    }

    fn build(params: EstimatorParams, clock: C) -> Self {
        let last_visualization = clock.monotonic();

        Self {
            orientation: OrientationEstimator::new(params.orientation.clone()),
            gravity: GravityCompensator::new(params.gravity_n_m_s2),
            position: PositionEstimator::new(&params.kalman),
            trajectory: TrajectoryBuffer::new(params.trajectory_capacity),
            state: SessionState::Uninitialized,
            visualization_interval: sec_f64_to_td(params.visualization_interval_s),
            last_visualization,
            clock,
            params,
        }
    }

    /// Feeds one accelerometer sample through the pipeline.
    ///
    /// Returns `Ok(None)` for the first sample of the session and for any
    /// sample not strictly newer than the last accepted one; neither changes
    /// the estimate. Non-finite samples are rejected with an error and leave
    /// the session untouched.
    pub fn ingest(
        &mut self,
        sample: &AccelSample,
    ) -> Result<Option<EstimateSnapshot>, SampleError> {
        if !sample.is_finite() {
            warn!(
                "Rejecting non-finite sample at {} ms: ({}, {}, {})",
                sample.timestamp_ms, sample.x, sample.y, sample.z
            );
            return Err(SampleError::NonFinite {
                timestamp_ms: sample.timestamp_ms,
            });
        }

        let last_update_ms = match self.state {
            SessionState::Uninitialized => {
                debug!("First sample at {} ms, tracking started", sample.timestamp_ms);
                self.state = SessionState::Tracking {
                    last_update_ms: sample.timestamp_ms,
                };
                return Ok(None);
            }
            SessionState::Tracking { last_update_ms } => last_update_ms,
        };

        if sample.timestamp_ms <= last_update_ms {
            debug!(
                "Dropping sample at {} ms, last accepted at {} ms",
                sample.timestamp_ms, last_update_ms
            );
            return Ok(None);
        }

        // Ordered by the check above, so the distance fits in a u64
        let dt_s = sample.timestamp_ms.abs_diff(last_update_ms) as f64 / 1000.0;

        let acc_b_m_s2 = sample.accel_m_s2();
        let q_nb = self.orientation.update(&acc_b_m_s2, &Vector3::zeros());
        let lin_acc_n_m_s2 = self.gravity.compensate(&acc_b_m_s2, q_nb.quaternion());

        self.position.step(&lin_acc_n_m_s2);

        let position: Position3D = self.position.position().into();
        self.trajectory.push(position);

        self.state = SessionState::Tracking {
            last_update_ms: sample.timestamp_ms,
        };

        let due_for_visualization = self.check_visualization_due();

        trace!(
            "t={} ms dt={dt_s:.3} s pos=[{:.4}, {:.4}, {:.4}]",
            sample.timestamp_ms, position.x, position.y, position.z
        );

        Ok(Some(EstimateSnapshot {
            timestamp_ms: sample.timestamp_ms,
            dt_s,
            position,
            velocity: self.position.velocity().into(),
            acceleration: self.position.acceleration().into(),
            linear_acceleration: lin_acc_n_m_s2.into(),
            quaternion: to_wxyz(q_nb.quaternion()),
            due_for_visualization,
        }))
    }

    fn check_visualization_due(&mut self) -> bool {
        let now = self.clock.monotonic();

        let since_last = now.duration_since(&self.last_visualization);

        if since_last >= self.visualization_interval {
            info!(
                "Visualization due after {:.2} s, {} positions in trajectory",
                td_to_sec_f64(since_last),
                self.trajectory.len()
            );
            self.last_visualization = now;
            true
        } else {
            false
        }
    }

    /// Plot geometry for the current trajectory, `None` before the first estimate.
    pub fn visualization_frame(&self) -> Option<VisualizationFrame> {
        VisualizationFrame::from_trajectory(&self.trajectory)
    }

    /// Drops all estimates and returns to the uninitialized state.
    pub fn reset(&mut self) {
        self.orientation.reset();
        self.position.reset();
        self.trajectory.clear();
        self.state = SessionState::Uninitialized;
        self.last_visualization = self.clock.monotonic();
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn params(&self) -> &EstimatorParams {
        &self.params
    }

    pub fn quaternion(&self) -> &UnitQuaternion<f64> {
        self.orientation.quaternion()
    }

    pub fn position(&self) -> Position3D {
        self.position.position().into()
    }

    pub fn position_estimator(&self) -> &PositionEstimator {
        &self.position
    }

    pub fn trajectory(&self) -> &TrajectoryBuffer {
        &self.trajectory
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
