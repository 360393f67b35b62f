//! Motion state estimation from raw accelerometer streams.
//!
//! Each [`MotionSession`] turns timestamped accelerometer samples into a
//! filtered position / velocity / acceleration estimate and an attitude
//! quaternion, keeps a bounded trajectory history and signals when a
//! visualization refresh is due. Transport, persistence and rendering live
//! outside this crate.

pub mod core;
pub mod datatypes;
pub mod estimation;
pub mod math;
pub mod parameters;
pub mod replay;
pub mod session;
pub mod trajectory;

pub use datatypes::{AccelSample, EstimateSnapshot, Position3D, Vec3};
pub use session::{MotionSession, SampleError, SessionState};
