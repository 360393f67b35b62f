pub mod estimate;
pub mod sensors;

pub use estimate::{EstimateSnapshot, Position3D, Vec3};
pub use sensors::AccelSample;
