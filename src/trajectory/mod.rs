pub mod buffer;
pub mod frame;

pub use buffer::TrajectoryBuffer;
pub use frame::{CubeExtent, VisualizationFrame};
