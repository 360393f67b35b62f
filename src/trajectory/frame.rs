//! Plot geometry handed to the visualization consumer.
//!
//! Nothing here renders; the frame carries the path, the current position
//! marker, the heading arrow and equal-aspect cube bounds.

use nalgebra::Vector3;
use serde::Serialize;

use super::buffer::TrajectoryBuffer;
use crate::datatypes::{Position3D, Vec3};

/// Cube centered on the path mean, with the same half-range on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubeExtent {
    pub center: Vec3,
    pub half_range: f64,
}

impl CubeExtent {
    pub fn min(&self) -> Vec3 {
        let c = Vector3::from(self.center);
        c.add_scalar(-self.half_range).into()
    }

    pub fn max(&self) -> Vec3 {
        let c = Vector3::from(self.center);
        c.add_scalar(self.half_range).into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationFrame {
    pub path: Vec<Position3D>,
    pub current: Position3D,
    /// Displacement between the last two positions.
    pub heading: Option<Vec3>,
    pub extent: CubeExtent,
}

impl VisualizationFrame {
    /// `None` while the trajectory is empty.
    pub fn from_trajectory(trajectory: &TrajectoryBuffer) -> Option<Self> {
        let path = trajectory.snapshot();
        let current = *path.last()?;

        let heading = match path.as_slice() {
            [.., prev, last] => Some((Vector3::from(*last) - Vector3::from(*prev)).into()),
            _ => None,
        };

        let points: Vec<Vector3<f64>> = path.iter().map(|p| Vector3::from(*p)).collect();

        let lo = points.iter().fold(Vector3::repeat(f64::INFINITY), |acc, p| acc.inf(p));
        let hi = points
            .iter()
            .fold(Vector3::repeat(f64::NEG_INFINITY), |acc, p| acc.sup(p));
        let mean = points.iter().sum::<Vector3<f64>>() / points.len() as f64;

        let extent = CubeExtent {
            center: mean.into(),
            half_range: (hi - lo).max() / 2.0,
        };

        Some(VisualizationFrame {
            path,
            current,
            heading,
            extent,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    use super::*;

    fn trajectory(points: &[(f64, f64, f64)]) -> TrajectoryBuffer {
        let mut buf = TrajectoryBuffer::new(NonZero::new(500).unwrap());
        for &(x, y, z) in points {
            buf.push(Position3D::new(x, y, z));
        }
        buf
    }

    #[test]
    fn test_empty_trajectory() {
        assert_eq!(VisualizationFrame::from_trajectory(&trajectory(&[])), None);
    }

    #[test]
    fn test_single_point() {
        let frame = VisualizationFrame::from_trajectory(&trajectory(&[(1.0, 2.0, 3.0)])).unwrap();

        assert_eq!(frame.current, Position3D::new(1.0, 2.0, 3.0));
        assert_eq!(frame.heading, None);
        assert_eq!(frame.extent.center, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(frame.extent.half_range, 0.0);
    }

    #[test]
    fn test_extent_and_heading() {
        let frame = VisualizationFrame::from_trajectory(&trajectory(&[
            (0.0, 0.0, 0.0),
            (4.0, 1.0, 0.0),
            (2.0, 2.0, 1.0),
        ]))
        .unwrap();

        assert_eq!(frame.path.len(), 3);
        assert_eq!(frame.current, Position3D::new(2.0, 2.0, 1.0));
        assert_eq!(frame.heading, Some(Vec3::new(-2.0, 1.0, 1.0)));

        // Largest span is x (4.0)
        assert_relative_eq!(frame.extent.half_range, 2.0);
        assert_relative_eq!(frame.extent.center.x, 2.0);
        assert_relative_eq!(frame.extent.center.y, 1.0);
        assert_relative_eq!(frame.extent.center.z, 1.0 / 3.0);

        assert_relative_eq!(frame.extent.min().x, 0.0);
        assert_relative_eq!(frame.extent.max().y, 3.0);
    }
}
