use std::num::NonZero;

use ringbuffer::{AllocRingBuffer, RingBuffer};

use crate::datatypes::Position3D;

/// Bounded history of estimated positions, oldest first.
///
/// Once full, every push evicts the oldest position.
#[derive(Debug, Clone)]
pub struct TrajectoryBuffer {
    buf: AllocRingBuffer<Position3D>,
}

impl TrajectoryBuffer {
    pub fn new(capacity: NonZero<usize>) -> Self {
        Self {
            buf: AllocRingBuffer::new(capacity.get()),
        }
    }

    pub fn push(&mut self, position: Position3D) {
        self.buf.push(position);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Most recent position.
    pub fn latest(&self) -> Option<&Position3D> {
        self.buf.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position3D> {
        self.buf.iter()
    }

    /// Chronological copy of the history.
    pub fn snapshot(&self) -> Vec<Position3D> {
        self.buf.to_vec()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl PartialEq for TrajectoryBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.capacity() == other.capacity() && self.iter().eq(other.iter())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pos(i: usize) -> Position3D {
        Position3D::new(i as f64, -(i as f64), 0.5 * i as f64)
    }

    fn buffer(capacity: usize) -> TrajectoryBuffer {
        TrajectoryBuffer::new(NonZero::new(capacity).unwrap())
    }

    #[test]
    fn test_push_below_capacity() {
        let mut buf = buffer(500);
        assert!(buf.is_empty());
        assert_eq!(buf.latest(), None);

        for i in 0..10 {
            buf.push(pos(i));
        }

        assert_eq!(buf.len(), 10);
        assert_eq!(buf.snapshot(), (0..10).map(pos).collect::<Vec<_>>());
        assert_eq!(buf.latest(), Some(&pos(9)));
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut buf = buffer(500);

        for i in 0..1234 {
            buf.push(pos(i));
            assert!(buf.len() <= 500);
        }

        assert_eq!(buf.len(), 500);
        assert_eq!(buf.snapshot(), (734..1234).map(pos).collect::<Vec<_>>());
        assert_eq!(buf.latest(), Some(&pos(1233)));
    }

    #[test]
    fn test_non_power_of_two_capacity() {
        let mut buf = buffer(3);

        for i in 0..5 {
            buf.push(pos(i));
        }

        assert_eq!(buf.capacity(), 3);
        assert_eq!(buf.snapshot(), vec![pos(2), pos(3), pos(4)]);
    }

    #[test]
    fn test_clear_and_equality() {
        let mut a = buffer(4);
        let mut b = buffer(4);

        for i in 0..6 {
            a.push(pos(i));
        }
        for i in 2..6 {
            b.push(pos(i));
        }
        assert_eq!(a, b);

        a.clear();
        assert!(a.is_empty());
        assert_ne!(a, b);
    }
}
