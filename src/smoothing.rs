// Moving average over the last few fingertip positions.

use std::collections::VecDeque;

use crate::types::Point;

/// Fixed-capacity FIFO of pixel positions. All entries are weighted equally.
#[derive(Clone, Debug)]
pub struct SmoothingBuffer {
    history: VecDeque<Point>,
    /// Max. number of positions to keep.
    capacity: usize,
}

impl SmoothingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Adds a position, evicting the oldest one beyond capacity, and returns the new mean.
    pub fn push(&mut self, p: Point) -> Point {
        self.history.push_back(p);
        if self.history.len() > self.capacity {
            self.history.pop_front();
        }
        self.mean().unwrap_or(p)
    }

    /// Arithmetic mean of the stored positions, truncated toward zero.
    pub fn mean(&self) -> Option<Point> {
        if self.history.is_empty() {
            return None;
        }
        let n = self.history.len() as i64;
        let (sx, sy) = self
            .history
            .iter()
            .fold((0i64, 0i64), |(sx, sy), p| (sx + p.x as i64, sy + p.y as i64));
        Some(Point::new((sx / n) as i32, (sy / n) as i32))
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.history.contains(&p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_avg() {
        let mut buf = SmoothingBuffer::new(2);
        assert_eq!(buf.push(Point::new(10, 10)), Point::new(10, 10));
        assert_eq!(buf.push(Point::new(20, 30)), Point::new(15, 20));
        assert_eq!(buf.push(Point::new(20, 30)), Point::new(20, 30));
    }

    #[test]
    fn sixth_push_evicts_the_first() {
        let mut buf = SmoothingBuffer::new(5);
        let pts: Vec<Point> = (0..6).map(|i| Point::new(i * 10, 100 + i)).collect();
        for &p in &pts {
            buf.push(p);
            assert!(buf.len() <= 5);
        }
        assert_eq!(buf.len(), 5);
        assert!(!buf.contains(pts[0]));
        // (10+20+30+40+50)/5, (101+..+105)/5
        assert_eq!(buf.mean(), Some(Point::new(30, 103)));
    }

    #[test]
    fn mean_truncates() {
        let mut buf = SmoothingBuffer::new(5);
        buf.push(Point::new(0, 0));
        assert_eq!(buf.push(Point::new(3, 1)), Point::new(1, 0));
    }

    #[test]
    fn clear_empties() {
        let mut buf = SmoothingBuffer::new(5);
        buf.push(Point::new(1, 1));
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.mean(), None);
    }
}
