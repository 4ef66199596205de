//! Shared geometry types: integer pixel points and line segments.

use kurbo::Vec2;

/// Integer pixel coordinate, y=0 at the top of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Vector from `self` to `other`.
    pub fn to(self, other: Point) -> Vec2 {
        Vec2::new((other.x - self.x) as f64, (other.y - self.y) as f64)
    }

    /// Euclidean distance in pixels.
    pub fn distance(self, other: Point) -> f64 {
        self.to(other).hypot()
    }
}

/// Normalize `v`. A zero vector stays zero so its dot products are 0.
pub fn unit(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len == 0.0 {
        Vec2::ZERO
    } else {
        v / len
    }
}

/// A directed segment between two points.
///
/// Segments produced by the tracer remember which contour points they join;
/// segments synthesized by the optimizer do not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
    /// Indices of the start and end contour points.
    pub source: Option<(usize, usize)>,
}

impl LineSegment {
    /// A segment with no contour-point provenance.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            source: None,
        }
    }

    pub fn traced(start: Point, end: Point, idx_start: usize, idx_end: usize) -> Self {
        Self {
            start,
            end,
            source: Some((idx_start, idx_end)),
        }
    }

    pub fn end_index(&self) -> Option<usize> {
        self.source.map(|(_, end)| end)
    }

    pub fn as_vector(&self) -> Vec2 {
        self.start.to(self.end)
    }

    /// Unit direction, zero for a degenerate segment.
    pub fn direction(&self) -> Vec2 {
        unit(self.as_vector())
    }

    pub fn len(&self) -> f64 {
        self.as_vector().hypot()
    }

    /// True when `next` starts exactly where `self` ends.
    pub fn chains_to(&self, next: &LineSegment) -> bool {
        self.end == next.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Point::new(0, 0).distance(Point::new(3, 4)), 5.0);
    }

    #[test]
    fn degenerate_segment_has_zero_direction() {
        let p = Point::new(7, 7);
        let seg = LineSegment::new(p, p);
        assert_eq!(seg.direction(), Vec2::ZERO);
        assert_eq!(seg.len(), 0.0);
    }

    #[test]
    fn chaining_compares_exact_endpoints() {
        let a = LineSegment::new(Point::new(0, 0), Point::new(4, 0));
        let b = LineSegment::new(Point::new(4, 0), Point::new(8, 1));
        let c = LineSegment::new(Point::new(5, 0), Point::new(8, 1));
        assert!(a.chains_to(&b));
        assert!(!a.chains_to(&c));
    }
}
