//! Contour points: the edge pixels found by block scanning.

use std::ops::Index;

use crate::blocks::BlockId;
use crate::geom::Point;

/// A detected edge pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourPoint {
    pub point: Point,
    /// Position in the global point list, stable for the run.
    pub index: usize,
    /// Block whose tile contains the point.
    pub block: BlockId,
    used: bool,
}

impl ContourPoint {
    pub(crate) fn new(point: Point, block: BlockId) -> Self {
        Self {
            point,
            index: usize::MAX,
            block,
            used: false,
        }
    }

    /// True once the tracer has folded this point into a segment.
    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn distance(&self, other: &ContourPoint) -> f64 {
        self.point.distance(other.point)
    }
}

/// Sole owner of every contour point of a run. Blocks refer to points by index.
#[derive(Debug, Clone, Default)]
pub struct ContourPoints {
    points: Vec<ContourPoint>,
}

impl ContourPoints {
    /// Append a point and return the position it landed at.
    pub(crate) fn push(&mut self, point: ContourPoint) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Assign every point its global index. Called once extraction is complete.
    pub(crate) fn assign_indices(&mut self) {
        for (i, point) in self.points.iter_mut().enumerate() {
            point.index = i;
        }
    }

    /// Mark a point as consumed. The flag only ever goes false → true.
    pub(crate) fn mark_used(&mut self, idx: usize) {
        self.points[idx].used = true;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&ContourPoint> {
        self.points.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContourPoint> {
        self.points.iter()
    }

    /// Number of points consumed by tracing so far.
    pub fn used_count(&self) -> usize {
        self.points.iter().filter(|p| p.used).count()
    }
}

impl Index<usize> for ContourPoints {
    type Output = ContourPoint;

    fn index(&self, idx: usize) -> &ContourPoint {
        &self.points[idx]
    }
}

impl<'a> IntoIterator for &'a ContourPoints {
    type Item = &'a ContourPoint;
    type IntoIter = std::slice::Iter<'a, ContourPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Distance from a search origin to a candidate point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointDistance {
    pub distance: f64,
    pub index: usize,
}
