//! Greedy nearest-neighbor chaining of contour points into line segments.
//!
//! Starting from one point, the tracer sorts the unused points around it by
//! distance and folds them into a segment until one of two cutoffs fires:
//! an absolute distance, or (once the segment is long enough to have a
//! direction) an angular deviation from that direction. The segment's end
//! point is the start of the next one. When a neighborhood runs dry the
//! tracer jumps to the next block that still has points.

use kurbo::Vec2;
use tracing::debug;

use crate::blocks::{BlockId, BlockIndex};
use crate::config::TracingConfig;
use crate::contour::ContourPoints;
use crate::error::TraceError;
use crate::geom::{unit, LineSegment, Point};

/// Turns a contour point set into an ordered list of directed segments.
///
/// Marks points used as it consumes them and blocks extracted as it
/// restarts in them.
pub struct Tracer<'a> {
    points: &'a mut ContourPoints,
    blocks: &'a mut BlockIndex,
    config: &'a TracingConfig,
}

impl<'a> Tracer<'a> {
    pub fn new(
        points: &'a mut ContourPoints,
        blocks: &'a mut BlockIndex,
        config: &'a TracingConfig,
    ) -> Self {
        Self {
            points,
            blocks,
            config,
        }
    }

    /// Trace all clusters. Fails with [`TraceError::NoContours`] when no block
    /// holds a single point.
    pub fn extract_vectors(&mut self) -> Result<Vec<LineSegment>, TraceError> {
        let block = self
            .blocks
            .block_for_extraction(None)
            .ok_or(TraceError::NoContours)?;
        let mut idx_start = self.first_point(block);
        let mut segments = Vec::new();
        let mut clusters = 1usize;

        for _ in 0..self.points.len() {
            match self.next_segment(idx_start) {
                Some(segment) => {
                    // Traced segments always carry their end index.
                    idx_start = segment.end_index().unwrap_or(idx_start);
                    segments.push(segment);
                }
                None => {
                    // Local neighborhood exhausted: the rest of the picture
                    // lives in some other block.
                    let Some(block) = self.blocks.block_for_extraction(None) else {
                        if self.config.verbose {
                            debug!("no unprocessed cluster left");
                        }
                        break;
                    };
                    if self.config.verbose {
                        debug!(block = block.0, "looking for new cluster");
                    }
                    self.blocks.set_extracted(block);
                    idx_start = self.first_point(block);
                    clusters += 1;
                }
            }
        }

        if self.config.verbose {
            debug!(
                segments = segments.len(),
                clusters,
                used = self.points.used_count(),
                "extracted vectors"
            );
        }
        Ok(segments)
    }

    /// Build the next segment starting at point `idx_start`.
    ///
    /// Returns `None` when fewer than two unused points remain around the
    /// start, which means the local cluster is exhausted.
    pub fn next_segment(&mut self, idx_start: usize) -> Option<LineSegment> {
        let mut idx_start = idx_start;

        'restart: loop {
            let mut candidates = self.blocks.local_point_distances(idx_start, &*self.points);
            if candidates.len() < 2 {
                if self.config.verbose {
                    debug!(idx_start, "too few points left in cluster");
                }
                return None;
            }
            candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

            let origin = self.points[idx_start].point;
            let mut reference = None;
            let mut idx_previous: Option<usize> = None;

            for candidate in &candidates {
                let Some(previous) = idx_previous else {
                    if candidate.distance > self.config.cluster_cutoff_distance {
                        // Nothing close by: jump to the nearest point and
                        // start over from there.
                        self.points.mark_used(candidate.index);
                        if self.config.verbose {
                            debug!(from = idx_start, to = candidate.index, "new cluster detected");
                        }
                        idx_start = candidate.index;
                        continue 'restart;
                    }
                    self.accept(candidate.index, candidate.distance, origin, &mut reference);
                    idx_previous = Some(candidate.index);
                    continue;
                };

                if let Some(direction) = reference {
                    let current = unit(origin.to(self.points[candidate.index].point));
                    let deviation = current.dot(direction);
                    if deviation < self.config.line_cutoff_angle {
                        if self.config.verbose {
                            debug!(idx_start, previous, deviation, "segment cut by angle");
                        }
                        return Some(self.new_segment(idx_start, previous));
                    }
                }
                if candidate.distance > self.config.line_cutoff_distance {
                    if self.config.verbose {
                        debug!(idx_start, previous, distance = candidate.distance, "segment cut by distance");
                    }
                    return Some(self.new_segment(idx_start, previous));
                }

                self.accept(candidate.index, candidate.distance, origin, &mut reference);
                idx_previous = Some(candidate.index);
            }

            return match idx_previous {
                Some(previous) => {
                    if self.config.verbose {
                        debug!(idx_start, previous, candidates = candidates.len(), "segment ran out of candidates");
                    }
                    Some(self.new_segment(idx_start, previous))
                }
                None => None,
            };
        }
    }

    /// Fold a candidate into the current segment, capturing the long-line
    /// reference direction the first time a candidate lies far enough away.
    fn accept(
        &mut self,
        idx: usize,
        distance: f64,
        origin: Point,
        reference: &mut Option<Vec2>,
    ) {
        if reference.is_none() && distance > self.config.long_line_distance {
            *reference = Some(unit(origin.to(self.points[idx].point)));
            if self.config.verbose {
                debug!(idx, distance, "entering long-line mode");
            }
        }
        self.points.mark_used(idx);
    }

    fn new_segment(&self, idx_a: usize, idx_b: usize) -> LineSegment {
        LineSegment::traced(self.points[idx_a].point, self.points[idx_b].point, idx_a, idx_b)
    }

    fn first_point(&self, block: BlockId) -> usize {
        // Only blocks holding points are ever offered for extraction.
        self.blocks.block(block).points()[0]
    }
}
