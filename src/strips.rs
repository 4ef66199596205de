//! Strips: the polylines stored in a strip file.

use tracing::debug;

use crate::config::TracingConfig;
use crate::error::TraceError;
use crate::geom::{LineSegment, Point};

/// Most points one strip can hold; the length field is a single byte.
pub const MAX_STRIP_POINTS: usize = 255;

/// Strips are split once they pass this size, leaving room for the closing point.
const SPLIT_AT: usize = MAX_STRIP_POINTS - 2;

/// Points closer than this to the previously appended point are skipped.
const MIN_POINT_SPACING: f64 = 2.0;

/// An ordered polyline of 1..=255 points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strip {
    points: Vec<Point>,
}

impl Strip {
    pub fn new(points: Vec<Point>) -> Result<Self, TraceError> {
        if points.is_empty() {
            return Err(TraceError::EmptyStrip);
        }
        if points.len() > MAX_STRIP_POINTS {
            return Err(TraceError::EncodingOverflow {
                what: "points in strip",
                count: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points mapped from 8-bit pixel space to [-1, 1), as the player draws them.
    pub fn normalized(&self) -> Vec<(f32, f32)> {
        self.points
            .iter()
            .map(|p| ((p.x as f32 - 128.0) / 128.0, (p.y as f32 - 128.0) / 128.0))
            .collect()
    }
}

/// Group a segment sequence into strips.
///
/// Consecutive chained segments share a strip; a break in the chain closes
/// the strip with the last segment's end point. Strips are split before they
/// outgrow the one-byte length field. A lone segment yields no strip.
pub fn build_strips(segments: &[LineSegment], config: &TracingConfig) -> Result<Vec<Strip>, TraceError> {
    let mut strips = Vec::new();
    if segments.len() < 2 {
        if segments.len() == 1 && config.verbose {
            debug!("only one segment, no strip built");
        }
        return Ok(strips);
    }

    let mut current: Vec<Point> = Vec::new();
    for (i, pair) in segments.windows(2).enumerate() {
        let (segment, next) = (&pair[0], &pair[1]);

        match current.last() {
            Some(&last) if current.len() > 1 && last.distance(segment.start) < MIN_POINT_SPACING => {
                if config.verbose {
                    debug!(index = i, dist = last.distance(segment.start), "skipping short step");
                }
            }
            _ => current.push(segment.start),
        }

        if segment.chains_to(next) {
            if current.len() > SPLIT_AT {
                if config.verbose {
                    debug!(index = i, "strip reached size limit, splitting");
                }
                current.push(segment.end);
                strips.push(Strip::new(std::mem::take(&mut current))?);
            }
        } else {
            current.push(segment.end);
            strips.push(Strip::new(std::mem::take(&mut current))?);
        }
    }

    let previous = &segments[segments.len() - 2];
    let last = &segments[segments.len() - 1];
    if !previous.chains_to(last) && !current.is_empty() {
        current.push(previous.end);
        strips.push(Strip::new(std::mem::take(&mut current))?);
    }
    current.push(last.start);
    current.push(last.end);
    strips.push(Strip::new(current)?);

    if config.verbose {
        debug!(segments = segments.len(), strips = strips.len(), "assembled strips");
    }
    Ok(strips)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: (i32, i32), b: (i32, i32)) -> LineSegment {
        LineSegment::new(Point::new(a.0, a.1), Point::new(b.0, b.1))
    }

    fn pts(strip: &Strip) -> Vec<(i32, i32)> {
        strip.points().iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn chained_segments_form_one_strip() {
        let segments = vec![seg((0, 0), (5, 0)), seg((5, 0), (10, 3)), seg((10, 3), (12, 9))];
        let strips = build_strips(&segments, &TracingConfig::default()).unwrap();
        assert_eq!(strips.len(), 1);
        assert_eq!(pts(&strips[0]), vec![(0, 0), (5, 0), (10, 3), (12, 9)]);
    }

    #[test]
    fn discontinuity_starts_a_new_strip() {
        let segments = vec![
            seg((0, 0), (5, 0)),
            seg((5, 0), (10, 0)),
            seg((40, 40), (45, 40)),
            seg((45, 40), (50, 42)),
        ];
        let strips = build_strips(&segments, &TracingConfig::default()).unwrap();
        assert_eq!(strips.len(), 2);
        assert_eq!(pts(&strips[0]), vec![(0, 0), (5, 0), (10, 0)]);
        assert_eq!(pts(&strips[1]), vec![(40, 40), (45, 40), (50, 42)]);
    }

    #[test]
    fn final_segment_after_a_break_gets_its_own_strip() {
        let segments = vec![seg((0, 0), (5, 0)), seg((5, 0), (10, 0)), seg((40, 40), (45, 40))];
        let strips = build_strips(&segments, &TracingConfig::default()).unwrap();
        assert_eq!(strips.len(), 2);
        assert_eq!(pts(&strips[1]), vec![(40, 40), (45, 40)]);
    }

    #[test]
    fn close_points_are_skipped() {
        let segments = vec![
            seg((0, 0), (5, 0)),
            seg((5, 0), (6, 0)),
            seg((6, 0), (12, 0)),
            seg((12, 0), (18, 0)),
        ];
        let strips = build_strips(&segments, &TracingConfig::default()).unwrap();
        assert_eq!(pts(&strips[0]), vec![(0, 0), (5, 0), (12, 0), (18, 0)]);
    }

    #[test]
    fn long_chains_are_split_within_the_length_limit() {
        let segments: Vec<LineSegment> = (0..600)
            .map(|i| seg((i * 3, i % 2), ((i + 1) * 3, (i + 1) % 2)))
            .collect();
        let strips = build_strips(&segments, &TracingConfig::default()).unwrap();
        assert!(strips.len() >= 3);
        for strip in &strips {
            assert!((1..=MAX_STRIP_POINTS).contains(&strip.len()));
        }
        // Split strips continue where the previous one stopped.
        for pair in strips.windows(2) {
            assert_eq!(pair[0].points().last(), pair[1].points().first());
        }
        let total: usize = strips.iter().map(Strip::len).sum();
        assert_eq!(total, 601 + strips.len() - 1);
    }

    #[test]
    fn a_single_segment_yields_no_strip() {
        let strips = build_strips(&[seg((0, 0), (9, 9))], &TracingConfig::default()).unwrap();
        assert!(strips.is_empty());
        assert!(build_strips(&[], &TracingConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn strip_length_is_bounded() {
        assert!(matches!(Strip::new(vec![]), Err(TraceError::EmptyStrip)));
        let too_long = vec![Point::new(1, 1); 256];
        assert!(matches!(
            Strip::new(too_long),
            Err(TraceError::EncodingOverflow { count: 256, .. })
        ));
        assert_eq!(Strip::new(vec![Point::new(1, 1); 255]).unwrap().len(), 255);
    }

    #[test]
    fn normalization_centres_on_128() {
        let strip = Strip::new(vec![Point::new(128, 0), Point::new(192, 255)]).unwrap();
        assert_eq!(strip.normalized(), vec![(0.0, -1.0), (0.5, 127.0 / 128.0)]);
    }
}
