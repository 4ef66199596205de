//! Collinear segment merging.

use tracing::debug;

use crate::config::TracingConfig;
use crate::geom::LineSegment;

/// Segments shorter than this are dropped when they cannot be merged.
pub const MIN_SEGMENT_LENGTH: f64 = 2.0;

/// Merge runs of chained, near-collinear segments into single segments.
///
/// A run starts at a segment and absorbs following segments while each starts
/// where the previous one ended and its direction stays within
/// `optimization_cutoff_angle` (a cosine) of the run's first segment. A run
/// of one segment is kept as is unless it is shorter than
/// [`MIN_SEGMENT_LENGTH`]. One left-to-right pass; merged output is not
/// revisited.
pub fn optimize_segments(segments: &[LineSegment], config: &TracingConfig) -> Vec<LineSegment> {
    let cutoff = config.optimization_cutoff_angle;
    let mut merged = Vec::with_capacity(segments.len());
    let mut k = 0;

    while k < segments.len() {
        let first = segments[k];
        let last = run_end(segments, k, cutoff);

        if last > k {
            let segment = LineSegment::new(first.start, segments[last].end);
            if config.verbose {
                debug!(
                    from = k,
                    to = last,
                    start = ?segment.start,
                    end = ?segment.end,
                    "merged collinear run"
                );
                if segment.len() < MIN_SEGMENT_LENGTH {
                    debug!(len = segment.len(), "merged segment is short");
                }
            }
            merged.push(segment);
            k = last + 1;
        } else {
            if first.len() < MIN_SEGMENT_LENGTH {
                if config.verbose {
                    debug!(index = k, len = first.len(), "dropping short segment");
                }
            } else {
                merged.push(first);
            }
            k += 1;
        }
    }

    if config.verbose {
        debug!(before = segments.len(), after = merged.len(), "optimized line segments");
    }
    merged
}

/// Index of the last segment absorbed into the run starting at `start`.
fn run_end(segments: &[LineSegment], start: usize, cutoff: f64) -> usize {
    let reference = segments[start].direction();
    let mut last = start;
    for (j, candidate) in segments.iter().enumerate().skip(start + 1) {
        if !segments[last].chains_to(candidate) {
            break;
        }
        if reference.dot(candidate.direction()) <= cutoff {
            break;
        }
        last = j;
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::strips::build_strips;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, Registry};

    struct CountEvents(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for CountEvents {
        fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn events_while(f: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = Registry::default().with(CountEvents(count.clone()));
        tracing::subscriber::with_default(subscriber, f);
        count.load(Ordering::SeqCst)
    }

    fn seg(a: (i32, i32), b: (i32, i32)) -> LineSegment {
        LineSegment::new(Point::new(a.0, a.1), Point::new(b.0, b.1))
    }

    #[test]
    fn straight_chain_collapses_to_one_segment() {
        let segments = vec![seg((0, 0), (5, 0)), seg((5, 0), (10, 1)), seg((10, 1), (15, 1))];
        let merged = optimize_segments(&segments, &TracingConfig::default());
        assert_eq!(merged, vec![seg((0, 0), (15, 1))]);
        assert!(merged[0].source.is_none());
    }

    #[test]
    fn corner_breaks_the_run() {
        let segments = vec![
            seg((0, 0), (5, 0)),
            seg((5, 0), (10, 0)),
            seg((10, 0), (10, 5)),
            seg((10, 5), (10, 10)),
        ];
        let merged = optimize_segments(&segments, &TracingConfig::default());
        assert_eq!(merged, vec![seg((0, 0), (10, 0)), seg((10, 0), (10, 10))]);
    }

    #[test]
    fn discontinuity_breaks_the_run() {
        let segments = vec![seg((0, 0), (5, 0)), seg((6, 0), (11, 0)), seg((11, 0), (16, 0))];
        let merged = optimize_segments(&segments, &TracingConfig::default());
        assert_eq!(merged, vec![seg((0, 0), (5, 0)), seg((6, 0), (16, 0))]);
    }

    #[test]
    fn unmergeable_short_segments_are_dropped() {
        let segments = vec![seg((0, 0), (5, 0)), seg((5, 0), (5, 1)), seg((5, 1), (0, 1))];
        let merged = optimize_segments(&segments, &TracingConfig::default());
        assert_eq!(merged, vec![seg((0, 0), (5, 0)), seg((5, 1), (0, 1))]);
    }

    #[test]
    fn gradual_curve_is_measured_against_the_run_start() {
        // Each turn is small, but the third segment has drifted too far
        // from the first one.
        let segments = vec![seg((0, 0), (10, 0)), seg((10, 0), (20, 2)), seg((20, 2), (29, 6))];
        let merged = optimize_segments(&segments, &TracingConfig::default());
        assert_eq!(merged, vec![seg((0, 0), (20, 2)), seg((20, 2), (29, 6))]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(optimize_segments(&[], &TracingConfig::default()).is_empty());
    }

    #[test]
    fn stage_diagnostics_only_when_verbose() {
        let segments = vec![
            seg((0, 0), (5, 0)),
            seg((5, 0), (10, 0)),
            seg((10, 0), (10, 5)),
            seg((10, 5), (10, 10)),
        ];
        let quiet = TracingConfig::default();
        let verbose = TracingConfig {
            verbose: true,
            ..TracingConfig::default()
        };

        let silent = events_while(|| {
            let merged = optimize_segments(&segments, &quiet);
            build_strips(&merged, &quiet).unwrap();
        });
        assert_eq!(silent, 0);

        let logged = events_while(|| {
            let merged = optimize_segments(&segments, &verbose);
            build_strips(&merged, &verbose).unwrap();
        });
        assert!(logged >= 2, "expected the merge and assembly summaries, got {logged}");
    }
}
