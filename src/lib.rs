//! img2strip: bitmap image → line-art strips.
//!
//! Traces the edges of a bitmap into short polylines ("strips") stored in
//! a compact byte format for vector animation playback.
//!
//! # Example
//!
//! ```no_run
//! use img2strip::{trace, TracingConfig};
//! use std::path::Path;
//!
//! let config = TracingConfig::default();
//! let result = trace(Path::new("frame.png"), &config)?;
//! img2strip::format::save_strips(Path::new("frame.db"), &result.strips)?;
//! # Ok::<(), img2strip::TraceError>(())
//! ```

#![forbid(unsafe_code)]

mod bitmap;
mod config;
mod geom;

pub mod blocks;
pub mod contour;
pub mod error;
pub mod format;
pub mod optimize;
pub mod render;
pub mod strips;
pub mod tracer;

pub use bitmap::{load_rgba, PixelSource};
pub use config::TracingConfig;
pub use error::TraceError;
pub use format::Frame;
pub use geom::{LineSegment, Point};
pub use strips::Strip;

use std::path::Path;
use std::time::Instant;

use tracing::info;

use blocks::BlockIndex;
use contour::ContourPoints;
use tracer::Tracer;

/// Everything one tracing run produces.
#[derive(Debug, Clone)]
pub struct TraceResult {
    /// Image size in pixels.
    pub width: u32,
    pub height: u32,
    /// All detected edge points, with their final used flags.
    pub points: ContourPoints,
    /// Segments in trace order, before optimization.
    pub segments: Vec<LineSegment>,
    /// Merged segments, when optimization is enabled.
    pub optimized_segments: Option<Vec<LineSegment>>,
    /// Strips built from the raw segments.
    pub raw_strips: Vec<Strip>,
    /// Strips built from the optimized segments, or the raw strips when
    /// optimization is off.
    pub strips: Vec<Strip>,
}

/// Full pipeline: image path → strips.
pub fn trace(image_path: &Path, config: &TracingConfig) -> Result<TraceResult, TraceError> {
    let img = bitmap::load_rgba(image_path)?;
    trace_pixels(&img, config)
}

/// Full pipeline over an in-memory pixel source.
///
/// Pipeline: block index → contour points → greedy segment tracing →
/// optional collinear merge → strip assembly.
pub fn trace_pixels(pixels: &impl PixelSource, config: &TracingConfig) -> Result<TraceResult, TraceError> {
    config.validate()?;
    let t_start = Instant::now();

    let mut blocks = BlockIndex::for_image(pixels, config);
    let mut points = blocks.extract_contour_points(pixels, config);
    info!(
        width = pixels.width(),
        height = pixels.height(),
        blocks = blocks.len(),
        points = points.len(),
        "extracted contour points"
    );
    if points.is_empty() {
        return Err(TraceError::NoContours);
    }

    let segments = Tracer::new(&mut points, &mut blocks, config).extract_vectors()?;
    let raw_strips = strips::build_strips(&segments, config)?;

    let (optimized_segments, strips) = if config.optimize {
        let optimized = optimize::optimize_segments(&segments, config);
        let strips = strips::build_strips(&optimized, config)?;
        (Some(optimized), strips)
    } else {
        (None, raw_strips.clone())
    };

    info!(
        segments = segments.len(),
        optimized = optimized_segments.as_ref().map_or(segments.len(), Vec::len),
        raw_strips = raw_strips.len(),
        strips = strips.len(),
        elapsed_ms = t_start.elapsed().as_millis() as u64,
        "traced image"
    );

    Ok(TraceResult {
        width: pixels.width().max(0) as u32,
        height: pixels.height().max(0) as u32,
        points,
        segments,
        optimized_segments,
        raw_strips,
        strips,
    })
}

impl TraceResult {
    /// Final segments: optimized when available, raw otherwise.
    pub fn final_segments(&self) -> &[LineSegment] {
        self.optimized_segments.as_deref().unwrap_or(&self.segments)
    }

    /// Total points across the final strips.
    pub fn num_strip_points(&self) -> usize {
        self.strips.iter().map(Strip::len).sum()
    }
}
