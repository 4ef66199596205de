//! Debug rasters of traced output.
//!
//! Draws raw segments, contour points and parsed strip files back to pixels
//! for visual diffing. Lines are walked one pixel step at a time with no
//! anti-aliasing.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::bitmap::PixelSource;
use crate::contour::ContourPoints;
use crate::error::TraceError;
use crate::geom::{LineSegment, Point};
use crate::strips::Strip;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

/// Half-size of the cross marking where tracing started.
const START_MARK: i32 = 4;

/// Draw a line from `a` towards `b`, one pixel per unit of length.
///
/// The end pixel itself is not drawn. Pixels outside `dst` are skipped.
pub fn draw_line(dst: &mut impl PixelSource, a: Point, b: Point, rgba: [u8; 4]) {
    let len = a.distance(b);
    if len == 0.0 {
        return;
    }
    let step_x = (b.x - a.x) as f64 / len;
    let step_y = (b.y - a.y) as f64 / len;
    let (mut x, mut y) = (a.x as f64, a.y as f64);
    let mut i = 0.0;
    while i < len {
        dst.set_pixel_rgba(x as i32, y as i32, rgba);
        x += step_x;
        y += step_y;
        i += 1.0;
    }
}

/// Render raw segments: white lines, a blue cross at the first segment's
/// start and a red dot at every other segment start.
pub fn draw_segments(width: u32, height: u32, segments: &[LineSegment]) -> RgbaImage {
    let mut dst = RgbaImage::new(width, height);
    for (i, segment) in segments.iter().enumerate() {
        draw_line(&mut dst, segment.start, segment.end, WHITE);
        let p = segment.start;
        if i == 0 {
            draw_line(&mut dst, Point::new(p.x - START_MARK, p.y), Point::new(p.x + START_MARK, p.y), BLUE);
            draw_line(&mut dst, Point::new(p.x, p.y - START_MARK), Point::new(p.x, p.y + START_MARK), BLUE);
        } else {
            draw_filled_rect_mut(&mut dst, Rect::at(p.x, p.y).of_size(2, 2), Rgba(RED));
        }
    }
    dst
}

/// Render every contour point as one opaque black pixel on a transparent canvas.
pub fn draw_contour_points(width: u32, height: u32, points: &ContourPoints) -> RgbaImage {
    let mut dst = RgbaImage::new(width, height);
    for point in points {
        dst.set_pixel_rgba(point.point.x, point.point.y, BLACK);
    }
    dst
}

/// Render strips as white polylines on black, with each strip's first
/// line in red.
pub fn draw_strips(width: u32, height: u32, strips: &[Strip]) -> RgbaImage {
    let mut dst = RgbaImage::from_pixel(width, height, Rgba(BLACK));
    for strip in strips {
        for (i, pair) in strip.points().windows(2).enumerate() {
            let rgba = if i == 0 { RED } else { WHITE };
            draw_line(&mut dst, pair[0], pair[1], rgba);
        }
        if let [only] = strip.points() {
            dst.set_pixel_rgba(only.x, only.y, WHITE);
        }
    }
    dst
}

/// Save a debug raster as PNG.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<(), TraceError> {
    img.save(path)
        .map_err(|e| TraceError::ImageSave(format!("{}: {e}", path.display())))
}
