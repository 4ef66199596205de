//! Synthetic bitmaps for the integration tests.

#![allow(dead_code)]

use image::{Rgba, RgbaImage};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

pub fn blank(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([40, 40, 40, 255]))
}

/// A one pixel wide white column on black.
pub fn vertical_line(width: u32, height: u32, column: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, _| if x == column { WHITE } else { BLACK })
}

/// A one pixel high white row from `x0` (inclusive) to `x1` (exclusive).
pub fn horizontal_line(width: u32, height: u32, row: u32, x0: u32, x1: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if y == row && (x0..x1).contains(&x) {
            WHITE
        } else {
            BLACK
        }
    })
}

/// White squares on black, each given as `(x0, y0, x1, y1)` with exclusive ends.
pub fn blobs(width: u32, height: u32, squares: &[(u32, u32, u32, u32)]) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let inside = squares
            .iter()
            .any(|&(x0, y0, x1, y1)| (x0..x1).contains(&x) && (y0..y1).contains(&y));
        if inside {
            WHITE
        } else {
            BLACK
        }
    })
}

/// A white 45° diagonal from `(from, from)` to `(to - 1, to - 1)`.
pub fn diagonal_line(size: u32, from: u32, to: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        if x == y && (from..to).contains(&x) {
            WHITE
        } else {
            BLACK
        }
    })
}

/// Concentric square outlines, enough edges for several clusters.
pub fn rings(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let d = x.min(y).min(size - 1 - x).min(size - 1 - y);
        if d % 12 == 4 {
            WHITE
        } else {
            BLACK
        }
    })
}
