use std::path::Path;

use image::{ImageReader, Rgba, RgbaImage};

use crate::error::TraceError;

/// Read/write access to an RGBA pixel buffer.
///
/// The tracer only reads; `set_pixel_rgba` exists for the debug rasters.
pub trait PixelSource {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    fn inside(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }

    /// Pixel at (x, y). Callers check `inside` first.
    fn pixel_rgba(&self, x: i32, y: i32) -> [u8; 4];

    /// Write a pixel. Writes outside the buffer are ignored.
    fn set_pixel_rgba(&mut self, x: i32, y: i32, rgba: [u8; 4]);
}

impl PixelSource for RgbaImage {
    fn width(&self) -> i32 {
        self.dimensions().0 as i32
    }

    fn height(&self) -> i32 {
        self.dimensions().1 as i32
    }

    fn pixel_rgba(&self, x: i32, y: i32) -> [u8; 4] {
        self.get_pixel(x as u32, y as u32).0
    }

    fn set_pixel_rgba(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if self.inside(x, y) {
            self.put_pixel(x as u32, y as u32, Rgba(rgba));
        }
    }
}

/// Load any image the `image` crate can decode as 8-bit RGBA.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, TraceError> {
    let img = ImageReader::open(path)
        .map_err(|e| TraceError::ImageLoad(format!("{}: {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| TraceError::ImageLoad(format!("{}: {e}", path.display())))?
        .decode()
        .map_err(|e| TraceError::ImageLoad(format!("{}: {e}", path.display())))?
        .into_rgba8();
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_covers_exactly_the_buffer() {
        let img = RgbaImage::new(4, 3);
        assert!(img.inside(0, 0));
        assert!(img.inside(3, 2));
        assert!(!img.inside(4, 0));
        assert!(!img.inside(0, 3));
        assert!(!img.inside(-1, 1));
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut img = RgbaImage::new(2, 2);
        img.set_pixel_rgba(5, 5, [255, 0, 0, 255]);
        img.set_pixel_rgba(1, 1, [9, 8, 7, 6]);
        assert_eq!(img.pixel_rgba(1, 1), [9, 8, 7, 6]);
        assert_eq!(img.pixel_rgba(0, 0), [0, 0, 0, 0]);
    }
}
