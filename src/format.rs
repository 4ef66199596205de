//! Binary strip and segment files.
//!
//! A strip frame has no header or version:
//!
//! ```text
//! u8 strip_count
//! strip_count × { u8 point_count, point_count × { u8 x, u8 y } }
//! ```
//!
//! An animation file is frames written back to back. A segment file is a
//! headerless run of `i16` little-endian `x1 y1 x2 y2` records.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::TraceError;
use crate::geom::{LineSegment, Point};
use crate::strips::{Strip, MAX_STRIP_POINTS};

/// Most strips one frame can hold; the count field is a single byte.
pub const MAX_STRIPS: usize = 255;

const SEGMENT_RECORD_LEN: usize = 8;

/// One image's worth of strips.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub strips: Vec<Strip>,
}

impl Frame {
    pub fn new(strips: Vec<Strip>) -> Self {
        Self { strips }
    }

    pub fn num_points(&self) -> usize {
        self.strips.iter().map(Strip::len).sum()
    }
}

/// Encode one frame. Coordinates are truncated to 8 bits.
///
/// Validates every count before producing any output, so a failed encode
/// never leaves a partial frame behind.
pub fn encode_strips(strips: &[Strip]) -> Result<Vec<u8>, TraceError> {
    if strips.len() > MAX_STRIPS {
        return Err(TraceError::EncodingOverflow {
            what: "strips in frame",
            count: strips.len(),
        });
    }
    let mut buf = Vec::with_capacity(1 + strips.iter().map(|s| 1 + 2 * s.len()).sum::<usize>());
    buf.push(strips.len() as u8);
    for strip in strips {
        if strip.is_empty() {
            return Err(TraceError::EmptyStrip);
        }
        if strip.len() > MAX_STRIP_POINTS {
            return Err(TraceError::EncodingOverflow {
                what: "points in strip",
                count: strip.len(),
            });
        }
        buf.push(strip.len() as u8);
        for point in strip.points() {
            buf.push(point.x as u8);
            buf.push(point.y as u8);
        }
    }
    Ok(buf)
}

/// Write one frame to `writer`.
pub fn write_strips<W: Write>(writer: &mut W, strips: &[Strip]) -> Result<(), TraceError> {
    let buf = encode_strips(strips)?;
    writer.write_all(&buf)?;
    Ok(())
}

/// Write several frames back to back.
pub fn write_frames<W: Write>(writer: &mut W, frames: &[Frame]) -> Result<(), TraceError> {
    let mut buf = Vec::new();
    for frame in frames {
        buf.extend(encode_strips(&frame.strips)?);
    }
    writer.write_all(&buf)?;
    Ok(())
}

/// Write one frame to a file.
pub fn save_strips(path: &Path, strips: &[Strip]) -> Result<(), TraceError> {
    let buf = encode_strips(strips)?;
    fs::write(path, buf)?;
    Ok(())
}

/// Decode the frame at the start of `data`, returning it and the bytes consumed.
pub fn decode_strips(data: &[u8]) -> Result<(Vec<Strip>, usize), TraceError> {
    let mut cursor = Cursor { data, pos: 0 };
    let count = cursor.byte()?;
    let mut strips = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let n = cursor.byte()?;
        let mut points = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let x = cursor.byte()?;
            let y = cursor.byte()?;
            points.push(Point::new(x as i32, y as i32));
        }
        strips.push(Strip::new(points)?);
    }
    Ok((strips, cursor.pos))
}

/// Read a single frame.
pub fn read_strips<R: Read>(reader: &mut R) -> Result<Vec<Strip>, TraceError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    let (strips, _) = decode_strips(&data)?;
    Ok(strips)
}

/// Read frames until the input is exhausted.
pub fn read_frames<R: Read>(reader: &mut R) -> Result<Vec<Frame>, TraceError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    let mut frames = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let (strips, used) = decode_strips(&data[offset..]).map_err(|e| match e {
            TraceError::Truncated { offset: at } => TraceError::Truncated { offset: offset + at },
            other => other,
        })?;
        frames.push(Frame::new(strips));
        offset += used;
    }
    Ok(frames)
}

/// Load every frame from an animation file.
pub fn load_frames(path: &Path) -> Result<Vec<Frame>, TraceError> {
    let mut file = fs::File::open(path)?;
    read_frames(&mut file)
}

/// Write segments as `i16` little-endian records. Coordinates are truncated to 16 bits.
pub fn write_segments<W: Write>(writer: &mut W, segments: &[LineSegment]) -> Result<(), TraceError> {
    let mut buf = Vec::with_capacity(segments.len() * SEGMENT_RECORD_LEN);
    for segment in segments {
        for v in [segment.start.x, segment.start.y, segment.end.x, segment.end.y] {
            buf.extend_from_slice(&(v as i16).to_le_bytes());
        }
    }
    writer.write_all(&buf)?;
    Ok(())
}

/// Read a segment file. A trailing partial record is an error.
pub fn read_segments<R: Read>(reader: &mut R) -> Result<Vec<LineSegment>, TraceError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    if data.len() % SEGMENT_RECORD_LEN != 0 {
        return Err(TraceError::Truncated {
            offset: data.len() - data.len() % SEGMENT_RECORD_LEN,
        });
    }
    let segments = data
        .chunks_exact(SEGMENT_RECORD_LEN)
        .map(|record| {
            let v = |i: usize| i16::from_le_bytes([record[2 * i], record[2 * i + 1]]) as i32;
            LineSegment::new(Point::new(v(0), v(1)), Point::new(v(2), v(3)))
        })
        .collect();
    Ok(segments)
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn byte(&mut self) -> Result<u8, TraceError> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or(TraceError::Truncated { offset: self.pos })?;
        self.pos += 1;
        Ok(b)
    }
}
