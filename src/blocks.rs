//! Spatial block index over the image.
//!
//! The image is cut into square tiles of `block_size` pixels. Each tile
//! ([`EdgeBlock`]) scans its own pixels for edges and keeps the indices of the
//! contour points it found, so nearest-neighbor search can stay inside a
//! 3×3 neighborhood of tiles instead of walking every point.

use tracing::debug;

use crate::bitmap::PixelSource;
use crate::config::TracingConfig;
use crate::contour::{ContourPoint, ContourPoints, PointDistance};
use crate::geom::Point;

/// Position of a block in [`BlockIndex`] order (row-major over tile origins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) usize);

/// Orthogonal neighbor direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// One square tile of the image.
#[derive(Debug, Clone)]
pub struct EdgeBlock {
    /// Top-left pixel, aligned to the block size.
    pub origin: Point,
    /// Indices into [`ContourPoints`] of the points inside this tile.
    points: Vec<usize>,
    visited: bool,
    extracted: bool,
}

impl EdgeBlock {
    fn new(origin: Point) -> Self {
        Self {
            origin,
            points: Vec::new(),
            visited: false,
            extracted: false,
        }
    }

    pub fn points(&self) -> &[usize] {
        &self.points
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn is_extracted(&self) -> bool {
        self.extracted
    }

    fn is_available(&self) -> bool {
        !self.extracted && !self.points.is_empty()
    }

    /// Scan `width × height` pixels starting at the tile origin for edges.
    ///
    /// A pixel is an edge point when the red channel differs from its left or
    /// up neighbor by more than `threshold`. Pixels whose left or up neighbor
    /// lies outside the image are skipped.
    fn scan(
        &mut self,
        id: BlockId,
        pixels: &impl PixelSource,
        (width, height): (i32, i32),
        threshold: u8,
        out: &mut ContourPoints,
    ) {
        let threshold = threshold as i32;
        for dy in 0..height {
            for dx in 0..width {
                let x = self.origin.x + dx;
                let y = self.origin.y + dy;
                if !pixels.inside(x, y) || !pixels.inside(x - 1, y) || !pixels.inside(x, y - 1) {
                    continue;
                }
                let c = pixels.pixel_rgba(x, y)[0] as i32;
                let l = pixels.pixel_rgba(x - 1, y)[0] as i32;
                let u = pixels.pixel_rgba(x, y - 1)[0] as i32;

                let delta_x = (l - c).abs();
                let delta_y = (u - c).abs();
                if delta_x > threshold || delta_y > threshold {
                    let idx = out.push(ContourPoint::new(Point::new(x, y), id));
                    self.points.push(idx);
                }
            }
        }
    }

    /// Append the distance from `origin` to every unused point of this block.
    fn point_distances(
        &self,
        origin: &ContourPoint,
        points: &ContourPoints,
        out: &mut Vec<PointDistance>,
    ) {
        for &idx in &self.points {
            let candidate = &points[idx];
            if candidate.index == origin.index || candidate.is_used() {
                continue;
            }
            out.push(PointDistance {
                distance: origin.distance(candidate),
                index: idx,
            });
        }
    }
}

/// Grid of [`EdgeBlock`]s covering the image.
///
/// Only whole tiles are created: trailing pixel columns/rows narrower than a
/// block get no block of their own. The last block column and row scan one
/// extra pixel column/row past their tile, so the first pixel beyond the
/// grid is still covered.
#[derive(Debug, Clone)]
pub struct BlockIndex {
    block_size: i32,
    cols: usize,
    rows: usize,
    blocks: Vec<EdgeBlock>,
}

impl BlockIndex {
    /// Build the grid for an image of the given size. Blocks start empty.
    pub fn new(width: i32, height: i32, block_size: u32) -> Self {
        let bs = i32::try_from(block_size.max(1)).unwrap_or(i32::MAX);
        let cols = (width.max(0) / bs) as usize;
        let rows = (height.max(0) / bs) as usize;
        let mut blocks = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                blocks.push(EdgeBlock::new(Point::new(col as i32 * bs, row as i32 * bs)));
            }
        }
        Self {
            block_size: bs,
            cols,
            rows,
            blocks,
        }
    }

    pub fn for_image(pixels: &impl PixelSource, config: &TracingConfig) -> Self {
        Self::new(pixels.width(), pixels.height(), config.block_size)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_size(&self) -> i32 {
        self.block_size
    }

    pub fn block(&self, id: BlockId) -> &EdgeBlock {
        &self.blocks[id.0]
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &EdgeBlock)> {
        self.blocks.iter().enumerate().map(|(i, b)| (BlockId(i), b))
    }

    /// Block whose tile starts at `origin`, if there is one.
    pub fn block_at(&self, origin: Point) -> Option<BlockId> {
        if origin.x < 0 || origin.y < 0 {
            return None;
        }
        if origin.x % self.block_size != 0 || origin.y % self.block_size != 0 {
            return None;
        }
        let col = (origin.x / self.block_size) as usize;
        let row = (origin.y / self.block_size) as usize;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(BlockId(row * self.cols + col))
    }

    /// The block one tile away from `id` in `direction`.
    pub fn neighbor(&self, direction: Direction, id: BlockId) -> Option<BlockId> {
        let origin = self.blocks[id.0].origin;
        let bs = self.block_size;
        let target = match direction {
            Direction::Left => Point::new(origin.x - bs, origin.y),
            Direction::Right => Point::new(origin.x + bs, origin.y),
            Direction::Up => Point::new(origin.x, origin.y - bs),
            Direction::Down => Point::new(origin.x, origin.y + bs),
        };
        self.block_at(target)
    }

    /// Scan every block exactly once and collect all contour points.
    ///
    /// Blocks are visited by a depth-first walk over left/right/up/down
    /// neighbors, restarted from each still-unvisited block in index order.
    /// Global indices are assigned after the sweep, in append order.
    pub fn extract_contour_points(
        &mut self,
        pixels: &impl PixelSource,
        config: &TracingConfig,
    ) -> ContourPoints {
        let mut points = ContourPoints::default();
        let mut stack: Vec<BlockId> = Vec::new();
        let mut scanned = 0usize;

        for root in 0..self.blocks.len() {
            if self.blocks[root].visited {
                continue;
            }
            stack.push(BlockId(root));
            while let Some(id) = stack.pop() {
                if self.blocks[id.0].visited {
                    continue;
                }
                self.blocks[id.0].visited = true;
                let extent = self.scan_extent(id);
                self.blocks[id.0].scan(id, pixels, extent, config.grey_threshold, &mut points);
                scanned += 1;

                // Pushed in reverse so left is walked first, then right, up, down.
                for direction in [Direction::Down, Direction::Up, Direction::Right, Direction::Left] {
                    if let Some(next) = self.neighbor(direction, id) {
                        if !self.blocks[next.0].visited {
                            stack.push(next);
                        }
                    }
                }
            }
        }
        points.assign_indices();

        if config.verbose {
            debug!(blocks = scanned, points = points.len(), "scanned blocks for contour points");
        }
        points
    }

    /// Pick the next block to trace from.
    ///
    /// With no `previous` block, returns the first block in index order that
    /// is not extracted and holds at least one point. With a `previous`
    /// block, prefers its right, then down, then left neighbor under the same
    /// condition before falling back to the index-order scan.
    pub fn block_for_extraction(&self, previous: Option<BlockId>) -> Option<BlockId> {
        if let Some(previous) = previous {
            for direction in [Direction::Right, Direction::Down, Direction::Left] {
                if let Some(next) = self.neighbor(direction, previous) {
                    if self.blocks[next.0].is_available() {
                        return Some(next);
                    }
                }
            }
        }
        self.blocks
            .iter()
            .position(EdgeBlock::is_available)
            .map(BlockId)
    }

    /// Mark a block's neighborhood as consumed by the tracer.
    pub fn set_extracted(&mut self, id: BlockId) {
        self.blocks[id.0].extracted = true;
    }

    /// Distances from point `origin` to every unused point in its block and
    /// the eight blocks around it. Corner blocks are reached through the up
    /// and down neighbors.
    pub fn local_point_distances(&self, origin: usize, points: &ContourPoints) -> Vec<PointDistance> {
        let origin = &points[origin];
        let home = origin.block;
        let mut distances = Vec::new();

        let visit = |id: Option<BlockId>, distances: &mut Vec<PointDistance>| {
            if let Some(id) = id {
                self.blocks[id.0].point_distances(origin, points, distances);
            }
        };

        visit(Some(home), &mut distances);
        visit(self.neighbor(Direction::Left, home), &mut distances);
        visit(self.neighbor(Direction::Right, home), &mut distances);
        for vertical in [Direction::Up, Direction::Down] {
            if let Some(row) = self.neighbor(vertical, home) {
                visit(Some(row), &mut distances);
                visit(self.neighbor(Direction::Left, row), &mut distances);
                visit(self.neighbor(Direction::Right, row), &mut distances);
            }
        }
        distances
    }

    /// Pixel extent scanned by a block: its tile, plus one column/row past
    /// the grid edge for the last column/row.
    fn scan_extent(&self, id: BlockId) -> (i32, i32) {
        let col = id.0 % self.cols;
        let row = id.0 / self.cols;
        let width = if col + 1 == self.cols { self.block_size + 1 } else { self.block_size };
        let height = if row + 1 == self.rows { self.block_size + 1 } else { self.block_size };
        (width, height)
    }
}
