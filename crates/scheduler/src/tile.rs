//! Per-page render cell grid.
//!
//! A page is cut into `rows x cols` equal cells of roughly `tile_size` pixels
//! at the current zoom. Cells on the right and bottom edges are clamped to the
//! page and may be smaller.

use pagestrip_viewer_core::{RectF, SizeF};

/// Number of cell rows and columns of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub rows: u32,
    pub cols: u32,
}

impl GridSize {
    /// Grid for a page of `scaled` size (zoom 1) shown at `zoom`.
    ///
    /// Never smaller than 1x1, also for empty or degenerate pages.
    pub fn for_page(scaled: SizeF, zoom: f32, tile_size: f32) -> Self {
        Self {
            rows: cell_count(scaled.height * zoom, tile_size),
            cols: cell_count(scaled.width * zoom, tile_size),
        }
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }
}

fn cell_count(extent: f32, tile_size: f32) -> u32 {
    let count = (extent / tile_size).ceil();
    if !count.is_finite() || count < 1.0 {
        return 1;
    }
    if count >= u32::MAX as f32 {
        return u32::MAX;
    }
    count as u32
}

/// Size of one cell, relative to the page and in render pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartSize {
    pub relative_width: f32,
    pub relative_height: f32,
    /// Width the whole page renders at when cut into this grid.
    pub render_width: f32,
    pub render_height: f32,
}

impl PartSize {
    pub fn for_grid(grid: GridSize, tile_size: f32) -> Self {
        let relative_width = 1.0 / grid.cols.max(1) as f32;
        let relative_height = 1.0 / grid.rows.max(1) as f32;
        Self {
            relative_width,
            relative_height,
            render_width: tile_size / relative_width,
            render_height: tile_size / relative_height,
        }
    }

    /// Part size of a page; a degenerate page renders at zero pixels.
    pub fn for_page(grid: GridSize, scaled: SizeF, zoom: f32, tile_size: f32) -> Self {
        let mut part = Self::for_grid(grid, tile_size);
        if scaled.scaled(zoom).is_degenerate() {
            part.render_width = 0.0;
            part.render_height = 0.0;
        }
        part
    }

    /// Bounds and pixel size of a cell, `None` when it has no area.
    pub fn cell(&self, row: u32, col: u32) -> Option<Cell> {
        let left = self.relative_width * col as f32;
        let top = self.relative_height * row as f32;
        let mut width = self.relative_width;
        let mut height = self.relative_height;
        if left + width > 1.0 {
            width = 1.0 - left;
        }
        if top + height > 1.0 {
            height = 1.0 - top;
        }

        let render_width = self.render_width * width;
        let render_height = self.render_height * height;
        if !(render_width > 0.0 && render_height > 0.0) {
            return None;
        }

        Some(Cell {
            row,
            col,
            bounds: RectF::new(left, top, left + width, top + height),
            render_width,
            render_height,
        })
    }
}

/// A renderable cell of a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub bounds: RectF,
    pub render_width: f32,
    pub render_height: f32,
}
