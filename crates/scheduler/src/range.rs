//! Visible sub-grid of each page.

use crate::tile::GridSize;
use pagestrip_viewer_core::{Viewport, ViewportMapper};

/// Cells of one page that intersect the viewport plus margin.
///
/// Row and column windows are half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRange {
    pub page: u32,
    pub grid: GridSize,
    pub row_start: u32,
    pub row_end: u32,
    pub col_start: u32,
    pub col_end: u32,
}

impl RenderRange {
    pub fn is_empty(&self) -> bool {
        self.row_start >= self.row_end || self.col_start >= self.col_end
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.row_end.saturating_sub(self.row_start))
            * u64::from(self.col_end.saturating_sub(self.col_start))
    }

    /// `(row, col)` pairs in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.row_start..self.row_end)
            .flat_map(move |row| (self.col_start..self.col_end).map(move |col| (row, col)))
    }

    /// True when the range spans the page's whole grid.
    pub fn covers_grid(&self) -> bool {
        self.row_start == 0
            && self.col_start == 0
            && self.row_end == self.grid.rows
            && self.col_end == self.grid.cols
    }
}

/// Render ranges for every page touched by the viewport grown by `margin`.
///
/// A page reached only through the half gap before it has no visible cells
/// and gets no range.
pub fn compute_render_ranges(
    viewport: &Viewport,
    mapper: &ViewportMapper,
    tile_size: f32,
    margin: f32,
) -> Vec<RenderRange> {
    if mapper.page_count() == 0 {
        return Vec::new();
    }

    let axis = mapper.axis();
    let zoom = viewport.zoom;
    let (scroll_primary, scroll_cross) = viewport.scroll(axis);
    let (len_primary, len_cross) = viewport.lengths(axis);

    let near_primary = (scroll_primary - margin).max(0.0);
    let far_primary = (scroll_primary + len_primary + margin).max(0.0);
    let near_cross = (scroll_cross - margin).max(0.0);
    let far_cross = (scroll_cross + len_cross + margin).max(0.0);

    let first = mapper.page_at_offset(near_primary, zoom);
    let last = mapper.page_at_offset(far_primary, zoom).max(first);

    (first..=last)
        .map(|page| {
            let scaled = mapper.page_size(page);
            let grid = GridSize::for_page(scaled, zoom, tile_size);

            let page_start = mapper.page_offset(page, zoom);
            let page_len = mapper.page_length(page, zoom);
            let near = if page == first { near_primary } else { page_start };
            let far = if page == last {
                far_primary
            } else {
                page_start + page_len
            };

            let secondary = mapper.secondary_offset(page, zoom);
            let cross_len = scaled.cross(axis) * zoom;

            let (primary_cells, cross_cells) = if axis.is_vertical() {
                (grid.rows, grid.cols)
            } else {
                (grid.cols, grid.rows)
            };
            let primary = window(near - page_start, far - page_start, page_len, primary_cells);
            let cross = window(
                near_cross - secondary,
                far_cross - secondary,
                cross_len,
                cross_cells,
            );
            let ((row_start, row_end), (col_start, col_end)) = if axis.is_vertical() {
                (primary, cross)
            } else {
                (cross, primary)
            };

            RenderRange {
                page,
                grid,
                row_start,
                row_end,
                col_start,
                col_end,
            }
        })
        .filter(|range| !range.is_empty())
        .collect()
}

/// Cells of an `extent`-long axis split into `cells` that overlap `[near, far]`.
fn window(near: f32, far: f32, extent: f32, cells: u32) -> (u32, u32) {
    if !(extent.is_finite() && extent > 0.0) {
        return (0, cells);
    }
    let cell = extent / cells as f32;
    let near = near.clamp(0.0, extent);
    let far = far.clamp(0.0, extent);
    let start = to_index((near / cell).floor(), cells);
    let end = to_index((far / cell).ceil(), cells);
    (start, end.max(start))
}

fn to_index(value: f32, cells: u32) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= cells as f32 {
        cells
    } else {
        value as u32
    }
}
