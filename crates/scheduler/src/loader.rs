//! Tile scheduling passes.
//!
//! A pass turns the current viewport into render requests: a thumbnail for
//! every page in range, then the page's visible cells in row-major order,
//! pages ascending. Each cell gets the next priority order, starting at 1,
//! so the first visible cell is the most important. The pass ends as soon as
//! the submission budget is spent.

use crate::collab::{PageOpener, RenderSink, RenderTask, TileCache};
use crate::config::SchedulerConfig;
use crate::range::{compute_render_ranges, RenderRange};
use crate::tile::{GridSize, PartSize};
use pagestrip_viewer_core::{RectF, Viewport, ViewportMapper};

/// Outcome of one scheduling pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    /// Ranges of the pages that were scheduled.
    pub ranges: Vec<RenderRange>,
    /// Tiles sent to the render sink.
    pub submitted: usize,
    pub thumbnails_submitted: usize,
    /// Tiles the cache already held.
    pub cache_hits: usize,
    /// Cells skipped because they have no area.
    pub degenerate_cells: usize,
    /// Pages skipped because they failed to open earlier.
    pub failed_pages: Vec<u32>,
    /// True when the pass stopped at the budget.
    pub budget_exhausted: bool,
}

/// Decides which tiles to render for a viewport.
#[derive(Debug, Clone)]
pub struct TileScheduler {
    config: SchedulerConfig,
    cache_order: u32,
    part_size: PartSize,
}

impl TileScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            cache_order: 1,
            part_size: PartSize::default(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Part size of the page enumerated last.
    pub fn part_size(&self) -> PartSize {
        self.part_size
    }

    /// Render ranges for the viewport, without touching cache or sink.
    pub fn render_ranges(&self, viewport: &Viewport, mapper: &ViewportMapper) -> Vec<RenderRange> {
        compute_render_ranges(
            viewport,
            mapper,
            self.config.tile_size,
            self.config.preload_offset,
        )
    }

    /// Run one scheduling pass.
    pub fn load_pages<P, C, S>(
        &mut self,
        viewport: &Viewport,
        mapper: &ViewportMapper,
        pages: &P,
        cache: &C,
        sink: &S,
    ) -> PassReport
    where
        P: PageOpener + ?Sized,
        C: TileCache + ?Sized,
        S: RenderSink + ?Sized,
    {
        self.cache_order = 1;
        let mut report = PassReport::default();

        for range in self.render_ranges(viewport, mapper) {
            if pages.document_page(range.page).is_none() {
                log::debug!("page {} does not resolve, skipping", range.page);
                continue;
            }
            if pages.has_failed(range.page) {
                log::warn!("page {} failed to open earlier, skipping", range.page);
                report.failed_pages.push(range.page);
                continue;
            }
            report.ranges.push(range);
        }

        for range in &report.ranges {
            if self.load_thumbnail(range.page, mapper, cache, sink) {
                report.thumbnails_submitted += 1;
            }
        }

        let zoom = viewport.zoom;
        'pages: for range in &report.ranges {
            let scaled = mapper.page_size(range.page);
            self.part_size = PartSize::for_page(range.grid, scaled, zoom, self.config.tile_size);

            for (row, col) in range.cells() {
                if report.submitted >= self.config.pass_budget {
                    report.budget_exhausted = true;
                    break 'pages;
                }

                let Some(cell) = self.part_size.cell(row, col) else {
                    report.degenerate_cells += 1;
                    continue;
                };

                let order = self.cache_order;
                self.cache_order += 1;

                if cache.contains_part(range.page, &cell.bounds, order) {
                    report.cache_hits += 1;
                    continue;
                }

                log::trace!(
                    "page {} cell ({}, {}) order {} at {}x{}",
                    range.page,
                    row,
                    col,
                    order,
                    cell.render_width,
                    cell.render_height
                );
                sink.submit(RenderTask {
                    page: range.page,
                    width: cell.render_width,
                    height: cell.render_height,
                    bounds: cell.bounds,
                    thumbnail: false,
                    cache_order: order,
                    best_quality: self.config.best_quality,
                    annotation_rendering: self.config.annotation_rendering,
                });
                report.submitted += 1;
            }
        }

        if report.submitted >= self.config.pass_budget {
            report.budget_exhausted = true;
        }

        log::debug!(
            "scheduling pass: {} ranges, {} submitted, {} thumbnails, {} cached, {} degenerate{}",
            report.ranges.len(),
            report.submitted,
            report.thumbnails_submitted,
            report.cache_hits,
            report.degenerate_cells,
            if report.budget_exhausted {
                ", budget exhausted"
            } else {
                ""
            }
        );
        report
    }

    fn load_thumbnail<C, S>(&self, page: u32, mapper: &ViewportMapper, cache: &C, sink: &S) -> bool
    where
        C: TileCache + ?Sized,
        S: RenderSink + ?Sized,
    {
        let size = mapper.page_size(page).scaled(self.config.thumbnail_ratio);
        if size.is_degenerate() || cache.contains_thumbnail(page, &RectF::FULL) {
            return false;
        }
        sink.submit(RenderTask {
            page,
            width: size.width,
            height: size.height,
            bounds: RectF::FULL,
            thumbnail: true,
            cache_order: 0,
            best_quality: self.config.best_quality,
            annotation_rendering: self.config.annotation_rendering,
        });
        true
    }
}

impl Default for TileScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

/// Grid of a page at a zoom level, for callers that draw placeholders.
pub fn page_grid(mapper: &ViewportMapper, page: u32, zoom: f32, tile_size: f32) -> GridSize {
    GridSize::for_page(mapper.page_size(page), zoom, tile_size)
}
