//! Contracts between the scheduler and the rest of the viewer.

use pagestrip_cache::PartCache;
use pagestrip_viewer_core::{Document, PageSource, RectF, ViewerResult};

/// A request to rasterize one rectangle of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTask {
    pub page: u32,
    /// Target size in pixels.
    pub width: f32,
    pub height: f32,
    /// Page-relative rectangle to render.
    pub bounds: RectF,
    pub thumbnail: bool,
    /// Priority, lower renders first.
    pub cache_order: u32,
    pub best_quality: bool,
    pub annotation_rendering: bool,
}

/// What the scheduler needs to know about rendered parts.
pub trait TileCache {
    /// True when the part is cached. The cache may re-rank the part to `order`.
    fn contains_part(&self, page: u32, bounds: &RectF, order: u32) -> bool;

    fn contains_thumbnail(&self, page: u32, bounds: &RectF) -> bool;
}

/// Accepts render tasks. Submission never blocks on rendering.
pub trait RenderSink {
    fn submit(&self, task: RenderTask);
}

/// Page lookup and opening, shared by the scheduler and render workers.
pub trait PageOpener {
    /// Document page for a logical page, `None` if it does not resolve.
    fn document_page(&self, page: u32) -> Option<u32>;

    fn open_page(&self, page: u32) -> ViewerResult<()>;

    /// True when an earlier attempt to open the page failed.
    fn has_failed(&self, _page: u32) -> bool {
        false
    }
}

impl TileCache for PartCache {
    fn contains_part(&self, page: u32, bounds: &RectF, order: u32) -> bool {
        self.up_part_if_contained(page, bounds, order)
    }

    fn contains_thumbnail(&self, page: u32, bounds: &RectF) -> bool {
        PartCache::contains_thumbnail(self, page, bounds)
    }
}

impl<S: PageSource> PageOpener for Document<S> {
    fn document_page(&self, page: u32) -> Option<u32> {
        Document::document_page(self, i64::from(page))
    }

    fn open_page(&self, page: u32) -> ViewerResult<()> {
        Document::open_page(self, page)
    }

    fn has_failed(&self, page: u32) -> bool {
        self.page_failed(page)
    }
}
