//! Offset and page queries against a published geometry table.

use crate::geometry::{ScrollAxis, SizeF};
use crate::layout::{PageGeometry, PageGeometryTable};
use std::sync::Arc;

/// Answers "which page is here" and "where is this page" at a given zoom.
///
/// Holds one table snapshot; build a new mapper after the layout is recomputed.
#[derive(Debug, Clone)]
pub struct ViewportMapper {
    table: Arc<PageGeometryTable>,
}

impl ViewportMapper {
    pub fn new(table: Arc<PageGeometryTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<PageGeometryTable> {
        &self.table
    }

    pub fn axis(&self) -> ScrollAxis {
        self.table.axis()
    }

    pub fn page_count(&self) -> u32 {
        u32::try_from(self.table.len()).unwrap_or(u32::MAX)
    }

    /// Geometry of a page that resolves to a document page.
    fn page(&self, page: u32) -> Option<&PageGeometry> {
        self.table.page(page as usize).filter(|geometry| geometry.valid)
    }

    /// Start of a page along the scroll axis.
    pub fn page_offset(&self, page: u32, zoom: f32) -> f32 {
        self.page(page).map_or(0.0, |geometry| geometry.offset * zoom)
    }

    /// Length of a page along the scroll axis.
    pub fn page_length(&self, page: u32, zoom: f32) -> f32 {
        self.page(page)
            .map_or(0.0, |geometry| geometry.scaled.primary(self.axis()) * zoom)
    }

    pub fn page_spacing(&self, page: u32, zoom: f32) -> f32 {
        self.page(page).map_or(0.0, |geometry| geometry.spacing * zoom)
    }

    /// Offset of a page across the scroll axis, centering narrower pages on
    /// the widest one.
    pub fn secondary_offset(&self, page: u32, zoom: f32) -> f32 {
        let Some(geometry) = self.page(page) else {
            return 0.0;
        };
        let axis = self.axis();
        let max_cross = self.max_page_size().cross(axis);
        zoom * (max_cross - geometry.scaled.cross(axis)) / 2.0
    }

    /// Page containing `offset`, where each page owns half of the gap before it.
    pub fn page_at_offset(&self, offset: f32, zoom: f32) -> u32 {
        let count = self
            .table
            .pages()
            .iter()
            .take_while(|geometry| geometry.offset * zoom - geometry.spacing * zoom / 2.0 < offset)
            .count();
        u32::try_from(count.saturating_sub(1)).unwrap_or(u32::MAX)
    }

    pub fn doc_length(&self, zoom: f32) -> f32 {
        self.table.document_length() * zoom
    }

    /// Fit-adjusted size at zoom 1, zero for an invalid page.
    pub fn page_size(&self, page: u32) -> SizeF {
        self.page(page).map_or(SizeF::ZERO, |geometry| geometry.scaled)
    }

    /// True when the page exists and resolves to a document page.
    pub fn is_valid_page(&self, page: u32) -> bool {
        self.page(page).is_some()
    }

    pub fn original_page_size(&self, page: u32) -> SizeF {
        self.page(page).map_or(SizeF::ZERO, |geometry| geometry.original)
    }

    pub fn scaled_page_size(&self, page: u32, zoom: f32) -> SizeF {
        self.page_size(page).scaled(zoom)
    }

    /// The page that bounds the content across the scroll axis.
    pub fn max_page_size(&self) -> SizeF {
        match self.axis() {
            ScrollAxis::Vertical => self.table.max_width_page(),
            ScrollAxis::Horizontal => self.table.max_height_page(),
        }
    }
}
