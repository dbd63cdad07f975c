//! Viewport navigation: scrolling, zooming and page jumps.
//!
//! Scroll offsets are document-space pixels at the current zoom, measured from
//! the start of the document. A negative offset means the content is smaller
//! than the viewport and is centered inside it.

use crate::geometry::ScrollAxis;
use crate::mapper::ViewportMapper;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Zoom bounds, plus the intermediate step used for double-tap zooming.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f32,
    pub mid: f32,
    pub max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 1.0,
            mid: 1.75,
            max: 3.0,
        }
    }
}

impl ZoomLimits {
    /// Limits with `min <= mid <= max`, swapping inverted bounds.
    pub fn normalized(&self) -> Self {
        let min = self.min.min(self.max);
        let max = self.min.max(self.max);
        Self {
            min,
            mid: self.mid.max(min).min(max),
            max,
        }
    }

    pub fn clamp(&self, zoom: f32) -> f32 {
        let limits = self.normalized();
        if !zoom.is_finite() {
            return limits.min;
        }
        zoom.max(limits.min).min(limits.max)
    }
}

/// Direction of the last primary-axis scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDir {
    #[default]
    None,
    /// Toward the beginning of the document.
    Start,
    /// Toward the end of the document.
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub zoom: f32,
    pub limits: ZoomLimits,
    pub scroll_dir: ScrollDir,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
            zoom: 1.0,
            limits: ZoomLimits::default(),
            scroll_dir: ScrollDir::None,
        }
    }

    pub fn with_limits(mut self, limits: ZoomLimits) -> Self {
        let limits = limits.normalized();
        self.limits = limits;
        self.zoom = limits.clamp(self.zoom);
        self
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// `(primary, cross)` viewport lengths.
    pub fn lengths(&self, axis: ScrollAxis) -> (f32, f32) {
        axis.split(self.width, self.height)
    }

    /// `(primary, cross)` scroll offsets.
    pub fn scroll(&self, axis: ScrollAxis) -> (f32, f32) {
        axis.split(self.scroll_x, self.scroll_y)
    }

    fn set_scroll(&mut self, axis: ScrollAxis, primary: f32, cross: f32) {
        let (x, y) = axis.join(primary, cross);
        self.scroll_x = x;
        self.scroll_y = y;
    }

    /// Scroll to an absolute position, clamped to the content.
    pub fn move_to(&mut self, x: f32, y: f32, mapper: &ViewportMapper) {
        let axis = mapper.axis();
        let (primary_len, cross_len) = self.lengths(axis);
        let (old_primary, _) = self.scroll(axis);
        let (primary, cross) = axis.split(x, y);

        let content_cross = self.to_current_scale(mapper.max_page_size().cross(axis));
        let cross = clamp_or_center(cross, content_cross, cross_len);

        let doc_len = mapper.doc_length(self.zoom);
        let primary = clamp_or_center(primary, doc_len, primary_len);

        self.scroll_dir = if primary > old_primary {
            ScrollDir::End
        } else if primary < old_primary {
            ScrollDir::Start
        } else {
            ScrollDir::None
        };
        self.set_scroll(axis, primary, cross);
    }

    pub fn move_relative_to(&mut self, dx: f32, dy: f32, mapper: &ViewportMapper) {
        self.move_to(self.scroll_x + dx, self.scroll_y + dy, mapper);
    }

    /// Scroll progress along the primary axis in `[0, 1]`.
    pub fn position_offset(&self, mapper: &ViewportMapper) -> f32 {
        let axis = mapper.axis();
        let (primary, _) = self.scroll(axis);
        let (primary_len, _) = self.lengths(axis);
        let scrollable = mapper.doc_length(self.zoom) - primary_len;
        if scrollable <= 0.0 {
            return 0.0;
        }
        (primary / scrollable).clamp(0.0, 1.0)
    }

    pub fn set_position_offset(&mut self, progress: f32, mapper: &ViewportMapper) {
        let axis = mapper.axis();
        let (_, cross) = self.scroll(axis);
        let (primary_len, _) = self.lengths(axis);
        let scrollable = (mapper.doc_length(self.zoom) - primary_len).max(0.0);
        let (x, y) = axis.join(scrollable * progress.clamp(0.0, 1.0), cross);
        self.move_to(x, y, mapper);
    }

    /// Set the zoom level without moving the scroll offsets.
    pub fn zoom_to(&mut self, zoom: f32) {
        self.zoom = self.limits.clamp(zoom);
    }

    /// Zoom so the document point under the pivot stays under the pivot.
    ///
    /// The pivot is given in viewport coordinates.
    pub fn zoom_centered_to(
        &mut self,
        zoom: f32,
        pivot_x: f32,
        pivot_y: f32,
        mapper: &ViewportMapper,
    ) {
        let old_zoom = self.zoom;
        self.zoom_to(zoom);
        if old_zoom <= 0.0 {
            return;
        }
        let factor = self.zoom / old_zoom;
        let x = (self.scroll_x + pivot_x) * factor - pivot_x;
        let y = (self.scroll_y + pivot_y) * factor - pivot_y;
        self.move_to(x, y, mapper);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom_to(self.limits.normalized().min);
    }

    /// Scroll so the given page starts at the top (or left) edge.
    pub fn jump_to(&mut self, page: u32, mapper: &ViewportMapper) {
        let count = mapper.page_count();
        if count == 0 {
            return;
        }
        let page = page.min(count - 1);
        let axis = mapper.axis();
        let (_, cross) = self.scroll(axis);
        let (x, y) = axis.join(mapper.page_offset(page, self.zoom), cross);
        self.move_to(x, y, mapper);
    }

    /// Page under the center of the viewport.
    pub fn current_page(&self, mapper: &ViewportMapper) -> u32 {
        let axis = mapper.axis();
        let (primary, _) = self.scroll(axis);
        let (primary_len, _) = self.lengths(axis);
        mapper.page_at_offset(primary + primary_len / 2.0, self.zoom)
    }

    /// Pages intersecting the viewport, `None` for an empty document.
    pub fn visible_pages(&self, mapper: &ViewportMapper) -> Option<RangeInclusive<u32>> {
        if mapper.page_count() == 0 {
            return None;
        }
        let axis = mapper.axis();
        let (primary, _) = self.scroll(axis);
        let (primary_len, _) = self.lengths(axis);
        let first = mapper.page_at_offset(primary.max(0.0), self.zoom);
        let last = mapper.page_at_offset(primary + primary_len, self.zoom).max(first);
        Some(first..=last)
    }

    /// True when the whole document is shorter than the viewport at zoom 1.
    pub fn document_fits_view(&self, mapper: &ViewportMapper) -> bool {
        let (primary_len, _) = self.lengths(mapper.axis());
        mapper.doc_length(1.0) < primary_len
    }

    pub fn to_current_scale(&self, size: f32) -> f32 {
        size * self.zoom
    }

    pub fn to_real_scale(&self, size: f32) -> f32 {
        if self.zoom == 0.0 {
            return size;
        }
        size / self.zoom
    }
}

/// Page shown at a scroll progress in `[0, 1]`.
pub fn page_at_position_offset(progress: f32, page_count: u32) -> u32 {
    if page_count == 0 {
        return 0;
    }
    let page = (page_count as f32 * progress.clamp(0.0, 1.0)).floor() as u32;
    page.min(page_count - 1)
}

fn clamp_or_center(offset: f32, content: f32, viewport: f32) -> f32 {
    if content < viewport {
        -(viewport - content) / 2.0
    } else {
        offset.clamp(0.0, content - viewport)
    }
}
