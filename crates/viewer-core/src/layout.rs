//! Document layout along a single scroll axis.
//!
//! [`PageGeometryTable::compute`] is a pure function of the viewport size, the
//! original page sizes and [`LayoutParams`]. [`LayoutEngine`] owns the current
//! table and swaps in a fresh one on every recompute, so readers always hold a
//! complete snapshot.

use crate::fit::{FitPolicy, PageSizeCalculator};
use crate::geometry::{ScrollAxis, SizeF};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Inputs to the layout besides page and viewport sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub fit_policy: FitPolicy,
    /// Pad every page with the unused viewport space so it sits alone in the view.
    pub auto_spacing: bool,
    /// Fixed gap between pages, in pixels at zoom 1.
    pub spacing_px: f32,
    pub axis: ScrollAxis,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            fit_policy: FitPolicy::Width,
            auto_spacing: false,
            spacing_px: 0.0,
            axis: ScrollAxis::Vertical,
        }
    }
}

impl LayoutParams {
    pub fn with_fit_policy(mut self, fit_policy: FitPolicy) -> Self {
        self.fit_policy = fit_policy;
        self
    }

    pub fn with_auto_spacing(mut self, auto_spacing: bool) -> Self {
        self.auto_spacing = auto_spacing;
        self
    }

    pub fn with_spacing(mut self, spacing_px: f32) -> Self {
        self.spacing_px = spacing_px.max(0.0);
        self
    }

    pub fn with_axis(mut self, axis: ScrollAxis) -> Self {
        self.axis = axis;
        self
    }
}

/// Geometry of one page at zoom 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub original: SizeF,
    pub scaled: SizeF,
    /// Start of the page along the scroll axis.
    pub offset: f32,
    /// Gap attributed to the page.
    pub spacing: f32,
    /// False when the logical page does not resolve to a document page.
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometryTable {
    pages: Vec<PageGeometry>,
    document_length: f32,
    max_width_page: SizeF,
    max_height_page: SizeF,
    axis: ScrollAxis,
}

impl PageGeometryTable {
    /// A table with no pages.
    pub fn empty(axis: ScrollAxis) -> Self {
        Self {
            pages: Vec::new(),
            document_length: 0.0,
            max_width_page: SizeF::ZERO,
            max_height_page: SizeF::ZERO,
            axis,
        }
    }

    /// Lay out `original` in logical order.
    ///
    /// Accepts plain sizes or `Option<SizeF>`; a `None` entry is a page that
    /// does not resolve and is laid out as a zero-sized, invalid row.
    pub fn compute<T>(viewport: SizeF, original: &[T], params: &LayoutParams) -> Self
    where
        T: Copy + Into<Option<SizeF>>,
    {
        if original.is_empty() {
            return Self::empty(params.axis);
        }

        let resolved: Vec<Option<SizeF>> = original.iter().map(|size| (*size).into()).collect();
        let original: Vec<SizeF> = resolved
            .iter()
            .map(|size| size.unwrap_or(SizeF::ZERO))
            .collect();

        let axis = params.axis;
        let count = original.len();

        let mut original_max_width = SizeF::ZERO;
        let mut original_max_height = SizeF::ZERO;
        for size in &original {
            if size.width > original_max_width.width {
                original_max_width = *size;
            }
            if size.height > original_max_height.height {
                original_max_height = *size;
            }
        }

        let calculator = PageSizeCalculator::new(
            params.fit_policy,
            original_max_width,
            original_max_height,
            viewport,
        );
        let scaled: Vec<SizeF> = original.iter().map(|size| calculator.calculate(*size)).collect();

        let spacing: Vec<f32> = if params.auto_spacing {
            let viewport_length = viewport.primary(axis);
            scaled
                .iter()
                .enumerate()
                .map(|(index, size)| {
                    let mut gap = (viewport_length - size.primary(axis)).max(0.0);
                    if index + 1 < count {
                        gap += params.spacing_px;
                    }
                    gap
                })
                .collect()
        } else {
            vec![params.spacing_px; count]
        };

        let mut document_length = 0.0;
        for (index, size) in scaled.iter().enumerate() {
            document_length += size.primary(axis);
            if params.auto_spacing {
                document_length += spacing[index];
            } else if index + 1 < count {
                document_length += params.spacing_px;
            }
        }

        let mut pages = Vec::with_capacity(count);
        let mut cursor = 0.0;
        for index in 0..count {
            let length = scaled[index].primary(axis);
            let offset = if params.auto_spacing {
                cursor += spacing[index] / 2.0;
                if index == 0 {
                    cursor -= params.spacing_px / 2.0;
                } else if index == count - 1 {
                    cursor += params.spacing_px / 2.0;
                }
                let offset = cursor;
                cursor += length + spacing[index] / 2.0;
                offset
            } else {
                let offset = cursor;
                cursor += length + params.spacing_px;
                offset
            };

            pages.push(PageGeometry {
                original: original[index],
                scaled: scaled[index],
                offset,
                spacing: spacing[index],
                valid: resolved[index].is_some(),
            });
        }

        Self {
            pages,
            document_length,
            max_width_page: calculator.optimal_max_width_page(),
            max_height_page: calculator.optimal_max_height_page(),
            axis,
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, index: usize) -> Option<&PageGeometry> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[PageGeometry] {
        &self.pages
    }

    /// Length of the whole strip at zoom 1.
    pub fn document_length(&self) -> f32 {
        self.document_length
    }

    pub fn max_width_page(&self) -> SizeF {
        self.max_width_page
    }

    pub fn max_height_page(&self) -> SizeF {
        self.max_height_page
    }

    pub fn axis(&self) -> ScrollAxis {
        self.axis
    }
}

/// Owns the published geometry table.
#[derive(Debug)]
pub struct LayoutEngine {
    params: LayoutParams,
    current: RwLock<Arc<PageGeometryTable>>,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            params,
            current: RwLock::new(Arc::new(PageGeometryTable::empty(params.axis))),
        }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// Rebuild the table for a new viewport size and publish it.
    pub fn recompute<T>(&self, viewport: SizeF, original: &[T]) -> Arc<PageGeometryTable>
    where
        T: Copy + Into<Option<SizeF>>,
    {
        let table = Arc::new(PageGeometryTable::compute(viewport, original, &self.params));
        log::info!(
            "layout recomputed: {} pages, viewport {}x{}, length {}",
            table.len(),
            viewport.width,
            viewport.height,
            table.document_length()
        );
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&table);
        table
    }

    /// The most recently published table.
    pub fn snapshot(&self) -> Arc<PageGeometryTable> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn scenario_pages() -> Vec<SizeF> {
        vec![
            SizeF::new(100.0, 200.0),
            SizeF::new(150.0, 100.0),
            SizeF::new(100.0, 300.0),
        ]
    }

    #[test]
    fn test_fit_width_scenario_offsets() {
        let params = LayoutParams::default().with_spacing(10.0);
        let table =
            PageGeometryTable::compute(SizeF::new(300.0, 600.0), &scenario_pages(), &params);

        let heights: Vec<f32> = table.pages().iter().map(|p| p.scaled.height).collect();
        let offsets: Vec<f32> = table.pages().iter().map(|p| p.offset).collect();
        assert_eq!(heights, vec![400.0, 200.0, 600.0]);
        assert_eq!(offsets, vec![0.0, 410.0, 620.0]);
        assert_eq!(table.document_length(), 1220.0);
        assert_eq!(table.max_width_page(), SizeF::new(300.0, 200.0));
    }

    #[test]
    fn test_fixed_spacing_offsets_follow_lengths() {
        let params = LayoutParams::default().with_spacing(10.0);
        let table =
            PageGeometryTable::compute(SizeF::new(300.0, 600.0), &scenario_pages(), &params);
        for pair in table.pages().windows(2) {
            assert_eq!(pair[1].offset, pair[0].offset + pair[0].scaled.height + pair[0].spacing);
        }
    }

    #[test]
    fn test_empty_document_has_no_length() {
        let table = PageGeometryTable::compute::<SizeF>(
            SizeF::new(300.0, 600.0),
            &[],
            &LayoutParams::default(),
        );
        assert!(table.is_empty());
        assert_eq!(table.document_length(), 0.0);
    }

    #[test]
    fn test_single_page_length_is_page_length() {
        let params = LayoutParams::default().with_spacing(25.0);
        let table = PageGeometryTable::compute(
            SizeF::new(200.0, 400.0),
            &[SizeF::new(100.0, 100.0)],
            &params,
        );
        assert_eq!(table.document_length(), 200.0);
        assert_eq!(table.page(0).map(|p| p.offset), Some(0.0));
    }

    #[test]
    fn test_auto_spacing_centers_pages() {
        let params = LayoutParams::default()
            .with_fit_policy(FitPolicy::Both)
            .with_auto_spacing(true)
            .with_spacing(10.0);
        let viewport = SizeF::new(300.0, 600.0);
        let pages = vec![SizeF::new(300.0, 300.0), SizeF::new(300.0, 300.0)];
        let table = PageGeometryTable::compute(viewport, &pages, &params);

        // 300 unused pixels per page, plus the fixed gap on the first.
        assert_eq!(table.page(0).map(|p| p.spacing), Some(310.0));
        assert_eq!(table.page(1).map(|p| p.spacing), Some(300.0));
        assert_eq!(table.page(0).map(|p| p.offset), Some(150.0));
        assert_eq!(table.page(1).map(|p| p.offset), Some(760.0));
        assert_eq!(table.document_length(), 1210.0);
    }

    #[test]
    fn test_horizontal_axis_uses_widths() {
        let params = LayoutParams::default()
            .with_fit_policy(FitPolicy::Height)
            .with_axis(ScrollAxis::Horizontal)
            .with_spacing(4.0);
        let pages = vec![SizeF::new(100.0, 100.0), SizeF::new(200.0, 100.0)];
        let table = PageGeometryTable::compute(SizeF::new(800.0, 200.0), &pages, &params);
        assert_eq!(table.page(0).map(|p| p.scaled), Some(SizeF::new(200.0, 200.0)));
        assert_eq!(table.page(1).map(|p| p.offset), Some(204.0));
        assert_eq!(table.document_length(), 604.0);
    }

    #[test]
    fn test_offsets_never_decrease_for_random_documents() {
        let mut rng = rand::thread_rng();
        let policies = [
            FitPolicy::Width,
            FitPolicy::Height,
            FitPolicy::Both,
            FitPolicy::EachPage,
        ];

        for _ in 0..200 {
            let count = rng.gen_range(1..40);
            let pages: Vec<SizeF> = (0..count)
                .map(|_| SizeF::new(rng.gen_range(1.0..2000.0), rng.gen_range(1.0..2000.0)))
                .collect();
            let viewport = SizeF::new(rng.gen_range(100.0..2000.0), rng.gen_range(100.0..2000.0));
            let params = LayoutParams::default()
                .with_fit_policy(policies[rng.gen_range(0..policies.len())])
                .with_auto_spacing(rng.gen_bool(0.5))
                .with_spacing(rng.gen_range(0.0..50.0))
                .with_axis(if rng.gen_bool(0.5) {
                    ScrollAxis::Vertical
                } else {
                    ScrollAxis::Horizontal
                });

            let table = PageGeometryTable::compute(viewport, &pages, &params);
            for pair in table.pages().windows(2) {
                let length = pair[0].scaled.primary(params.axis);
                assert!(pair[1].offset >= pair[0].offset);
                assert!(pair[1].offset - pair[0].offset >= length - 0.1);
            }
        }
    }

    #[test]
    fn test_engine_publishes_new_snapshot() {
        let engine = LayoutEngine::new(LayoutParams::default().with_spacing(10.0));
        assert!(engine.snapshot().is_empty());

        let before = engine.recompute(SizeF::new(300.0, 600.0), &scenario_pages());
        let after = engine.recompute(SizeF::new(600.0, 300.0), &scenario_pages());

        assert_eq!(before.page(0).map(|p| p.scaled.height), Some(400.0));
        assert_eq!(after.page(0).map(|p| p.scaled.height), Some(800.0));
        assert!(Arc::ptr_eq(&engine.snapshot(), &after));
    }
}
