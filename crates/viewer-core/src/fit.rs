//! Page size fitting.
//!
//! Turns original page sizes into on-screen sizes for a given viewport. All
//! policies except [`FitPolicy::EachPage`] share one scale factor derived from
//! the document's widest and tallest pages, so relative page sizes survive.

use crate::geometry::SizeF;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitPolicy {
    /// The widest page fills the viewport width.
    #[default]
    Width,
    /// The tallest page fills the viewport height.
    Height,
    /// The largest page fits entirely inside the viewport.
    Both,
    /// Every page is fitted to the viewport on its own.
    EachPage,
}

/// Precomputed fitting state for one viewport size.
#[derive(Debug, Clone)]
pub struct PageSizeCalculator {
    policy: FitPolicy,
    viewport: SizeF,
    width_ratio: f32,
    height_ratio: f32,
    optimal_max_width_page: SizeF,
    optimal_max_height_page: SizeF,
}

impl PageSizeCalculator {
    /// `max_width_page` and `max_height_page` are the original sizes of the
    /// widest and the tallest page of the document.
    pub fn new(
        policy: FitPolicy,
        max_width_page: SizeF,
        max_height_page: SizeF,
        viewport: SizeF,
    ) -> Self {
        let mut calculator = Self {
            policy,
            viewport,
            width_ratio: 0.0,
            height_ratio: 0.0,
            optimal_max_width_page: SizeF::ZERO,
            optimal_max_height_page: SizeF::ZERO,
        };
        calculator.calculate_max_pages(max_width_page, max_height_page);
        calculator
    }

    fn calculate_max_pages(&mut self, max_width_page: SizeF, max_height_page: SizeF) {
        let viewport = self.viewport;
        match self.policy {
            FitPolicy::Height => {
                self.optimal_max_height_page = fit_height(max_height_page, viewport.height);
                self.height_ratio =
                    ratio(self.optimal_max_height_page.height, max_height_page.height);
                self.optimal_max_width_page = fit_height(
                    max_width_page,
                    max_width_page.height * self.height_ratio,
                );
            }
            FitPolicy::Both | FitPolicy::EachPage => {
                let local_max_width = fit_both(max_width_page, viewport.width, viewport.height);
                let local_width_ratio = ratio(local_max_width.width, max_width_page.width);
                self.optimal_max_height_page = fit_both(
                    max_height_page,
                    max_height_page.width * local_width_ratio,
                    viewport.height,
                );
                self.height_ratio =
                    ratio(self.optimal_max_height_page.height, max_height_page.height);
                self.optimal_max_width_page = fit_both(
                    max_width_page,
                    viewport.width,
                    max_width_page.height * self.height_ratio,
                );
                self.width_ratio = ratio(self.optimal_max_width_page.width, max_width_page.width);
            }
            FitPolicy::Width => {
                self.optimal_max_width_page = fit_width(max_width_page, viewport.width);
                self.width_ratio = ratio(self.optimal_max_width_page.width, max_width_page.width);
                self.optimal_max_height_page = fit_width(
                    max_height_page,
                    max_height_page.width * self.width_ratio,
                );
            }
        }
    }

    /// On-screen size of a page at zoom 1.
    pub fn calculate(&self, page: SizeF) -> SizeF {
        if page.is_degenerate() {
            return SizeF::ZERO;
        }

        let (max_width, max_height) = match self.policy {
            FitPolicy::EachPage => (self.viewport.width, self.viewport.height),
            _ => (page.width * self.width_ratio, page.height * self.height_ratio),
        };

        match self.policy {
            FitPolicy::Width => fit_width(page, max_width),
            FitPolicy::Height => fit_height(page, max_height),
            FitPolicy::Both | FitPolicy::EachPage => fit_both(page, max_width, max_height),
        }
    }

    /// Scaled size of the widest page.
    pub fn optimal_max_width_page(&self) -> SizeF {
        self.optimal_max_width_page
    }

    /// Scaled size of the tallest page.
    pub fn optimal_max_height_page(&self) -> SizeF {
        self.optimal_max_height_page
    }
}

fn ratio(scaled: f32, original: f32) -> f32 {
    if original > 0.0 && scaled.is_finite() {
        scaled / original
    } else {
        0.0
    }
}

fn fit_width(page: SizeF, max_width: f32) -> SizeF {
    if page.is_degenerate() {
        return SizeF::ZERO;
    }
    SizeF::new(max_width, (max_width * page.height / page.width).floor())
}

fn fit_height(page: SizeF, max_height: f32) -> SizeF {
    if page.is_degenerate() {
        return SizeF::ZERO;
    }
    SizeF::new((max_height * page.width / page.height).floor(), max_height)
}

fn fit_both(page: SizeF, max_width: f32, max_height: f32) -> SizeF {
    if page.is_degenerate() {
        return SizeF::ZERO;
    }
    let mut width = max_width;
    let mut height = (max_width * page.height / page.width).floor();
    if height > max_height {
        height = max_height;
        width = (max_height * page.width / page.height).floor();
    }
    SizeF::new(width, height)
}
