//! Pagestrip Viewer Core
//!
//! Layout and navigation for long, zoomable, paginated documents shown as one
//! continuous strip. Pages of mixed sizes are fitted to the viewport, laid out
//! along a single scroll axis, and queried by offset or by page.
//!
//! # Example
//!
//! ```
//! use pagestrip_viewer_core::{LayoutEngine, LayoutParams, SizeF, ViewportMapper};
//!
//! let engine = LayoutEngine::new(LayoutParams::default().with_spacing(10.0));
//! let pages = [SizeF::new(100.0, 200.0), SizeF::new(150.0, 100.0)];
//! let table = engine.recompute(SizeF::new(300.0, 600.0), &pages);
//!
//! let mapper = ViewportMapper::new(table);
//! assert_eq!(mapper.page_offset(1, 1.0), 410.0);
//! assert_eq!(mapper.page_at_offset(415.0, 1.0), 1);
//! ```

pub mod document;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod layout;
pub mod mapper;
pub mod mapping;
pub mod viewport;

pub use document::{Document, PageSource, PageState};
pub use error::{ViewerError, ViewerResult};
pub use fit::{FitPolicy, PageSizeCalculator};
pub use geometry::{RectF, ScrollAxis, SizeF};
pub use layout::{LayoutEngine, LayoutParams, PageGeometry, PageGeometryTable};
pub use mapper::ViewportMapper;
pub use mapping::UserPageMapping;
pub use viewport::{page_at_position_offset, ScrollDir, Viewport, ZoomLimits};
