//! Pagestrip Scheduler Library
//!
//! Visible-region tile scheduling. Each pass finds the pages around the
//! viewport, cuts every page into a grid of render cells, and submits the
//! cells that are not cached yet, most important first, up to a fixed budget.
//! A reference render queue and worker pool execute the submitted tasks.
//!
//! # Example
//!
//! ```
//! use pagestrip_cache::PartCache;
//! use pagestrip_scheduler::{RenderQueue, SchedulerConfig, TileScheduler};
//! use pagestrip_viewer_core::{
//!     Document, LayoutEngine, LayoutParams, PageSource, SizeF, ViewerResult, Viewport,
//!     ViewportMapper,
//! };
//!
//! struct Letter;
//!
//! impl PageSource for Letter {
//!     fn page_count(&self) -> u32 {
//!         3
//!     }
//!     fn page_size(&self, _doc_page: u32) -> SizeF {
//!         SizeF::new(612.0, 792.0)
//!     }
//!     fn open_page(&self, _doc_page: u32) -> ViewerResult<()> {
//!         Ok(())
//!     }
//! }
//!
//! let document = Document::new(Letter);
//! let engine = LayoutEngine::new(LayoutParams::default().with_spacing(10.0));
//! let mapper = ViewportMapper::new(
//!     engine.recompute(SizeF::new(800.0, 600.0), &document.original_page_sizes()),
//! );
//!
//! let cache = PartCache::default();
//! let queue = RenderQueue::new();
//! let mut scheduler = TileScheduler::new(SchedulerConfig::default());
//!
//! cache.make_new_set();
//! let viewport = Viewport::new(800.0, 600.0);
//! let report = scheduler.load_pages(&viewport, &mapper, &document, &cache, &queue);
//! assert_eq!(report.submitted + report.thumbnails_submitted, queue.len());
//! ```

mod collab;
mod config;
mod loader;
mod queue;
mod range;
mod tile;
mod worker;

// Re-export public API
pub use collab::{PageOpener, RenderSink, RenderTask, TileCache};
pub use config::{ConfigError, SchedulerConfig};
pub use loader::{page_grid, PassReport, TileScheduler};
pub use queue::RenderQueue;
pub use range::{compute_render_ranges, RenderRange};
pub use tile::{Cell, GridSize, PartSize};
pub use worker::{RenderExecutor, RenderWorkerPool, SharedPages, WorkerPoolConfig};
