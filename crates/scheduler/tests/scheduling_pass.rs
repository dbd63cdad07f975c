use pagestrip_cache::{PagePart, PartCache};
use pagestrip_scheduler::{
    RenderExecutor, RenderQueue, RenderTask, RenderWorkerPool, SchedulerConfig, TileScheduler,
    WorkerPoolConfig,
};
use pagestrip_viewer_core::{
    Document, FitPolicy, LayoutEngine, LayoutParams, PageSource, ScrollAxis, SizeF, ViewerResult,
    Viewport, ViewportMapper,
};
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct FixedPages {
    sizes: Vec<SizeF>,
}

impl PageSource for FixedPages {
    fn page_count(&self) -> u32 {
        self.sizes.len() as u32
    }

    fn page_size(&self, doc_page: u32) -> SizeF {
        self.sizes[doc_page as usize]
    }

    fn open_page(&self, _doc_page: u32) -> ViewerResult<()> {
        Ok(())
    }
}

fn open(
    sizes: Vec<SizeF>,
    viewport: SizeF,
    params: LayoutParams,
) -> (Document<FixedPages>, ViewportMapper) {
    let document = Document::new(FixedPages { sizes });
    let engine = LayoutEngine::new(params);
    let table = engine.recompute(viewport, &document.original_page_sizes());
    (document, ViewportMapper::new(table))
}

fn three_pages() -> (Document<FixedPages>, ViewportMapper) {
    open(
        vec![
            SizeF::new(100.0, 200.0),
            SizeF::new(150.0, 100.0),
            SizeF::new(100.0, 300.0),
        ],
        SizeF::new(300.0, 600.0),
        LayoutParams::default().with_spacing(10.0),
    )
}

fn drain(queue: &RenderQueue) -> Vec<RenderTask> {
    std::iter::from_fn(|| queue.pop()).collect()
}

/// Stand-in for the rasterizer: store every task's result in the cache.
fn render_into(cache: &PartCache, task: &RenderTask) {
    let (width, height) = (task.width as u32, task.height as u32);
    if task.thumbnail {
        cache.cache_thumbnail(PagePart::thumbnail(task.page, width, height));
    } else {
        cache.cache_part(PagePart::new(
            task.page,
            task.bounds,
            width,
            height,
            task.cache_order,
        ));
    }
}

#[test]
fn test_fit_width_layout_matches_expected_offsets() {
    let (_, mapper) = three_pages();

    let heights: Vec<f32> = (0..3).map(|page| mapper.page_size(page).height).collect();
    assert_eq!(heights, vec![400.0, 200.0, 600.0]);

    let offsets: Vec<f32> = (0..3).map(|page| mapper.page_offset(page, 1.0)).collect();
    assert_eq!(offsets, vec![0.0, 410.0, 620.0]);

    assert_eq!(mapper.page_at_offset(415.0, 1.0), 1);
    assert_eq!(mapper.page_at_offset(0.0, 1.0), 0);
}

#[test]
fn test_single_page_viewport_gets_whole_grid() {
    let (document, mapper) = open(
        vec![SizeF::new(600.0, 800.0)],
        SizeF::new(600.0, 800.0),
        LayoutParams::default(),
    );
    let cache = PartCache::default();
    let queue = RenderQueue::new();
    let mut scheduler = TileScheduler::new(SchedulerConfig::default().with_preload_offset(0.0));

    let viewport = Viewport::new(600.0, 800.0);
    let report = scheduler.load_pages(&viewport, &mapper, &document, &cache, &queue);

    assert_eq!(report.ranges.len(), 1);
    let range = report.ranges[0];
    assert_eq!(range.page, 0);
    assert!(range.covers_grid());
    assert_eq!((range.grid.rows, range.grid.cols), (4, 3));
    assert_eq!(report.submitted, 12);
    assert_eq!(report.thumbnails_submitted, 1);
    assert_eq!(report.degenerate_cells, 0);
}

#[test]
fn test_cached_tiles_are_not_submitted_again() {
    let (document, mapper) = three_pages();
    let viewport = Viewport::new(300.0, 600.0);
    let cache = PartCache::default();
    let queue = RenderQueue::new();
    let mut scheduler = TileScheduler::default();

    cache.make_new_set();
    let first = scheduler.load_pages(&viewport, &mapper, &document, &cache, &queue);
    assert!(first.submitted > 0);
    for task in drain(&queue) {
        render_into(&cache, &task);
    }

    cache.make_new_set();
    let second = scheduler.load_pages(&viewport, &mapper, &document, &cache, &queue);
    assert_eq!(second.submitted, 0);
    assert_eq!(second.thumbnails_submitted, 0);
    assert_eq!(second.cache_hits, first.submitted);
    assert!(queue.is_empty());
}

#[test]
fn test_scrolling_only_requests_new_tiles() {
    let (document, mapper) = open(
        vec![SizeF::new(612.0, 792.0); 20],
        SizeF::new(612.0, 400.0),
        LayoutParams::default().with_spacing(8.0),
    );
    let mut viewport = Viewport::new(612.0, 400.0);
    let cache = PartCache::default();
    let queue = RenderQueue::new();
    let mut scheduler = TileScheduler::default();

    cache.make_new_set();
    scheduler.load_pages(&viewport, &mapper, &document, &cache, &queue);
    for task in drain(&queue) {
        render_into(&cache, &task);
    }

    viewport.move_relative_to(0.0, 300.0, &mapper);
    cache.make_new_set();
    let report = scheduler.load_pages(&viewport, &mapper, &document, &cache, &queue);

    assert!(report.cache_hits > 0);
    assert!(report.submitted > 0);
    let tasks = drain(&queue);
    assert!(tasks.iter().filter(|task| !task.thumbnail).all(|task| task.bounds.top >= 0.25));
}

#[test]
fn test_budget_is_never_exceeded() {
    let mut rng = rand::thread_rng();
    let policies = [
        FitPolicy::Width,
        FitPolicy::Height,
        FitPolicy::Both,
        FitPolicy::EachPage,
    ];

    for _ in 0..150 {
        let count = rng.gen_range(1..30);
        let sizes: Vec<SizeF> = (0..count)
            .map(|_| SizeF::new(rng.gen_range(50.0..1500.0), rng.gen_range(50.0..1500.0)))
            .collect();
        let screen = SizeF::new(rng.gen_range(200.0..1600.0), rng.gen_range(200.0..1600.0));
        let axis = if rng.gen_bool(0.5) {
            ScrollAxis::Vertical
        } else {
            ScrollAxis::Horizontal
        };
        let params = LayoutParams::default()
            .with_fit_policy(policies[rng.gen_range(0..policies.len())])
            .with_auto_spacing(rng.gen_bool(0.3))
            .with_spacing(rng.gen_range(0.0..20.0))
            .with_axis(axis);
        let (document, mapper) = open(sizes, screen, params);

        let mut viewport = Viewport::new(screen.width, screen.height);
        viewport.zoom_to(rng.gen_range(1.0..3.0));
        let doc_len = mapper.doc_length(viewport.zoom);
        viewport.move_to(
            rng.gen_range(0.0..doc_len.max(1.0)),
            rng.gen_range(0.0..doc_len.max(1.0)),
            &mapper,
        );

        let budget = rng.gen_range(1..40);
        let config = SchedulerConfig::default()
            .with_pass_budget(budget)
            .with_tile_size(rng.gen_range(64.0..512.0));
        let mut scheduler = TileScheduler::new(config);
        let queue = RenderQueue::new();
        let cache = PartCache::default();

        let report = scheduler.load_pages(&viewport, &mapper, &document, &cache, &queue);
        let tasks = drain(&queue);
        let tiles: Vec<&RenderTask> = tasks.iter().filter(|task| !task.thumbnail).collect();

        assert!(tiles.len() <= budget);
        assert_eq!(tiles.len(), report.submitted);
        assert_eq!(report.budget_exhausted, report.submitted == budget);
        for task in tiles {
            assert!(task.width > 0.0 && task.height > 0.0);
            assert!(!task.bounds.is_empty());
            assert!(task.bounds.left >= 0.0 && task.bounds.top >= 0.0);
            assert!(task.bounds.right <= 1.0 && task.bounds.bottom <= 1.0);
            assert!(task.cache_order >= 1);
        }
    }
}

#[test]
fn test_worker_pool_fills_cache_for_next_pass() {
    let document = Arc::new(Document::new(FixedPages {
        sizes: vec![SizeF::new(612.0, 792.0); 5],
    }));
    let engine = LayoutEngine::new(LayoutParams::default().with_spacing(10.0));
    let mapper = ViewportMapper::new(engine.recompute(
        SizeF::new(800.0, 600.0),
        &document.original_page_sizes(),
    ));
    let viewport = Viewport::new(800.0, 600.0);

    let cache = PartCache::default();
    let queue = RenderQueue::new();
    let worker_cache = cache.clone();
    let executor: RenderExecutor =
        Arc::new(move |task: &RenderTask| render_into(&worker_cache, task));
    let pool = RenderWorkerPool::new(
        queue.clone(),
        document.clone(),
        executor,
        WorkerPoolConfig::new(2).with_poll_interval(Duration::from_millis(2)),
    )
    .unwrap();

    let mut scheduler = TileScheduler::default();
    cache.make_new_set();
    let first = scheduler.load_pages(&viewport, &mapper, document.as_ref(), &cache, &queue);

    let deadline = Instant::now() + Duration::from_secs(5);
    while (cache.len() < first.submitted || cache.thumbnails().len() < first.thumbnails_submitted)
        && Instant::now() < deadline
    {
        thread::sleep(Duration::from_millis(5));
    }
    pool.shutdown();

    cache.make_new_set();
    let second = scheduler.load_pages(&viewport, &mapper, document.as_ref(), &cache, &queue);
    assert_eq!(second.submitted, 0);
    assert_eq!(second.thumbnails_submitted, 0);
    assert!(!document.page_has_error(0));
}
