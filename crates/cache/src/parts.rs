//! In-memory cache of rendered page parts and thumbnails.
//!
//! Parts live in two sets. The *active* set holds parts requested by the
//! current scheduling pass; the *passive* set holds everything from earlier
//! passes. A new pass starts with [`PartCache::make_new_set`], and every part
//! the pass asks for again is promoted back into the active set. Under
//! pressure passive parts are evicted first, highest priority order first.

use crate::config::CacheConfig;
use pagestrip_viewer_core::RectF;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A rendered rectangle of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePart {
    pub page: u32,
    /// Page-relative rectangle this part covers.
    pub bounds: RectF,
    /// Rendered size in pixels.
    pub width: u32,
    pub height: u32,
    /// Raw pixel data (RGBA format)
    pub pixels: Vec<u8>,
    pub thumbnail: bool,
    /// Priority order, lower is more important.
    pub cache_order: u32,
}

impl PagePart {
    pub fn new(page: u32, bounds: RectF, width: u32, height: u32, cache_order: u32) -> Self {
        Self {
            page,
            bounds,
            width,
            height,
            pixels: Vec::new(),
            thumbnail: false,
            cache_order,
        }
    }

    pub fn thumbnail(page: u32, width: u32, height: u32) -> Self {
        Self {
            thumbnail: true,
            ..Self::new(page, RectF::FULL, width, height, 0)
        }
    }

    pub fn with_pixels(mut self, pixels: Vec<u8>) -> Self {
        self.pixels = pixels;
        self
    }

    fn covers(&self, page: u32, bounds: &RectF) -> bool {
        self.page == page && self.bounds.key() == bounds.key()
    }
}

/// Statistics about cache usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub active_parts: usize,
    pub passive_parts: usize,
    pub thumbnails: usize,
    pub part_capacity: usize,
    /// Lookups that found the part.
    pub hits: u64,
    /// Lookups that did not.
    pub misses: u64,
    /// Parts and thumbnails dropped to make room.
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate in `[0, 1]`.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn part_count(&self) -> usize {
        self.active_parts + self.passive_parts
    }
}

struct CacheState {
    active: Vec<PagePart>,
    passive: Vec<PagePart>,
    thumbnails: VecDeque<PagePart>,
    part_capacity: usize,
    thumbnail_capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheState {
    fn new(config: &CacheConfig) -> Self {
        Self {
            active: Vec::new(),
            passive: Vec::new(),
            thumbnails: VecDeque::new(),
            part_capacity: config.part_capacity,
            thumbnail_capacity: config.thumbnail_capacity,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn part_count(&self) -> usize {
        self.active.len() + self.passive.len()
    }

    /// Index of the least important part of a set.
    fn lowest_priority(parts: &[PagePart]) -> Option<usize> {
        parts
            .iter()
            .enumerate()
            .max_by_key(|(_, part)| part.cache_order)
            .map(|(index, _)| index)
    }

    /// Evict until one more part fits.
    fn make_free_space(&mut self) {
        while self.part_count() >= self.part_capacity {
            let evicted = if let Some(index) = Self::lowest_priority(&self.passive) {
                self.passive.swap_remove(index)
            } else if let Some(index) = Self::lowest_priority(&self.active) {
                self.active.swap_remove(index)
            } else {
                break;
            };
            log::trace!(
                "evicted part of page {} (order {})",
                evicted.page,
                evicted.cache_order
            );
            self.evictions += 1;
        }
    }

    fn remove_existing(&mut self, page: u32, bounds: &RectF) {
        self.active.retain(|part| !part.covers(page, bounds));
        self.passive.retain(|part| !part.covers(page, bounds));
    }
}

/// Thread-safe part and thumbnail cache.
///
/// # Example
///
/// ```
/// use pagestrip_cache::{CacheConfig, PagePart, PartCache};
/// use pagestrip_viewer_core::RectF;
///
/// let cache = PartCache::new(&CacheConfig::default());
/// let bounds = RectF::new(0.0, 0.0, 0.5, 0.5);
/// cache.cache_part(PagePart::new(0, bounds, 256, 256, 1));
///
/// // Next pass: the part is still there and gets a new order.
/// cache.make_new_set();
/// assert!(cache.up_part_if_contained(0, &bounds, 3));
/// ```
#[derive(Clone)]
pub struct PartCache {
    state: Arc<Mutex<CacheState>>,
}

impl PartCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::new(config))),
        }
    }

    pub fn with_capacity(part_capacity: usize, thumbnail_capacity: usize) -> Self {
        Self::new(&CacheConfig::new(part_capacity, thumbnail_capacity))
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new pass: everything becomes passive.
    pub fn make_new_set(&self) {
        let mut state = self.lock();
        let active = std::mem::take(&mut state.active);
        state.passive.extend(active);
    }

    /// Store a freshly rendered part in the active set.
    ///
    /// A part covering the same rectangle of the same page is replaced.
    pub fn cache_part(&self, part: PagePart) {
        let mut state = self.lock();
        if state.part_capacity == 0 {
            return;
        }
        state.remove_existing(part.page, &part.bounds);
        state.make_free_space();
        state.active.push(part);
    }

    /// Promote a cached part to the current pass with a new order.
    ///
    /// Returns true when the part is cached, whether it was passive or
    /// already active.
    pub fn up_part_if_contained(&self, page: u32, bounds: &RectF, order: u32) -> bool {
        let mut state = self.lock();
        if let Some(index) = state.passive.iter().position(|part| part.covers(page, bounds)) {
            let mut part = state.passive.swap_remove(index);
            part.cache_order = order;
            state.active.push(part);
            state.hits += 1;
            return true;
        }
        if let Some(part) = state.active.iter_mut().find(|part| part.covers(page, bounds)) {
            part.cache_order = part.cache_order.min(order);
            state.hits += 1;
            return true;
        }
        state.misses += 1;
        false
    }

    /// Store a thumbnail, dropping the oldest ones beyond capacity.
    pub fn cache_thumbnail(&self, part: PagePart) {
        let mut state = self.lock();
        if state
            .thumbnails
            .iter()
            .any(|thumb| thumb.covers(part.page, &part.bounds))
        {
            return;
        }
        while !state.thumbnails.is_empty() && state.thumbnails.len() >= state.thumbnail_capacity {
            state.thumbnails.pop_front();
            state.evictions += 1;
        }
        if state.thumbnail_capacity > 0 {
            state.thumbnails.push_back(part);
        }
    }

    pub fn contains_thumbnail(&self, page: u32, bounds: &RectF) -> bool {
        self.lock()
            .thumbnails
            .iter()
            .any(|thumb| thumb.covers(page, bounds))
    }

    /// Parts of one page, passive first so active parts draw on top.
    pub fn page_parts(&self, page: u32) -> Vec<PagePart> {
        let state = self.lock();
        state
            .passive
            .iter()
            .chain(state.active.iter())
            .filter(|part| part.page == page)
            .cloned()
            .collect()
    }

    /// Parts requested by the current pass, most important first.
    pub fn active_parts(&self) -> Vec<PagePart> {
        let mut parts = self.lock().active.clone();
        parts.sort_by_key(|part| part.cache_order);
        parts
    }

    pub fn thumbnails(&self) -> Vec<PagePart> {
        self.lock().thumbnails.iter().cloned().collect()
    }

    /// Number of cached parts, thumbnails excluded.
    pub fn len(&self) -> usize {
        self.lock().part_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every part and thumbnail.
    pub fn recycle(&self) {
        let mut state = self.lock();
        state.active.clear();
        state.passive.clear();
        state.thumbnails.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            active_parts: state.active.len(),
            passive_parts: state.passive.len(),
            thumbnails: state.thumbnails.len(),
            part_capacity: state.part_capacity,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
        }
    }
}

impl Default for PartCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl std::fmt::Debug for PartCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartCache")
            .field("stats", &self.stats())
            .finish()
    }
}
