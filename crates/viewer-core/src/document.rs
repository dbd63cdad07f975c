//! An opened document: page source, user page order and the opened-pages table.
//!
//! Opening a page is memoized per document page under one mutex, so the
//! scheduling path and render workers can both ask for a page without racing
//! on the underlying source.

use crate::error::{ViewerError, ViewerResult};
use crate::geometry::SizeF;
use crate::mapping::UserPageMapping;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Backend that knows the document's pages, e.g. a PDF library binding.
pub trait PageSource {
    fn page_count(&self) -> u32;

    /// Original size of a document page in page-native units.
    fn page_size(&self, doc_page: u32) -> SizeF;

    /// Prepare a document page for rendering.
    fn open_page(&self, doc_page: u32) -> ViewerResult<()>;
}

/// Outcome of the first attempt to open a document page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    Opened,
    Failed(String),
}

pub struct Document<S> {
    source: S,
    mapping: Option<UserPageMapping>,
    page_count: u32,
    pages: Mutex<HashMap<u32, PageState>>,
}

impl<S: PageSource> Document<S> {
    pub fn new(source: S) -> Self {
        let page_count = source.page_count();
        Self {
            source,
            mapping: None,
            page_count,
            pages: Mutex::new(HashMap::new()),
        }
    }

    /// Show the document's pages in a custom order.
    pub fn with_mapping(source: S, mapping: UserPageMapping) -> Self {
        let page_count = u32::try_from(mapping.len()).unwrap_or(u32::MAX);
        Self {
            source,
            mapping: Some(mapping),
            page_count,
            pages: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of logical pages.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Document page shown at a logical index.
    pub fn document_page(&self, page: i64) -> Option<u32> {
        let doc_page = match &self.mapping {
            Some(mapping) => mapping.resolve(page)?,
            None => u32::try_from(page).ok()?,
        };
        if page >= i64::from(self.page_count) || doc_page >= self.source.page_count() {
            return None;
        }
        Some(doc_page)
    }

    /// Clamp any page number into the valid logical range.
    pub fn determine_valid_page_number(&self, page: i64) -> u32 {
        if page <= 0 || self.page_count == 0 {
            return 0;
        }
        let last = self.page_count - 1;
        u32::try_from(page).map_or(last, |page| page.min(last))
    }

    /// Original sizes in logical order, `None` where the page does not resolve.
    pub fn original_page_sizes(&self) -> Vec<Option<SizeF>> {
        (0..self.page_count)
            .map(|page| {
                self.document_page(i64::from(page))
                    .map(|doc_page| self.source.page_size(doc_page))
            })
            .collect()
    }

    /// Open the page at a logical index once.
    ///
    /// Later calls return the memoized outcome without touching the source.
    pub fn open_page(&self, page: u32) -> ViewerResult<()> {
        let doc_page = self
            .document_page(i64::from(page))
            .ok_or(ViewerError::InvalidPageIndex(i64::from(page)))?;

        let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        match pages.get(&doc_page) {
            Some(PageState::Opened) => Ok(()),
            Some(PageState::Failed(reason)) => Err(ViewerError::PageOpen {
                page: doc_page,
                reason: reason.clone(),
            }),
            None => match self.source.open_page(doc_page) {
                Ok(()) => {
                    pages.insert(doc_page, PageState::Opened);
                    Ok(())
                }
                Err(err) => {
                    let reason = match &err {
                        ViewerError::PageOpen { reason, .. } => reason.clone(),
                        other => other.to_string(),
                    };
                    log::warn!(
                        "page {} (document page {}) failed to open: {}",
                        page,
                        doc_page,
                        reason
                    );
                    pages.insert(doc_page, PageState::Failed(reason.clone()));
                    Err(ViewerError::PageOpen {
                        page: doc_page,
                        reason,
                    })
                }
            },
        }
    }

    /// True unless the page has been opened successfully.
    pub fn page_has_error(&self, page: u32) -> bool {
        let Some(doc_page) = self.document_page(i64::from(page)) else {
            return true;
        };
        let pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        !matches!(pages.get(&doc_page), Some(PageState::Opened))
    }

    /// True when an earlier open attempt failed.
    pub fn page_failed(&self, page: u32) -> bool {
        let Some(doc_page) = self.document_page(i64::from(page)) else {
            return false;
        };
        let pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(pages.get(&doc_page), Some(PageState::Failed(_)))
    }

    /// Forget a failed open so the next `open_page` retries it.
    pub fn clear_page_error(&self, page: u32) -> bool {
        let Some(doc_page) = self.document_page(i64::from(page)) else {
            return false;
        };
        let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(pages.get(&doc_page), Some(PageState::Failed(_))) {
            pages.remove(&doc_page);
            true
        } else {
            false
        }
    }
}

impl<S> std::fmt::Debug for Document<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("page_count", &self.page_count)
            .field("mapping", &self.mapping)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutEngine, LayoutParams};
    use crate::mapper::ViewportMapper;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    /// In-memory source counting how often each page is opened.
    struct FakeSource {
        sizes: Vec<SizeF>,
        broken: HashSet<u32>,
        opens: AtomicUsize,
    }

    impl FakeSource {
        fn new(sizes: Vec<SizeF>) -> Self {
            Self {
                sizes,
                broken: HashSet::new(),
                opens: AtomicUsize::new(0),
            }
        }
    }

    impl PageSource for FakeSource {
        fn page_count(&self) -> u32 {
            self.sizes.len() as u32
        }

        fn page_size(&self, doc_page: u32) -> SizeF {
            self.sizes[doc_page as usize]
        }

        fn open_page(&self, doc_page: u32) -> ViewerResult<()> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.broken.contains(&doc_page) {
                Err(ViewerError::PageOpen {
                    page: doc_page,
                    reason: "corrupt page".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn sizes(count: usize) -> Vec<SizeF> {
        (0..count)
            .map(|i| SizeF::new(100.0 + i as f32, 200.0))
            .collect()
    }

    #[test]
    fn test_opening_is_memoized() {
        let doc = Document::new(FakeSource::new(sizes(3)));
        assert!(doc.page_has_error(1));
        assert!(doc.open_page(1).is_ok());
        assert!(doc.open_page(1).is_ok());
        assert_eq!(doc.source().opens.load(Ordering::SeqCst), 1);
        assert!(!doc.page_has_error(1));
    }

    #[test]
    fn test_invalid_page_is_rejected() {
        let doc = Document::new(FakeSource::new(sizes(2)));
        assert_eq!(doc.open_page(5), Err(ViewerError::InvalidPageIndex(5)));
        assert_eq!(doc.document_page(-1), None);
        assert_eq!(doc.source().opens.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failures_are_memoized_until_cleared() {
        let mut source = FakeSource::new(sizes(2));
        source.broken.insert(0);
        let doc = Document::new(source);

        assert!(matches!(doc.open_page(0), Err(ViewerError::PageOpen { page: 0, .. })));
        assert!(doc.open_page(0).is_err());
        assert_eq!(doc.source().opens.load(Ordering::SeqCst), 1);
        assert!(doc.page_failed(0));

        assert!(doc.clear_page_error(0));
        assert!(!doc.page_failed(0));
        assert!(doc.open_page(0).is_err());
        assert_eq!(doc.source().opens.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_mapping_drives_page_lookup() {
        let mapping = UserPageMapping::new(&[0, 2, 2, 8, 8, 1, 1, 1], 3);
        let doc = Document::with_mapping(FakeSource::new(sizes(3)), mapping);

        assert_eq!(doc.page_count(), 8);
        assert_eq!(doc.document_page(1), Some(2));
        assert_eq!(doc.document_page(3), None);
        assert_eq!(doc.document_page(8), None);

        let original = doc.original_page_sizes();
        assert_eq!(original.len(), 8);
        assert_eq!(original[1], Some(SizeF::new(102.0, 200.0)));
        assert_eq!(original[3], None);

        // Logical pages 1 and 2 share a document page.
        assert!(doc.open_page(1).is_ok());
        assert!(doc.open_page(2).is_ok());
        assert_eq!(doc.source().opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unresolved_mapping_entry_has_no_offset() {
        let mapping = UserPageMapping::new(&[0, 8, 1], 3);
        let doc = Document::with_mapping(FakeSource::new(sizes(3)), mapping);
        let engine = LayoutEngine::new(LayoutParams::default().with_spacing(10.0));
        let mapper = ViewportMapper::new(
            engine.recompute(SizeF::new(300.0, 600.0), &doc.original_page_sizes()),
        );

        assert_eq!(doc.document_page(1), None);
        assert_eq!(mapper.page_offset(1, 1.0), 0.0);
        assert_eq!(mapper.page_length(1, 1.0), 0.0);
        assert!(mapper.page_offset(2, 1.0) > 0.0);
    }

    #[test]
    fn test_valid_page_number_is_clamped() {
        let doc = Document::new(FakeSource::new(sizes(4)));
        assert_eq!(doc.determine_valid_page_number(-2), 0);
        assert_eq!(doc.determine_valid_page_number(2), 2);
        assert_eq!(doc.determine_valid_page_number(9), 3);

        let empty = Document::new(FakeSource::new(Vec::new()));
        assert_eq!(empty.determine_valid_page_number(3), 0);
    }

    #[test]
    fn test_concurrent_opens_hit_source_once() {
        let doc = Arc::new(Document::new(FakeSource::new(sizes(4))));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let doc = Arc::clone(&doc);
                thread::spawn(move || {
                    for page in 0..4 {
                        doc.open_page(page).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(doc.source().opens.load(Ordering::SeqCst), 4);
    }
}
