//! User-supplied page order.

/// Maps logical page indices to document page indices.
///
/// Entries may repeat or reorder document pages. Entries that are negative or
/// outside the document are kept so logical indices stay stable, but they
/// resolve to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPageMapping {
    entries: Vec<Option<u32>>,
}

impl UserPageMapping {
    /// Build from caller input, dropping entries that cannot address a page of
    /// a `document_pages`-page document.
    pub fn new(entries: &[i64], document_pages: u32) -> Self {
        let entries = entries
            .iter()
            .map(|&entry| {
                u32::try_from(entry)
                    .ok()
                    .filter(|page| *page < document_pages)
            })
            .collect();
        Self { entries }
    }

    pub fn from_pages(pages: Vec<u32>) -> Self {
        Self {
            entries: pages.into_iter().map(Some).collect(),
        }
    }

    /// Document page for a logical index, `None` when either side is invalid.
    pub fn resolve(&self, logical: i64) -> Option<u32> {
        let index = usize::try_from(logical).ok()?;
        self.entries.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
