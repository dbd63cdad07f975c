/// Errors surfaced by the document side of the viewer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    #[error("page index {0} does not resolve to a document page")]
    InvalidPageIndex(i64),
    #[error("failed to open page {page}: {reason}")]
    PageOpen { page: u32, reason: String },
}

pub type ViewerResult<T> = Result<T, ViewerError>;
