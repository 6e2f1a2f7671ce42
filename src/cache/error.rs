use super::CacheState;
use thiserror::Error;

/// Outcome of a failed catalog operation.
///
/// `NotFound` and `Conflict` are expected results for callers to act on.
/// `DependencyFailure` means the durable store failed and no index was touched.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Durable store error: {0}")]
    DependencyFailure(#[from] anyhow::Error),

    #[error("Catalog is not ready (state: {0})")]
    NotReady(CacheState),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub(crate) fn song_not_found(id: i64) -> Self {
        CatalogError::NotFound(format!("song {}", id))
    }

    pub(crate) fn artist_not_found(id: i64) -> Self {
        CatalogError::NotFound(format!("artist {}", id))
    }

    pub(crate) fn user_not_found(id: i64) -> Self {
        CatalogError::NotFound(format!("user {}", id))
    }
}
