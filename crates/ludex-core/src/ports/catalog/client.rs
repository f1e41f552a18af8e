//! Remote catalog port trait.

use super::error::CatalogResult;
use crate::domain::CatalogEntry;
use async_trait::async_trait;

/// Port trait for remote game catalog operations.
///
/// This trait defines the interface that the core domain uses to query the
/// remote catalog. The implementation lives in `ludex-igdb`.
///
/// # Design
///
/// - Uses core-owned `CatalogEntry`, not wire types
/// - Returns `CatalogError` for all failures
/// - Calls may be slow or fail; callers wrap them in the circuit breaker and
///   a deadline
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Search entries by name.
    async fn search_by_name(&self, term: &str, limit: usize) -> CatalogResult<Vec<CatalogEntry>>;

    /// Get a single entry by external id. `Ok(None)` when it doesn't exist.
    async fn get_by_id(&self, id: i64) -> CatalogResult<Option<CatalogEntry>>;

    /// Get many entries by external id. Missing ids are simply absent from
    /// the result.
    async fn get_by_ids(&self, ids: &[i64]) -> CatalogResult<Vec<CatalogEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // Verify the trait is object-safe
    fn _assert_object_safe(_: Arc<dyn CatalogPort>) {}
}
