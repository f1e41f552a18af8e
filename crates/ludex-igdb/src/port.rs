//! Port trait implementation for `IgdbClient`.
//!
//! This module implements the core-owned `CatalogPort` trait for
//! `IgdbClient`, mapping internal errors to `CatalogError`.

use async_trait::async_trait;
use ludex_core::{CatalogEntry, CatalogError, CatalogPort, CatalogResult};

use crate::client::IgdbClient;
use crate::error::IgdbError;
use crate::http::HttpBackend;

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `IgdbError` to core `CatalogError`.
fn map_error(err: IgdbError) -> CatalogError {
    match err {
        IgdbError::ApiRequestFailed { status, endpoint } => match status {
            401 | 403 => CatalogError::AuthRequired {
                message: format!("IGDB rejected credentials with status {status}"),
            },
            404 => CatalogError::Configuration {
                message: format!("IGDB endpoint '{endpoint}' does not exist"),
            },
            429 => CatalogError::RateLimited,
            _ => CatalogError::Network {
                message: format!("IGDB request to {endpoint} failed with status {status}"),
            },
        },
        IgdbError::InvalidResponse { message } => CatalogError::InvalidResponse { message },
        IgdbError::Timeout { elapsed_ms } => CatalogError::Timeout { elapsed_ms },
        IgdbError::MissingCredentials => CatalogError::AuthRequired {
            message: "IGDB credentials are not configured".to_string(),
        },
        IgdbError::Network(e) => CatalogError::Network {
            message: e.to_string(),
        },
        IgdbError::InvalidUrl(e) => CatalogError::Configuration {
            message: e.to_string(),
        },
        IgdbError::JsonParse(e) => CatalogError::InvalidResponse {
            message: e.to_string(),
        },
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend> CatalogPort for IgdbClient<B> {
    async fn search_by_name(&self, term: &str, limit: usize) -> CatalogResult<Vec<CatalogEntry>> {
        if term.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        self.search_games(term, limit).await.map_err(map_error)
    }

    async fn get_by_id(&self, id: i64) -> CatalogResult<Option<CatalogEntry>> {
        let entries = self.fetch_games(&[id]).await.map_err(map_error)?;
        Ok(entries.into_iter().find(|e| e.id == id))
    }

    async fn get_by_ids(&self, ids: &[i64]) -> CatalogResult<Vec<CatalogEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_games(ids).await.map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn client(responses: Vec<CannedResponse>) -> IgdbClient<FakeBackend> {
        let backend = responses
            .into_iter()
            .fold(FakeBackend::new(), |b, r| b.with_response("games", r));
        IgdbClient::with_backend(backend)
    }

    #[test]
    fn test_status_mapping() {
        let status = |status| IgdbError::ApiRequestFailed {
            status,
            endpoint: "games".to_string(),
        };
        assert!(matches!(
            map_error(status(401)),
            CatalogError::AuthRequired { .. }
        ));
        assert!(matches!(
            map_error(status(403)),
            CatalogError::AuthRequired { .. }
        ));
        assert_eq!(map_error(status(429)), CatalogError::RateLimited);
        assert!(matches!(
            map_error(status(404)),
            CatalogError::Configuration { .. }
        ));
        assert!(map_error(status(502)).is_transient());
        assert!(!map_error(status(401)).is_transient());
        assert_eq!(
            map_error(IgdbError::Timeout { elapsed_ms: 900 }),
            CatalogError::Timeout { elapsed_ms: 900 }
        );
    }

    #[tokio::test]
    async fn test_get_by_id_found_and_missing() {
        let catalog = client(vec![
            CannedResponse::Json(json!([{"id": 1942, "name": "The Witcher 3"}])),
            CannedResponse::Json(json!([])),
        ]);

        let found = assert_ok!(catalog.get_by_id(1942).await);
        assert_eq!(found.map(|e| e.name), Some("The Witcher 3".to_string()));

        let missing = assert_ok!(catalog.get_by_id(1).await);
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_errors_are_mapped() {
        let catalog = client(vec![
            CannedResponse::Status(429),
            CannedResponse::Json(json!({"not": "a list"})),
        ]);

        let limited = assert_err!(catalog.search_by_name("doom", 10).await);
        assert_eq!(limited, CatalogError::RateLimited);

        let invalid = assert_err!(catalog.get_by_ids(&[1]).await);
        assert!(matches!(invalid, CatalogError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_blank_search_skips_the_network() {
        let catalog = client(Vec::new());
        assert!(assert_ok!(catalog.search_by_name("  ", 10).await).is_empty());
        assert!(assert_ok!(catalog.get_by_ids(&[]).await).is_empty());
        assert!(catalog.backend.requests().is_empty());
    }
}
