//! IGDB client for searching games and fetching them by id.

use crate::config::IgdbClientConfig;
use crate::error::IgdbResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::IgdbGame;
use crate::query::{self, MAX_LIMIT};
use ludex_core::CatalogEntry;
use tracing::debug;

const GAMES: &str = "games";

// ============================================================================
// Type Aliases
// ============================================================================

/// IGDB client using the reqwest HTTP backend.
pub type IgdbCatalog = IgdbClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the IGDB v4 API.
///
/// Generic over the HTTP backend so tests can inject a fake. Use
/// [`IgdbCatalog`] in production and talk to it through `CatalogPort`.
pub struct IgdbClient<B: HttpBackend> {
    pub(crate) backend: B,
}

impl IgdbCatalog {
    /// Create a new client with the given configuration.
    ///
    /// Fails when credentials are missing or the base URL does not parse.
    pub fn new(config: &IgdbClientConfig) -> IgdbResult<Self> {
        Ok(Self {
            backend: ReqwestBackend::new(config)?,
        })
    }
}

impl<B: HttpBackend> IgdbClient<B> {
    /// Create a new client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Name search. Returns at most `limit` entries, in IGDB's relevance
    /// order.
    pub(crate) async fn search_games(
        &self,
        term: &str,
        limit: usize,
    ) -> IgdbResult<Vec<CatalogEntry>> {
        let games: Vec<IgdbGame> = self
            .backend
            .post_query(GAMES, &query::search_games(term, limit))
            .await?;
        debug!(term, hits = games.len(), "IGDB search");
        Ok(games.into_iter().map(IgdbGame::into_entry).collect())
    }

    /// Fetch games by id, `MAX_LIMIT` ids per request. Unknown ids are
    /// absent from the result.
    pub(crate) async fn fetch_games(&self, ids: &[i64]) -> IgdbResult<Vec<CatalogEntry>> {
        let mut entries = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_LIMIT) {
            let games: Vec<IgdbGame> = self
                .backend
                .post_query(GAMES, &query::games_by_ids(chunk))
                .await?;
            entries.extend(games.into_iter().map(IgdbGame::into_entry));
        }
        Ok(entries)
    }
}

impl<B: HttpBackend> std::fmt::Debug for IgdbClient<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IgdbClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use serde_json::json;

    #[tokio::test]
    async fn test_search_sends_escaped_term() {
        let backend = FakeBackend::new().with_response(
            GAMES,
            CannedResponse::Json(json!([{"id": 1, "name": "Portal"}])),
        );
        let client = IgdbClient::with_backend(backend);

        let hits = client.search_games("\"portal\"", 5).await.unwrap();

        assert_eq!(hits.len(), 1);
        let (endpoint, body) = &client.backend.requests()[0];
        assert_eq!(endpoint, GAMES);
        assert!(body.contains(r#"search "\"portal\"";"#));
        assert!(body.contains("limit 5;"));
    }

    #[tokio::test]
    async fn test_fetch_splits_into_batches() {
        let backend = FakeBackend::new()
            .with_response(GAMES, CannedResponse::Json(json!([{"id": 1, "name": "A"}])))
            .with_response(GAMES, CannedResponse::Json(json!([{"id": 501, "name": "B"}])));
        let client = IgdbClient::with_backend(backend);
        let ids: Vec<i64> = (1..=501).collect();

        let entries = client.fetch_games(&ids).await.unwrap();

        assert_eq!(entries.len(), 2);
        let requests = client.backend.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].1.contains("limit 500;"));
        assert!(requests[1].1.contains("where id = (501);"));
    }
}
