//! Internal API response types for IGDB.
//!
//! These types are internal to `ludex-igdb` and are not exposed to consumers.
//! External consumers see `CatalogEntry` from `ludex-core`.

use ludex_core::{CatalogCategory, CatalogEntry, InvolvedCompany};
use serde::Deserialize;

/// Any expanded reference that carries a name (`genres.name`, `franchises.name`…).
#[derive(Debug, Clone, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub name: Option<String>,
}

/// An expanded image reference (`cover.url`, `screenshots.url`).
#[derive(Debug, Clone, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgdbInvolvedCompany {
    #[serde(default)]
    pub company: Option<Named>,
    #[serde(default)]
    pub developer: bool,
    #[serde(default)]
    pub publisher: bool,
}

/// A game object as returned by `POST /games`.
///
/// Every field except `id` may be absent, depending on what the record has.
#[derive(Debug, Clone, Deserialize)]
pub struct IgdbGame {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub storyline: Option<String>,
    #[serde(default)]
    pub cover: Option<ImageRef>,
    #[serde(default)]
    pub first_release_date: Option<i64>,
    #[serde(default)]
    pub genres: Vec<Named>,
    #[serde(default)]
    pub platforms: Vec<Named>,
    #[serde(default)]
    pub involved_companies: Vec<IgdbInvolvedCompany>,
    #[serde(default)]
    pub screenshots: Vec<ImageRef>,
    #[serde(default)]
    pub aggregated_rating: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_rating: Option<f64>,
    #[serde(default)]
    pub total_rating_count: Option<u32>,
    #[serde(default)]
    pub franchises: Vec<Named>,
    #[serde(default)]
    pub collections: Vec<Named>,
    #[serde(default)]
    pub alternative_names: Vec<Named>,
    #[serde(default)]
    pub similar_games: Vec<i64>,
    #[serde(default)]
    pub dlcs: Vec<i64>,
    #[serde(default)]
    pub expansions: Vec<i64>,
    #[serde(default)]
    pub category: Option<i32>,
    #[serde(default)]
    pub parent_game: Option<i64>,
}

fn names(items: Vec<Named>) -> Vec<String> {
    items.into_iter().filter_map(|n| n.name).collect()
}

fn first_name(items: Vec<Named>) -> Option<String> {
    items.into_iter().find_map(|n| n.name)
}

impl IgdbGame {
    /// Flatten the wire shape into a core catalog entry.
    ///
    /// A missing name becomes empty so the sync layer rejects the entry
    /// instead of it vanishing silently here.
    pub fn into_entry(self) -> CatalogEntry {
        let involved_companies = self
            .involved_companies
            .into_iter()
            .filter_map(|ic| {
                let name = ic.company.and_then(|c| c.name)?;
                Some(InvolvedCompany {
                    name,
                    developer: ic.developer,
                    publisher: ic.publisher,
                })
            })
            .collect();

        CatalogEntry {
            id: self.id,
            name: self.name.unwrap_or_default(),
            slug: self.slug,
            summary: self.summary,
            storyline: self.storyline,
            first_release_date: self.first_release_date,
            cover_url: self.cover.and_then(|c| c.url),
            screenshot_urls: self.screenshots.into_iter().filter_map(|s| s.url).collect(),
            genres: names(self.genres),
            platforms: names(self.platforms),
            involved_companies,
            total_rating: self.total_rating.or(self.rating),
            aggregated_rating: self.aggregated_rating,
            rating_count: self.total_rating_count,
            category: self.category.map(CatalogCategory::from_code),
            parent_game: self.parent_game,
            franchise: first_name(self.franchises),
            collection: first_name(self.collections),
            alternative_names: names(self.alternative_names),
            similar_game_ids: self.similar_games,
            dlc_ids: self.dlcs,
            expansion_ids: self.expansions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record_flattens() {
        let raw = json!({
            "id": 7346,
            "name": "The Legend of Zelda: Breath of the Wild",
            "slug": "the-legend-of-zelda-breath-of-the-wild",
            "cover": {"id": 1, "url": "//images.igdb.com/igdb/image/upload/t_thumb/co3p2d.jpg"},
            "first_release_date": 1_488_499_200,
            "genres": [{"id": 31, "name": "Adventure"}],
            "platforms": [{"id": 130, "name": "Nintendo Switch"}],
            "involved_companies": [
                {"id": 1, "company": {"id": 70, "name": "Nintendo"}, "developer": false, "publisher": true},
                {"id": 2, "company": {"id": 71, "name": "Nintendo EPD"}, "developer": true, "publisher": false},
                {"id": 3, "developer": true}
            ],
            "total_rating": 94.5,
            "total_rating_count": 3000,
            "franchises": [{"id": 596, "name": "The Legend of Zelda"}],
            "alternative_names": [{"id": 1, "name": "BotW"}],
            "dlcs": [1, 2],
            "category": 0
        });

        let entry = serde_json::from_value::<IgdbGame>(raw).unwrap().into_entry();

        assert_eq!(entry.id, 7346);
        assert_eq!(entry.developer(), Some("Nintendo EPD"));
        assert_eq!(entry.publisher(), Some("Nintendo"));
        assert_eq!(entry.involved_companies.len(), 2);
        assert_eq!(entry.genres, vec!["Adventure"]);
        assert_eq!(entry.franchise.as_deref(), Some("The Legend of Zelda"));
        assert_eq!(entry.alternative_names, vec!["BotW"]);
        assert_eq!(entry.category, Some(CatalogCategory::MainGame));
        assert_eq!(entry.dlc_ids, vec![1, 2]);
        assert!(entry.cover_url.unwrap().contains("t_thumb"));
    }

    #[test]
    fn test_sparse_record_and_rating_fallback() {
        let raw = json!({"id": 1, "rating": 71.0});
        let entry = serde_json::from_value::<IgdbGame>(raw).unwrap().into_entry();
        assert_eq!(entry.name, "");
        assert_eq!(entry.total_rating, Some(71.0));
        assert!(entry.screenshot_urls.is_empty());
    }
}
