//! Remote catalog domain types.
//!
//! A `CatalogEntry` is the core-owned view of a record returned by the remote
//! game catalog. Adapters convert their wire types into this shape; the core
//! never sees IGDB JSON directly. Entries are immutable once returned: a new
//! fetch yields a new value.

use serde::{Deserialize, Serialize};

/// Remote catalog category code.
///
/// Mirrors the catalog's numeric category field. Unknown codes are preserved
/// through `Other` so they round-trip into the local store unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogCategory {
    MainGame,
    DlcAddon,
    Expansion,
    Bundle,
    StandaloneExpansion,
    Mod,
    Episode,
    Season,
    Remake,
    Remaster,
    ExpandedGame,
    Port,
    Fork,
    Other(i32),
}

impl CatalogCategory {
    /// Build a category from the catalog's numeric code.
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::MainGame,
            1 => Self::DlcAddon,
            2 => Self::Expansion,
            3 => Self::Bundle,
            4 => Self::StandaloneExpansion,
            5 => Self::Mod,
            6 => Self::Episode,
            7 => Self::Season,
            8 => Self::Remake,
            9 => Self::Remaster,
            10 => Self::ExpandedGame,
            11 => Self::Port,
            12 => Self::Fork,
            other => Self::Other(other),
        }
    }

    /// The catalog's numeric code for this category.
    pub const fn code(self) -> i32 {
        match self {
            Self::MainGame => 0,
            Self::DlcAddon => 1,
            Self::Expansion => 2,
            Self::Bundle => 3,
            Self::StandaloneExpansion => 4,
            Self::Mod => 5,
            Self::Episode => 6,
            Self::Season => 7,
            Self::Remake => 8,
            Self::Remaster => 9,
            Self::ExpandedGame => 10,
            Self::Port => 11,
            Self::Fork => 12,
            Self::Other(code) => code,
        }
    }
}

/// A company credited on a catalog entry, with its role flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvolvedCompany {
    pub name: String,
    pub developer: bool,
    pub publisher: bool,
}

impl InvolvedCompany {
    pub fn developer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            developer: true,
            publisher: false,
        }
    }

    pub fn publisher(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            developer: false,
            publisher: true,
        }
    }
}

/// A game record as returned by the remote catalog.
///
/// Image URLs and the release timestamp are kept in the catalog's raw form
/// (protocol-relative thumbnail URLs, epoch seconds); the sync transform
/// normalizes them for the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// External (catalog) identifier.
    pub id: i64,
    pub name: String,
    /// Catalog-provided URL slug, if any.
    pub slug: Option<String>,
    pub summary: Option<String>,
    /// Longer narrative text; becomes the local `description`.
    pub storyline: Option<String>,
    /// First release date as Unix epoch seconds.
    pub first_release_date: Option<i64>,
    pub cover_url: Option<String>,
    pub screenshot_urls: Vec<String>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub involved_companies: Vec<InvolvedCompany>,
    /// Combined critic + user rating, 0–100.
    pub total_rating: Option<f64>,
    /// Critic aggregate rating, 0–100.
    pub aggregated_rating: Option<f64>,
    /// Number of ratings behind `total_rating`.
    pub rating_count: Option<u32>,
    pub category: Option<CatalogCategory>,
    /// External id of the parent entry for DLCs, expansions, seasons…
    pub parent_game: Option<i64>,
    pub franchise: Option<String>,
    pub collection: Option<String>,
    pub alternative_names: Vec<String>,
    pub similar_game_ids: Vec<i64>,
    pub dlc_ids: Vec<i64>,
    pub expansion_ids: Vec<i64>,
}

impl CatalogEntry {
    /// Create an entry with only the identity fields set.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: None,
            summary: None,
            storyline: None,
            first_release_date: None,
            cover_url: None,
            screenshot_urls: Vec::new(),
            genres: Vec::new(),
            platforms: Vec::new(),
            involved_companies: Vec::new(),
            total_rating: None,
            aggregated_rating: None,
            rating_count: None,
            category: None,
            parent_game: None,
            franchise: None,
            collection: None,
            alternative_names: Vec::new(),
            similar_game_ids: Vec::new(),
            dlc_ids: Vec::new(),
            expansion_ids: Vec::new(),
        }
    }

    /// Last company credited as developer.
    pub fn developer(&self) -> Option<&str> {
        self.involved_companies
            .iter()
            .rfind(|c| c.developer)
            .map(|c| c.name.as_str())
    }

    /// Last company credited as publisher.
    pub fn publisher(&self) -> Option<&str> {
        self.involved_companies
            .iter()
            .rfind(|c| c.publisher)
            .map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_company(mut self, company: InvolvedCompany) -> Self {
        self.involved_companies.push(company);
        self
    }

    #[must_use]
    pub const fn with_total_rating(mut self, rating: f64, count: u32) -> Self {
        self.total_rating = Some(rating);
        self.rating_count = Some(count);
        self
    }

    #[must_use]
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }
}
