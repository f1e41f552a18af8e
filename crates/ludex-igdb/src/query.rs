//! Apicalypse query bodies.
//!
//! IGDB takes its query language as the raw POST body:
//! `fields a,b.c; search "term"; where id = (1,2); limit 10;`.

/// Fields requested for every game lookup.
pub const GAME_FIELDS: &str = "name,slug,summary,storyline,cover.url,first_release_date,\
genres.name,platforms.name,involved_companies.company.name,\
involved_companies.developer,involved_companies.publisher,screenshots.url,\
aggregated_rating,rating,total_rating,total_rating_count,franchises.name,\
collections.name,alternative_names.name,similar_games,dlcs,expansions,\
category,parent_game";

/// Largest `limit` IGDB accepts, and so the largest id batch per request.
pub const MAX_LIMIT: usize = 500;

/// Escape a term for use inside a double-quoted Apicalypse string.
pub fn escape(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Builder for a single Apicalypse body.
#[derive(Debug, Clone, Default)]
pub struct Query {
    fields: Option<String>,
    search: Option<String>,
    filter: Option<String>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: &str) -> Self {
        self.fields = Some(fields.to_string());
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(escape(term));
        self
    }

    pub fn where_ids(mut self, ids: &[i64]) -> Self {
        let list = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.filter = Some(format!("id = ({list})"));
        self
    }

    /// Clamped to `1..=MAX_LIMIT`.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.clamp(1, MAX_LIMIT));
        self
    }

    pub fn build(&self) -> String {
        let mut body = String::new();
        if let Some(fields) = &self.fields {
            body.push_str(&format!("fields {fields};"));
        }
        if let Some(term) = &self.search {
            body.push_str(&format!(" search \"{term}\";"));
        }
        if let Some(filter) = &self.filter {
            body.push_str(&format!(" where {filter};"));
        }
        if let Some(limit) = self.limit {
            body.push_str(&format!(" limit {limit};"));
        }
        body.trim_start().to_string()
    }
}

/// Name search for games.
pub fn search_games(term: &str, limit: usize) -> String {
    Query::new()
        .fields(GAME_FIELDS)
        .search(term)
        .limit(limit)
        .build()
}

/// Lookup of up to `MAX_LIMIT` games by id.
pub fn games_by_ids(ids: &[i64]) -> String {
    Query::new()
        .fields(GAME_FIELDS)
        .where_ids(ids)
        .limit(ids.len())
        .build()
}
