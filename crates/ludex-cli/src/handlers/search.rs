//! Search command handler.

use ludex_core::{SearchFilters, SearchResult};

use crate::bootstrap::CliContext;
use crate::commands::FilterArgs;
use crate::error::CliError;
use crate::handlers::require_limit;
use crate::presentation::display_search_results;

/// Build core search filters from command-line flags.
pub fn to_filters(args: &FilterArgs) -> Result<SearchFilters, CliError> {
    let mut filters = SearchFilters::new();
    for genre in &args.genres {
        filters = filters.with_genre(genre.clone());
    }
    for platform in &args.platforms {
        filters = filters.with_platform(platform.clone());
    }
    if let Some(rating) = args.min_rating {
        if !(0.0..=100.0).contains(&rating) {
            return Err(CliError::Arguments(format!(
                "--min-rating must be between 0 and 100, got {rating}"
            )));
        }
        filters = filters.with_min_rating(rating);
    }
    if let Some(year) = args.year {
        filters = filters.with_release_year(year);
    }
    Ok(filters)
}

/// Execute the search command.
///
/// The default mode merges local and IGDB results; `exact` searches the
/// local database only.
pub async fn execute(
    ctx: &CliContext,
    query: &str,
    limit: usize,
    exact: bool,
    filters: &FilterArgs,
) -> Result<(), CliError> {
    let limit = require_limit(limit)?;
    let filters = to_filters(filters)?;
    let games = ctx.core().games();

    let results: Vec<SearchResult> = if exact {
        games
            .search_games_exact(query, &filters, limit)
            .await?
            .iter()
            .map(SearchResult::from)
            .collect()
    } else {
        games.search_games(query, &filters, limit).await
    };

    if results.is_empty() {
        println!("No games found for '{query}'.");
        return Ok(());
    }

    println!("Found {} game(s):\n", results.len());
    display_search_results(&results);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_from_flags() {
        let args = FilterArgs {
            genres: vec!["Adventure".into()],
            platforms: vec!["PC".into()],
            min_rating: Some(80.0),
            year: Some(2017),
        };
        let filters = to_filters(&args).unwrap();
        assert_eq!(filters.genres, vec!["Adventure"]);
        assert_eq!(filters.platforms, vec!["PC"]);
        assert_eq!(filters.min_rating, Some(80.0));
        assert_eq!(filters.release_year, Some(2017));
    }

    #[test]
    fn test_rating_out_of_range_is_rejected() {
        let args = FilterArgs {
            min_rating: Some(120.0),
            ..FilterArgs::default()
        };
        let err = to_filters(&args).unwrap_err();
        assert_eq!(err.exit_code(), 64);
    }
}
