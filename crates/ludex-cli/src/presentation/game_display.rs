//! Game and review display utilities for CLI output.

use chrono::Datelike;
use ludex_core::{Game, GameOrigin, Review, SearchResult};

use super::tables::{format_optional, format_rating, print_separator, truncate_string};

/// Print search hits as a table, in the order given.
pub fn display_search_results(results: &[SearchResult]) {
    println!(
        "{:<8} {:<40} {:<6} {:<7} {:<24} Source",
        "IGDB", "Name", "Year", "Rating", "Developer"
    );
    print_separator(96);

    for result in results {
        let origin = match result.origin {
            GameOrigin::Local => "local",
            GameOrigin::Remote => "igdb",
        };
        println!(
            "{:<8} {:<40} {:<6} {:<7} {:<24} {}",
            result.igdb_id,
            truncate_string(&result.name, 39),
            format_optional(result.release_date.map(|d| d.year()), "--"),
            format_rating(result.total_rating),
            truncate_string(result.developer.as_deref().unwrap_or("--"), 23),
            origin
        );
    }
}

/// Print every populated field of a game.
pub fn display_game(game: &Game) {
    println!("{} ({})", game.name, game.slug);
    println!("  ID: {}  IGDB: {}", game.id, game.igdb_id);

    if let Some(date) = game.release_date {
        println!("  Released: {date}");
    }
    if let Some(developer) = &game.developer {
        println!("  Developer: {developer}");
    }
    if let Some(publisher) = &game.publisher {
        println!("  Publisher: {publisher}");
    }
    if !game.genres.is_empty() {
        println!("  Genres: {}", game.genres.join(", "));
    }
    if !game.platforms.is_empty() {
        println!("  Platforms: {}", game.platforms.join(", "));
    }
    if let Some(franchise) = &game.franchise {
        println!("  Franchise: {franchise}");
    }
    println!(
        "  IGDB rating: {} ({} ratings)",
        format_rating(game.total_rating),
        game.rating_count.unwrap_or(0)
    );
    if game.user_rating_count > 0 {
        println!(
            "  User rating: {} ({} reviews)",
            format_optional(game.user_rating_avg.map(|r| format!("{r:.1}/10")), "--"),
            game.user_rating_count
        );
    }
    if let Some(summary) = &game.summary {
        println!();
        println!("  {summary}");
    }
    if let Some(synced) = game.last_synced {
        println!();
        println!("  Last synced: {}", synced.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

/// Print one review.
pub fn display_review(review: &Review) {
    let author = review
        .author
        .display_name
        .as_deref()
        .unwrap_or(&review.author.username);
    println!(
        "[{:.1}/10] {} on {}",
        review.rating,
        author,
        review.created_at.format("%Y-%m-%d")
    );
    if let Some(text) = &review.review {
        println!("  {text}");
    }
}
