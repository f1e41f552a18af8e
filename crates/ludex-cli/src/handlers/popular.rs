//! Popular command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::require_limit;
use crate::presentation::{format_optional, print_separator, truncate_string};

/// Execute the popular command: games with user reviews, most reviewed
/// first.
pub async fn execute(ctx: &CliContext, limit: usize) -> Result<(), CliError> {
    let limit = require_limit(limit)?;
    let games = ctx.core().games().get_popular_games(limit).await?;

    if games.is_empty() {
        println!("No games have user reviews yet.");
        return Ok(());
    }

    println!("{:<6} {:<40} {:<8} Reviews", "ID", "Name", "Avg");
    print_separator(64);
    for game in games {
        println!(
            "{:<6} {:<40} {:<8} {}",
            game.id,
            truncate_string(&game.name, 39),
            format_optional(game.user_rating_avg.map(|r| format!("{r:.1}")), "--"),
            game.user_rating_count
        );
    }
    Ok(())
}
