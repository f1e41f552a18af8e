//! Reviews command handler.

use ludex_core::GameRef;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{display_game, display_review, print_separator};

/// Execute the reviews command: the game, then its reviews newest first.
pub async fn execute(ctx: &CliContext, identifier: &str) -> Result<(), CliError> {
    let game_ref = GameRef::parse(identifier);
    let found = ctx
        .core()
        .games()
        .get_game_with_full_reviews(&game_ref)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("game '{identifier}'")))?;

    display_game(&found.game);
    println!();
    print_separator(60);

    if found.reviews.is_empty() {
        println!("No reviews yet.");
        return Ok(());
    }
    for review in &found.reviews {
        display_review(review);
    }
    Ok(())
}
