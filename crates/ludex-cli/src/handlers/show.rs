//! Show command handler.

use ludex_core::GameRef;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::display_game;

/// Execute the show command.
///
/// With `igdb`, the identifier is an IGDB id and a missing or incomplete
/// row is refreshed from the catalog first.
pub async fn execute(ctx: &CliContext, identifier: &str, igdb: bool) -> Result<(), CliError> {
    let games = ctx.core().games();

    let game = if igdb {
        let igdb_id = identifier.parse::<i64>().map_err(|_| {
            CliError::Arguments(format!("'{identifier}' is not a numeric IGDB id"))
        })?;
        games.get_game_by_igdb_id(igdb_id).await?
    } else {
        match GameRef::parse(identifier) {
            GameRef::Id(id) => games.get_game_by_id(id).await?,
            GameRef::Slug(slug) => games.get_game_by_slug(&slug).await?,
        }
    };

    let game = game.ok_or_else(|| CliError::NotFound(format!("game '{identifier}'")))?;
    display_game(&game);
    Ok(())
}
