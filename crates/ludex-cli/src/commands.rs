//! Main commands enum and subcommands.

use clap::{Args, Subcommand};

/// Filters shared by the search commands.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Require a genre (repeatable)
    #[arg(long = "genre")]
    pub genres: Vec<String>,

    /// Require a platform (repeatable)
    #[arg(long = "platform")]
    pub platforms: Vec<String>,

    /// Minimum catalog rating (0-100)
    #[arg(long)]
    pub min_rating: Option<f64>,

    /// Release year
    #[arg(long)]
    pub year: Option<i32>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the local catalog, falling back to IGDB
    Search {
        /// Search text
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Only search the local database
        #[arg(long)]
        exact: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show one game by local id, slug or IGDB id
    Show {
        /// Local id or slug
        identifier: String,
        /// Treat the identifier as an IGDB id and refresh from the catalog
        #[arg(long)]
        igdb: bool,
    },

    /// Show a game with all of its user reviews
    Reviews {
        /// Local id or slug
        identifier: String,
    },

    /// List the most rated games
    Popular {
        /// Maximum number of games
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Fill missing fields of incomplete rows from IGDB
    Backfill {
        /// Stop after this many rows
        #[arg(long)]
        limit: Option<usize>,
        /// IGDB ids per request
        #[arg(long, default_value_t = 500)]
        batch_size: usize,
        /// Requests in flight at once
        #[arg(long, default_value_t = 20)]
        parallelism: usize,
    },

    /// Inspect or feed the background sync queue
    Queue {
        #[command(subcommand)]
        command: QueueCommand,
    },
}

/// Sync queue subcommands.
#[derive(Subcommand, Debug)]
pub enum QueueCommand {
    /// Print queue and circuit breaker statistics
    Status {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Fetch games from IGDB by id and persist them
    Import {
        /// IGDB ids
        #[arg(required = true)]
        igdb_ids: Vec<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Cli;
    use clap::Parser;

    #[test]
    fn test_search_with_filters() {
        let cli = Cli::parse_from([
            "ludex", "search", "zelda", "--genre", "Adventure", "--genre", "RPG", "--year",
            "2017", "-l", "5",
        ]);
        let Some(Commands::Search {
            query,
            limit,
            exact,
            filters,
        }) = cli.command
        else {
            panic!("expected search");
        };
        assert_eq!(query, "zelda");
        assert_eq!(limit, 5);
        assert!(!exact);
        assert_eq!(filters.genres, vec!["Adventure", "RPG"]);
        assert_eq!(filters.year, Some(2017));
    }

    #[test]
    fn test_queue_import_requires_ids() {
        assert!(Cli::try_parse_from(["ludex", "queue", "import"]).is_err());
        let cli = Cli::parse_from(["ludex", "queue", "import", "1942", "7346"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Queue {
                command: QueueCommand::Import { ref igdb_ids }
            }) if igdb_ids == &[1942, 7346]
        ));
    }
}
