//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the ludex game catalog.
///
/// Global options carry the database location and IGDB credentials; each
/// can also come from the environment (or a `.env` file).
#[derive(Parser)]
#[command(name = "ludex")]
#[command(about = "Search and maintain a local video game catalog backed by IGDB")]
#[command(version)]
pub struct Cli {
    /// Path to the SQLite database (defaults to the platform data directory)
    #[arg(long, env = "LUDEX_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Twitch application client id used for IGDB
    #[arg(long, env = "TWITCH_CLIENT_ID", global = true, hide_env_values = true)]
    pub client_id: Option<String>,

    /// Twitch app access token used for IGDB
    #[arg(
        long,
        env = "TWITCH_APP_ACCESS_TOKEN",
        global = true,
        hide_env_values = true
    )]
    pub access_token: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
