//! CLI entry point - the composition root.
//!
//! This is the ONLY place where infrastructure is wired together via
//! bootstrap. Command dispatch routes to handlers which delegate to
//! `LudexCore`.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use ludex_cli::{Cli, CliConfig, CliContext, CliError, Commands, QueueCommand, bootstrap, handlers};
use ludex_core::{BackfillConfig, CoreConfig};

fn init_tracing(verbose: bool) {
    let default = if verbose { "ludex=debug" } else { "ludex=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Service config for the command about to run.
fn core_config(command: &Commands) -> CoreConfig {
    match command {
        Commands::Backfill {
            limit,
            batch_size,
            parallelism,
        } => CoreConfig::default().with_backfill(
            BackfillConfig::default()
                .with_batch_size(*batch_size)
                .with_parallelism(*parallelism)
                .with_limit(*limit),
        ),
        _ => CoreConfig::default(),
    }
}

async fn dispatch(ctx: &CliContext, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Search {
            query,
            limit,
            exact,
            filters,
        } => handlers::search::execute(ctx, &query, limit, exact, &filters).await,
        Commands::Show { identifier, igdb } => {
            handlers::show::execute(ctx, &identifier, igdb).await
        }
        Commands::Reviews { identifier } => handlers::reviews::execute(ctx, &identifier).await,
        Commands::Popular { limit } => handlers::popular::execute(ctx, limit).await,
        Commands::Backfill { .. } => handlers::backfill::execute(ctx).await,
        Commands::Queue { command } => match command {
            QueueCommand::Status { json } => handlers::queue::status(ctx, json),
            QueueCommand::Import { igdb_ids } => handlers::queue::import(ctx, &igdb_ids).await,
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads its env-backed args
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        // No command provided - show help
        if let Err(e) = Cli::command().print_help() {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };

    let config = CliConfig::from_args(cli.database, cli.client_id, cli.access_token)
        .with_core(core_config(&command));
    let ctx = match bootstrap(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(78);
        }
    };

    let result = dispatch(&ctx, command).await;
    ctx.shutdown().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
