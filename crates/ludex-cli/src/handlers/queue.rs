//! Queue command handlers.

use ludex_core::ImmediateOutcome;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Print queue statistics and the circuit breaker state.
pub fn status(ctx: &CliContext, json: bool) -> Result<(), CliError> {
    let stats = ctx.core().queue().statistics();
    let breaker = ctx.core().games().breaker_snapshot();

    if json {
        let value = serde_json::json!({ "queue": stats, "breaker": breaker });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::Core(format!("Failed to encode statistics: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    println!("Sync queue:");
    println!("  Pending:        {}", stats.pending);
    println!("  Awaiting retry: {}", stats.awaiting_retry);
    println!("  Failed:         {}", stats.failed);
    println!("  Processing:     {}", stats.processing);
    println!("  Total queued:   {}", stats.total_queued);
    println!("  Persisted:      {}", stats.total_persisted);
    println!("Catalog circuit: {}", breaker.state);
    println!("  Failures:       {}", breaker.failure_count);
    Ok(())
}

/// Fetch entries from the catalog and persist them right away, queueing
/// them for retry if the write fails.
pub async fn import(ctx: &CliContext, igdb_ids: &[i64]) -> Result<(), CliError> {
    let entries = ctx.catalog().get_by_ids(igdb_ids).await?;
    if entries.is_empty() {
        return Err(CliError::NotFound(format!(
            "no IGDB entries for ids {igdb_ids:?}"
        )));
    }

    let fetched = entries.len();
    match ctx.core().queue().process_immediate(entries).await {
        ImmediateOutcome::Persisted(report) => {
            println!(
                "Imported {fetched} game(s): {} inserted, {} updated, {} unchanged, {} invalid",
                report.inserted, report.updated, report.unchanged, report.invalid
            );
        }
        ImmediateOutcome::Queued => {
            println!("Write failed; {fetched} game(s) queued for retry.");
        }
    }
    Ok(())
}
