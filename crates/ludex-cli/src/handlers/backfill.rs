//! Backfill command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the backfill command and print the run totals.
///
/// Batch size, parallelism and the row limit are applied at bootstrap via
/// `BackfillConfig`.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    println!("Backfilling incomplete games from IGDB...");
    let report = ctx.core().backfill().run().await?;

    if report.total == 0 {
        println!("Nothing to do: every game with an IGDB id is complete.");
        return Ok(());
    }

    println!("  Incomplete: {}", report.total);
    println!("  Processed:  {}", report.processed);
    println!("  Updated:    {}", report.updated);
    println!("  Missing:    {}", report.missing);
    println!("  Failed:     {}", report.failed);
    println!(
        "  Elapsed:    {:.1}s ({:.1} games/s)",
        report.elapsed.as_secs_f64(),
        report.rate()
    );
    Ok(())
}
