//! Command handlers that delegate to `LudexCore`.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that validate CLI input, call core services and format
//!   output for the terminal
//!
//! Handlers should NOT access repositories directly or contain business
//! logic.

pub mod backfill;
pub mod popular;
pub mod queue;
pub mod reviews;
pub mod search;
pub mod show;

use crate::error::CliError;

/// Reject a zero result limit before it reaches the services.
pub(crate) fn require_limit(limit: usize) -> Result<usize, CliError> {
    if limit == 0 {
        return Err(CliError::Arguments("limit must be at least 1".to_string()));
    }
    Ok(limit)
}
