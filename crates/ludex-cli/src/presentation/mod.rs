//! Shared CLI presentation utilities.
//!
//! Format-only helpers for consistent terminal output across commands.
//! Domain transforms belong in core services.

pub mod game_display;
pub mod tables;

pub use game_display::{display_game, display_review, display_search_results};
pub use tables::{format_optional, format_rating, print_separator, truncate_string};
