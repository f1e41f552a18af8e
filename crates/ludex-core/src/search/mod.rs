//! Search building blocks: relevance, remote-merge heuristics, dual-source
//! merge and the result cache.
//!
//! These are pure (or self-synchronized) pieces; `GameService` wires them
//! together.

pub mod cache;
pub mod heuristics;
pub mod merge;
pub mod scoring;

pub use cache::{ResultCache, cache_key};
pub use heuristics::{
    FreshnessSampler, LocalCoverage, MergePolicy, MergeReason, is_common_query,
    is_franchise_query,
};
pub use merge::{Merged, merge};
pub use scoring::{compare, is_same_game, normalize_name, normalize_query, rank, score};
