//! When to ask the remote catalog, and when to use what it returns.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::scoring::normalize_name;
use crate::config::SearchConfig;

/// Single-word queries that match too much of the catalog to be worth a
/// remote round trip.
const COMMON_QUERIES: &[&str] = &[
    "game", "games", "the", "a", "an", "of", "best", "new", "top", "play", "free", "online",
];

/// Well-known series. A multi-word query mentioning one of these is a
/// franchise query.
const FRANCHISES: &[&str] = &[
    "animal crossing",
    "assassins creed",
    "battlefield",
    "call of duty",
    "castlevania",
    "crash bandicoot",
    "dark souls",
    "devil may cry",
    "donkey kong",
    "dragon quest",
    "elder scrolls",
    "fallout",
    "far cry",
    "final fantasy",
    "fire emblem",
    "god of war",
    "grand theft auto",
    "halo",
    "kingdom hearts",
    "kirby",
    "mario",
    "mass effect",
    "mega man",
    "metal gear",
    "metroid",
    "monster hunter",
    "mortal kombat",
    "need for speed",
    "persona",
    "pokemon",
    "resident evil",
    "silent hill",
    "sonic",
    "spyro",
    "star wars",
    "street fighter",
    "tekken",
    "tomb raider",
    "witcher",
    "xenoblade",
    "zelda",
];

/// Whether a normalized query is a lone common word.
pub fn is_common_query(query: &str) -> bool {
    let mut words = query.split_whitespace();
    match (words.next(), words.next()) {
        (Some(word), None) => COMMON_QUERIES.contains(&word),
        _ => false,
    }
}

/// Whether a multi-word query names a well-known series.
///
/// Matching is on whole words of the punctuation-stripped query, so
/// "the witcher 3" matches and "marionette" does not. A bare series name
/// ("zelda") is not a franchise query and falls under the general rule.
pub fn is_franchise_query(query: &str) -> bool {
    let normalized = normalize_name(query);
    if normalized.split_whitespace().nth(1).is_none() {
        return false;
    }
    let padded = format!(" {normalized} ");
    FRANCHISES
        .iter()
        .any(|franchise| padded.contains(&format!(" {franchise} ")))
}

/// Random draw for the periodic freshness merge.
///
/// Seedable so tests and replays are deterministic.
#[derive(Debug)]
pub struct FreshnessSampler {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl FreshnessSampler {
    pub fn new(probability: f64, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }

    /// A sampler that never fires.
    pub fn never() -> Self {
        Self::new(0.0, Some(0))
    }

    /// A sampler that always fires.
    pub fn always() -> Self {
        Self::new(1.0, Some(0))
    }

    pub fn sample(&self) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_bool(self.probability)
    }
}

/// What the local branch of a search looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCoverage {
    pub count: usize,
    /// Any local hit older than the staleness window.
    pub any_stale: bool,
}

/// Why remote results were or were not merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeReason {
    TooFewLocal,
    FranchiseUndercovered,
    FranchiseStale,
    FreshnessSample,
    Covered,
}

impl MergeReason {
    pub const fn merges(self) -> bool {
        !matches!(self, Self::Covered)
    }
}

/// Decides whether remote results join the local ones.
#[derive(Debug)]
pub struct MergePolicy {
    min_local: usize,
    franchise_min_local: usize,
    fallback_min_local: usize,
    sampler: FreshnessSampler,
}

impl MergePolicy {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::with_sampler(
            config,
            FreshnessSampler::new(config.freshness_probability, config.freshness_seed),
        )
    }

    pub fn with_sampler(config: &SearchConfig, sampler: FreshnessSampler) -> Self {
        Self {
            min_local: config.min_local_results,
            franchise_min_local: config.franchise_min_local_results,
            fallback_min_local: config.fallback_min_local_results,
            sampler,
        }
    }

    pub fn decide(&self, query: &str, local: LocalCoverage) -> MergeReason {
        if local.count < self.min_local {
            return MergeReason::TooFewLocal;
        }

        if is_franchise_query(query) {
            if local.count < self.franchise_min_local {
                MergeReason::FranchiseUndercovered
            } else if local.any_stale {
                MergeReason::FranchiseStale
            } else if self.sampler.sample() {
                MergeReason::FreshnessSample
            } else {
                MergeReason::Covered
            }
        } else if local.count < self.fallback_min_local {
            MergeReason::TooFewLocal
        } else {
            MergeReason::Covered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(sampler: FreshnessSampler) -> MergePolicy {
        MergePolicy::with_sampler(&SearchConfig::default(), sampler)
    }

    fn coverage(count: usize, any_stale: bool) -> LocalCoverage {
        LocalCoverage { count, any_stale }
    }

    #[test]
    fn test_common_queries() {
        assert!(is_common_query("games"));
        assert!(!is_common_query("best games"));
        assert!(!is_common_query("celeste"));
    }

    #[test]
    fn test_franchise_queries_match_whole_words() {
        assert!(is_franchise_query("zelda breath"));
        assert!(is_franchise_query("Final Fantasy VII"));
        assert!(is_franchise_query("final fantasy"));
        assert!(is_franchise_query("Assassin's Creed Odyssey"));
        assert!(!is_franchise_query("marionette"));
        assert!(!is_franchise_query("stardew valley"));
    }

    #[test]
    fn test_single_word_series_name_is_not_a_franchise_query() {
        assert!(!is_franchise_query("zelda"));
        assert!(!is_franchise_query("  Halo! "));

        let p = policy(FreshnessSampler::always());
        assert_eq!(p.decide("zelda", coverage(6, false)), MergeReason::Covered);
        assert_eq!(p.decide("zelda", coverage(4, false)), MergeReason::TooFewLocal);
        assert_eq!(
            p.decide("zelda breath", coverage(6, false)),
            MergeReason::FranchiseUndercovered
        );
    }

    #[test]
    fn test_too_few_local_always_merges() {
        let p = policy(FreshnessSampler::never());
        assert_eq!(p.decide("celeste", coverage(2, false)), MergeReason::TooFewLocal);
        assert_eq!(p.decide("zelda", coverage(0, false)), MergeReason::TooFewLocal);
    }

    #[test]
    fn test_franchise_thresholds() {
        let p = policy(FreshnessSampler::never());
        assert_eq!(
            p.decide("legend of zelda", coverage(9, false)),
            MergeReason::FranchiseUndercovered
        );
        assert_eq!(
            p.decide("legend of zelda", coverage(12, true)),
            MergeReason::FranchiseStale
        );
        assert_eq!(p.decide("legend of zelda", coverage(12, false)), MergeReason::Covered);

        let p = policy(FreshnessSampler::always());
        assert_eq!(
            p.decide("legend of zelda", coverage(12, false)),
            MergeReason::FreshnessSample
        );
    }

    #[test]
    fn test_other_queries_use_fallback_threshold() {
        let p = policy(FreshnessSampler::always());
        assert_eq!(p.decide("celeste", coverage(4, false)), MergeReason::TooFewLocal);
        assert_eq!(p.decide("celeste", coverage(5, true)), MergeReason::Covered);
    }

    #[test]
    fn test_seeded_sampler_is_deterministic() {
        let a = FreshnessSampler::new(0.5, Some(42));
        let b = FreshnessSampler::new(0.5, Some(42));
        let draws_a: Vec<bool> = (0..32).map(|_| a.sample()).collect();
        let draws_b: Vec<bool> = (0..32).map(|_| b.sample()).collect();
        assert_eq!(draws_a, draws_b);
    }
}
