use std::cmp::Reverse;
use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use super::exclusion::ExclusionFilter;
use super::transition_table::{Candidates, SourceId};

/// Picks one candidate word from a transition bucket.
///
/// # Behavior
/// - Candidates failing the exclusion filter are dropped first.
/// - With a single weight (or all weights equal) the pool is the plain
///   union of every source's multiset.
/// - With differing weights, sources are visited in descending weight order;
///   a word already contributed by a heavier source is skipped, and each
///   source's remaining words are replicated `weight` times in the pool.
///   A word's effective weight is that of its heaviest source, not a sum.
///
/// The pick itself is uniform over the pool, so duplicates (corpus
/// frequency and replication alike) raise a word's odds.
pub struct WeightedSampler<'a> {
	weights: &'a [u32],
	filter: &'a ExclusionFilter,
}

impl<'a> WeightedSampler<'a> {
	pub fn new(weights: &'a [u32], filter: &'a ExclusionFilter) -> Self {
		Self { weights, filter }
	}

	fn weight(&self, source: SourceId) -> u32 {
		self.weights.get(source).copied().unwrap_or(1)
	}

	fn is_uniform(&self) -> bool {
		self.weights.windows(2).all(|pair| pair[0] == pair[1])
	}

	/// Builds the sampling pool for one bucket.
	pub fn pool<'c>(&self, candidates: &'c Candidates) -> Vec<&'c str> {
		let filter = self.filter;
		if self.is_uniform() {
			return candidates.sources().flat_map(|(_, words)| filter.filter(words)).collect();
		}

		let mut order: Vec<(SourceId, &'c [String])> = candidates.sources().collect();
		// Stable, so equal weights keep ascending source order.
		order.sort_by_key(|(source, _)| Reverse(self.weight(*source)));

		let mut seen: HashSet<&'c str> = HashSet::new();
		let mut pool: Vec<&'c str> = Vec::new();
		for (source, words) in order {
			let contribution: Vec<&'c str> = filter.filter(words).filter(|word| !seen.contains(word)).collect();
			for _ in 0..self.weight(source) {
				pool.extend_from_slice(&contribution);
			}
			seen.extend(contribution);
		}
		pool
	}

	/// Draws one word, or `None` when the bucket is missing or nothing in
	/// it survives the filter.
	pub fn sample<'c, R: Rng + ?Sized>(&self, candidates: Option<&'c Candidates>, rng: &mut R) -> Option<&'c str> {
		let pool = self.pool(candidates?);
		pool.choose(rng).copied()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn bucket(entries: &[(SourceId, &str)]) -> Candidates {
		let mut candidates = Candidates::default();
		for (source, word) in entries {
			candidates.add(*source, word);
		}
		candidates
	}

	#[test]
	fn uniform_pool_keeps_frequency() {
		let filter = ExclusionFilter::default();
		let sampler = WeightedSampler::new(&[1], &filter);
		let candidates = bucket(&[(0, "the"), (0, "the"), (0, "our")]);

		let mut pool = sampler.pool(&candidates);
		pool.sort_unstable();
		assert_eq!(pool, vec!["our", "the", "the"]);
	}

	#[test]
	fn weighted_pool_replicates_and_dedups() {
		let filter = ExclusionFilter::default();
		let sampler = WeightedSampler::new(&[1, 3], &filter);
		let candidates = bucket(&[(0, "the"), (0, "our"), (1, "the"), (1, "far")]);

		let mut pool = sampler.pool(&candidates);
		pool.sort_unstable();
		// "the" only counts for its heaviest source.
		assert_eq!(pool, vec!["far", "far", "far", "our", "the", "the", "the"]);
	}

	#[test]
	fn filter_applies_before_weighting() {
		let filter = ExclusionFilter::new("h", 1);
		let sampler = WeightedSampler::new(&[2, 1], &filter);
		let candidates = bucket(&[(0, "the"), (1, "our")]);

		assert_eq!(sampler.pool(&candidates), vec!["our"]);
	}

	#[test]
	fn empty_or_missing_bucket_samples_nothing() {
		let filter = ExclusionFilter::new("aeiou", 1);
		let sampler = WeightedSampler::new(&[1], &filter);
		let mut rng = StdRng::seed_from_u64(7);

		assert_eq!(sampler.sample(None, &mut rng), None);
		let candidates = bucket(&[(0, "the")]);
		assert_eq!(sampler.sample(Some(&candidates), &mut rng), None);
	}

	#[test]
	fn heavier_source_is_drawn_proportionally_more() {
		let filter = ExclusionFilter::default();
		let sampler = WeightedSampler::new(&[3, 1], &filter);
		let candidates = bucket(&[(0, "bat"), (0, "cat"), (1, "dog"), (1, "eel")]);
		let mut rng = StdRng::seed_from_u64(11);

		let trials = 20_000;
		let heavy = (0..trials)
			.filter(|_| matches!(sampler.sample(Some(&candidates), &mut rng), Some("bat" | "cat")))
			.count();
		let light = trials - heavy;
		let ratio = heavy as f64 / light as f64;
		assert!((2.6..3.4).contains(&ratio), "ratio was {}", ratio);
	}
}
