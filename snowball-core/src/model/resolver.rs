use rand::Rng;

use super::exclusion::ExclusionFilter;
use super::transition_table::TransitionTable;
use super::word_key::Direction;

/// Computes every key that can be formed from the in-progress snowball,
/// from the longest (all words) to the shortest (the single boundary word
/// at the end being grown).
///
/// The snowball is in ascending order in both directions:
/// - forward keys are suffixes: `i|am|all|cold`, `am|all|cold`, `all|cold`, `cold`
/// - backward keys are prefixes: `all|cold|songs`, `all|cold`, `all`
pub fn candidate_keys(snowball: &[String], direction: Direction) -> Vec<&[String]> {
	let n = snowball.len();
	match direction {
		Direction::Forward => (0..n).map(|i| &snowball[i..]).collect(),
		Direction::Backward => (0..n).map(|i| &snowball[..n - i]).collect(),
	}
}

/// The key chosen for the next step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedKey<'s> {
	/// Words of the chosen key (a slice of the snowball).
	pub key: &'s [String],
	/// Word count of the longest key that has a valid candidate.
	pub longest_valid: usize,
}

/// Key back-off resolver for one direction.
///
/// # Behavior
/// - Skips every key with no valid (post-exclusion) candidate.
/// - Defaults to the shortest valid key, then walks the valid keys from
///   the longest towards it; at each one a roll in `1..=100` at or under
///   `multi_key_percentage` selects that key.
///
/// The longest valid key is therefore used with probability `p`, the next
/// with `p·(1-p)`, and so on.
pub struct KeyResolver<'a> {
	table: &'a TransitionTable,
	filter: &'a ExclusionFilter,
	direction: Direction,
	multi_key_percentage: u32,
}

impl<'a> KeyResolver<'a> {
	pub fn new(
		table: &'a TransitionTable,
		filter: &'a ExclusionFilter,
		direction: Direction,
		multi_key_percentage: u32,
	) -> Self {
		Self { table, filter, direction, multi_key_percentage }
	}

	/// Whether a key has at least one candidate surviving the filter.
	pub fn has_candidates(&self, key: &[String]) -> bool {
		self.table
			.get(key)
			.is_some_and(|candidates| candidates.sources().any(|(_, words)| self.filter.has_valid(words)))
	}

	/// Picks the key for the next step. Only keys with a valid candidate
	/// are ever chosen.
	///
	/// Returns `None` when no key, down to the single word, has a valid
	/// candidate: the snowball is a dead branch in this direction.
	pub fn resolve<'s, R: Rng + ?Sized>(&self, snowball: &'s [String], rng: &mut R) -> Option<ResolvedKey<'s>> {
		let valid: Vec<&'s [String]> = candidate_keys(snowball, self.direction)
			.into_iter()
			.filter(|key| self.has_candidates(key))
			.collect();
		let (&shortest_valid, longer) = valid.split_last()?;

		let mut chosen = shortest_valid;
		for &key in longer {
			if rng.random_range(1..=100) <= self.multi_key_percentage {
				chosen = key;
				break;
			}
		}

		Some(ResolvedKey { key: chosen, longest_valid: valid[0].len() })
	}
}
