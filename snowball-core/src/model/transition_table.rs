use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::corpus::word_length;
use super::word_key::WordKey;

/// Identifier of the corpus source a candidate came from.
///
/// When every source shares the same weight all candidates are recorded
/// under source `0`.
pub type SourceId = usize;

/// Candidate words recorded under one key, grouped by corpus source.
///
/// Each list is a multiset: a word seen three times in the corpus appears
/// three times, which is what makes frequent continuations more likely.
///
/// ## Invariants
/// - All candidates of one bucket share the same length
/// - Lists are sorted once the owning tables are finalized
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Candidates {
	by_source: BTreeMap<SourceId, Vec<String>>,
}

impl Candidates {
	/// Records one occurrence of `word` coming from `source`.
	pub fn add(&mut self, source: SourceId, word: &str) {
		self.by_source.entry(source).or_default().push(word.to_owned());
	}

	/// Iterates the per-source lists in ascending source order.
	pub fn sources(&self) -> impl Iterator<Item = (SourceId, &[String])> {
		self.by_source.iter().map(|(source, words)| (*source, words.as_slice()))
	}

	/// The raw list contributed by one source.
	pub fn get(&self, source: SourceId) -> Option<&[String]> {
		self.by_source.get(&source).map(Vec::as_slice)
	}

	/// Total number of recorded occurrences over all sources.
	pub fn total(&self) -> usize {
		self.by_source.values().map(Vec::len).sum()
	}

	/// Sorted, deduplicated union of every source's words.
	///
	/// This is an export view only; sampling uses the raw multisets.
	pub fn distinct(&self) -> Vec<&str> {
		let mut words: Vec<&str> = self.by_source.values().flatten().map(String::as_str).collect();
		words.sort_unstable();
		words.dedup();
		words
	}

	/// Appends the occurrences of another bucket (counts are summed).
	pub fn merge(&mut self, other: &Self) {
		for (source, words) in &other.by_source {
			self.by_source.entry(*source).or_default().extend(words.iter().cloned());
		}
	}

	fn sort(&mut self) {
		for words in self.by_source.values_mut() {
			words.sort_unstable();
		}
	}
}

/// Mapping from a word run to the words observed next to it.
///
/// One instance is built for each direction:
/// - forward: all-but-last words of a run → last word
/// - backward: all-but-first words of a run → first word
///
/// Immutable once `CorpusTables` has finished building.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionTable {
	buckets: HashMap<WordKey, Candidates>,
}

impl TransitionTable {
	/// Records `word` as a continuation of `key`.
	///
	/// Empty keys are ignored.
	pub fn record(&mut self, key: &[String], source: SourceId, word: &str) {
		if key.is_empty() {
			return;
		}
		if let Some(candidates) = self.buckets.get_mut(key) {
			candidates.add(source, word);
		} else {
			let mut candidates = Candidates::default();
			candidates.add(source, word);
			self.buckets.insert(WordKey::from(key), candidates);
		}
	}

	/// Looks up the bucket for a key, given as a slice of words.
	pub fn get(&self, key: &[String]) -> Option<&Candidates> {
		self.buckets.get(key)
	}

	/// Number of distinct keys.
	pub fn len(&self) -> usize {
		self.buckets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buckets.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&WordKey, &Candidates)> {
		self.buckets.iter()
	}

	/// Merges another table into this one.
	///
	/// Existing buckets have their occurrences appended; missing ones are cloned.
	pub fn merge(&mut self, other: &Self) {
		for (key, candidates) in &other.buckets {
			if let Some(existing) = self.buckets.get_mut(key) {
				existing.merge(candidates);
			} else {
				self.buckets.insert(key.clone(), candidates.clone());
			}
		}
	}

	pub(crate) fn sort(&mut self) {
		for candidates in self.buckets.values_mut() {
			candidates.sort();
		}
	}
}

/// Words grouped by their letter count.
///
/// Source-agnostic. Used to pick starting words, to drive the
/// uniform-random generator and to validate requested lengths.
///
/// ## Invariants
/// - Buckets are sorted and deduplicated once finalized
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LengthIndex {
	buckets: BTreeMap<usize, Vec<String>>,
}

impl LengthIndex {
	pub fn record(&mut self, word: &str) {
		self.buckets.entry(word_length(word)).or_default().push(word.to_owned());
	}

	/// Words of exactly `length` letters (empty if none).
	pub fn words(&self, length: usize) -> &[String] {
		self.buckets.get(&length).map(Vec::as_slice).unwrap_or_default()
	}

	/// Lengths that have at least one word, ascending.
	pub fn lengths(&self) -> impl Iterator<Item = usize> {
		self.buckets.iter().filter(|(_, words)| !words.is_empty()).map(|(length, _)| *length)
	}

	pub fn is_empty(&self) -> bool {
		self.buckets.values().all(Vec::is_empty)
	}

	pub fn merge(&mut self, other: &Self) {
		for (length, words) in &other.buckets {
			self.buckets.entry(*length).or_default().extend(words.iter().cloned());
		}
	}

	pub(crate) fn sort_and_dedup(&mut self) {
		for words in self.buckets.values_mut() {
			words.sort_unstable();
			words.dedup();
		}
	}
}
