use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which end of a snowball is being grown.
///
/// - `Forward`: append a word one letter longer than the last word.
/// - `Backward`: prepend a word one letter shorter than the first word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
	Forward,
	Backward,
}

/// A run of consecutive snowball words used to look up the next candidate.
///
/// Forward keys are the leading words of a corpus line (all but the last),
/// backward keys the trailing words (all but the first). Words are always
/// stored in ascending-length order, whatever the direction.
///
/// Equality and hashing are structural: a key hashes exactly like the
/// `[String]` slice it wraps, so tables can be probed with a borrowed slice
/// of the in-progress snowball without allocating a key.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordKey(Vec<String>);

impl WordKey {
	pub fn new(words: Vec<String>) -> Self {
		Self(words)
	}

	/// Number of words in the key.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn words(&self) -> &[String] {
		&self.0
	}
}

impl From<&[String]> for WordKey {
	fn from(words: &[String]) -> Self {
		Self(words.to_vec())
	}
}

impl From<&[&str]> for WordKey {
	fn from(words: &[&str]) -> Self {
		Self(words.iter().map(|w| (*w).to_owned()).collect())
	}
}

impl Borrow<[String]> for WordKey {
	fn borrow(&self) -> &[String] {
		&self.0
	}
}

/// Displays the key in the pipe-joined form used by the corpus dumps,
/// e.g. `do|you`.
impl fmt::Display for WordKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.join("|"))
	}
}
