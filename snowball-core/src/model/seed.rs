use std::fmt;

use super::corpus::word_length;

/// A user-supplied phrase embedded into every poem of a batch.
///
/// # Variants
/// - `Starting`: the first word is a single letter; the words open the
///   poem verbatim and only forward growth follows.
/// - `Middle`: the first word is longer; shorter words are back-filled in
///   front of the phrase before forward growth continues after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedPhrase {
	Starting(Vec<String>),
	Middle(Vec<String>),
}

impl SeedPhrase {
	/// Parses a phrase: lowercased, split on whitespace.
	///
	/// Returns `None` for a blank phrase.
	pub fn parse(phrase: &str) -> Option<Self> {
		let words: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();
		let first = words.first()?;
		if word_length(first) == 1 {
			Some(Self::Starting(words))
		} else {
			Some(Self::Middle(words))
		}
	}

	pub fn words(&self) -> &[String] {
		match self {
			Self::Starting(words) | Self::Middle(words) => words,
		}
	}
}

impl fmt::Display for SeedPhrase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.words().join(" "))
	}
}
