use super::corpus::word_length;

/// Lipogram filter: words containing any forbidden character are invalid,
/// but only once they are at least `min_length` letters long.
///
/// An empty character set disables the filter entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusionFilter {
	chars: Vec<char>,
	min_length: usize,
}

impl ExclusionFilter {
	/// Creates a filter. Characters are lowercased and deduplicated.
	pub fn new(chars: &str, min_length: usize) -> Self {
		let mut chars: Vec<char> = chars.chars().flat_map(char::to_lowercase).collect();
		chars.sort_unstable();
		chars.dedup();
		Self { chars, min_length }
	}

	pub fn is_active(&self) -> bool {
		!self.chars.is_empty()
	}

	/// The forbidden characters as a string.
	pub fn chars(&self) -> String {
		self.chars.iter().collect()
	}

	pub fn min_length(&self) -> usize {
		self.min_length
	}

	/// Whether words of `length` letters are subject to the filter.
	pub fn applies_to(&self, length: usize) -> bool {
		self.is_active() && length >= self.min_length
	}

	fn contains_forbidden(&self, word: &str) -> bool {
		word.chars().any(|c| self.chars.contains(&c))
	}

	/// Valid words of one bucket.
	///
	/// A bucket's words all share one length, so whether the bucket is
	/// exempt is decided once from its first word.
	pub fn filter<'w>(&self, words: &'w [String]) -> impl Iterator<Item = &'w str> {
		let exempt = words.first().is_none_or(|word| !self.applies_to(word_length(word)));
		words
			.iter()
			.map(String::as_str)
			.filter(move |word| exempt || !self.contains_forbidden(word))
	}

	/// Whether at least one word of the bucket is valid.
	pub fn has_valid(&self, words: &[String]) -> bool {
		self.filter(words).next().is_some()
	}
}
