use crate::error::SnowballError;
use super::exclusion::ExclusionFilter;

/// End length used by the uniform-random generator when none is configured.
pub const DEFAULT_END_LENGTH: usize = 8;

/// Which generator builds each poem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorMode {
	/// Walks the transition tables (minimum key size > 0).
	Markov,
	/// One random word per length from begin to end (minimum key size 0).
	UniformRandom,
}

/// When the minimum key size stops forward growth.
///
/// Forward growth only ever stops this way once the snowball holds more
/// words than the minimum key size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MinKeyBoundary {
	/// Stop when the longest valid key has fewer words than the minimum.
	#[default]
	Below,
	/// Stop when the longest valid key has no more words than the minimum.
	AtOrBelow,
}

/// Options for one poem batch.
///
/// # Responsibilities
/// - Track batch limits (`target`, `failure_budget`)
/// - Track back-off behaviour (`multi_key_percentage`, `min_key_size`)
/// - Track poem shape (`begin_length`, `end_length`) and lipogram filtering
///
/// # Invariants
/// - `multi_key_percentage <= 100`
/// - `min_key_size <= 10`
/// - `begin_length >= 1`
/// - `end_length`, when set, is in `1..=100`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
	/// Stop after this many unique poems.
	pub target: usize,

	/// Give up after this many discarded attempts.
	pub failure_budget: usize,

	/// Percentage chance, at each back-off level, to use the longer key.
	multi_key_percentage: u32,

	/// Forward-growth stop threshold; 0 selects the uniform-random generator.
	min_key_size: usize,

	pub min_key_boundary: MinKeyBoundary,

	/// Length of the first word of unseeded poems.
	begin_length: usize,

	/// Poems shorter than `1 + end - begin` words are rejected.
	end_length: Option<usize>,

	pub exclusion: ExclusionFilter,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			target: 10_000,
			failure_budget: 100_000,
			multi_key_percentage: 70,
			min_key_size: 1,
			min_key_boundary: MinKeyBoundary::Below,
			begin_length: 1,
			end_length: None,
			exclusion: ExclusionFilter::default(),
		}
	}
}

impl GenerationConfig {
	pub fn multi_key_percentage(&self) -> u32 {
		self.multi_key_percentage
	}

	/// Sets the multi-key percentage (0..=100).
	///
	/// # Errors
	/// Returns an error if the value is above 100.
	pub fn set_multi_key_percentage(&mut self, percentage: u32) -> Result<(), SnowballError> {
		if percentage > 100 {
			return Err(SnowballError::Config(format!(
				"multi-key percentage must be between 0 and 100, got {}",
				percentage
			)));
		}
		self.multi_key_percentage = percentage;
		Ok(())
	}

	pub fn min_key_size(&self) -> usize {
		self.min_key_size
	}

	/// Sets the minimum key size (0..=10). 0 switches to the
	/// uniform-random generator.
	///
	/// # Errors
	/// Returns an error if the value is above 10.
	pub fn set_min_key_size(&mut self, size: usize) -> Result<(), SnowballError> {
		if size > 10 {
			return Err(SnowballError::Config(format!("minimum key size must be between 0 and 10, got {}", size)));
		}
		self.min_key_size = size;
		Ok(())
	}

	pub fn begin_length(&self) -> usize {
		self.begin_length
	}

	/// # Errors
	/// Returns an error if `length` is 0.
	pub fn set_begin_length(&mut self, length: usize) -> Result<(), SnowballError> {
		if length == 0 {
			return Err(SnowballError::Config("begin word length must be at least 1".to_owned()));
		}
		self.begin_length = length;
		Ok(())
	}

	pub fn end_length(&self) -> Option<usize> {
		self.end_length
	}

	/// Sets (or clears) the end length.
	///
	/// # Errors
	/// Returns an error if the value is outside `1..=100`.
	pub fn set_end_length(&mut self, length: Option<usize>) -> Result<(), SnowballError> {
		if let Some(length) = length {
			if !(1..=100).contains(&length) {
				return Err(SnowballError::Config(format!(
					"end word length must be between 1 and 100, got {}",
					length
				)));
			}
		}
		self.end_length = length;
		Ok(())
	}

	pub fn mode(&self) -> GeneratorMode {
		if self.min_key_size == 0 { GeneratorMode::UniformRandom } else { GeneratorMode::Markov }
	}

	/// The end length the batch must honour, if any.
	///
	/// The uniform-random generator always has one.
	pub fn effective_end_length(&self) -> Option<usize> {
		match self.mode() {
			GeneratorMode::UniformRandom => Some(self.end_length.unwrap_or(DEFAULT_END_LENGTH)),
			GeneratorMode::Markov => self.end_length,
		}
	}

	/// Minimum word count of an accepted poem, when an end length is set.
	pub fn minimum_word_count(&self) -> Option<usize> {
		self.end_length.map(|end| (1 + end).saturating_sub(self.begin_length))
	}

	/// Whether forward growth stops, given the word count of the longest
	/// valid key and the current snowball size.
	pub fn stops_forward_growth(&self, longest_valid: usize, snowball_len: usize) -> bool {
		if self.min_key_size == 0 || snowball_len <= self.min_key_size {
			return false;
		}
		match self.min_key_boundary {
			MinKeyBoundary::Below => longest_valid < self.min_key_size,
			MinKeyBoundary::AtOrBelow => longest_valid <= self.min_key_size,
		}
	}
}
