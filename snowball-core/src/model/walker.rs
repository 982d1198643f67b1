use std::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;

use super::corpus::word_length;
use super::corpus_tables::CorpusTables;
use super::generation_config::{GenerationConfig, GeneratorMode};
use super::resolver::KeyResolver;
use super::sampler::WeightedSampler;
use super::seed::SeedPhrase;
use super::word_key::Direction;

/// Why one poem attempt was discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
	/// No valid word of the begin length exists.
	NoStartingWord,
	/// Back-filling a middle seed reached a word with no shorter continuation.
	BackwardDeadEnd,
	/// The finished poem has fewer words than the end length requires.
	TooShort { words: usize, required: usize },
	/// The uniform-random generator found no valid word of this length.
	MissingLength(usize),
	/// The finished poem is already in the batch.
	Duplicate,
}

impl fmt::Display for FailureReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NoStartingWord => write!(f, "no valid starting word"),
			Self::BackwardDeadEnd => write!(f, "dead branch while back-filling"),
			Self::TooShort { words, required } => write!(f, "poem has {} words, {} required", words, required),
			Self::MissingLength(length) => write!(f, "no valid word {} letters long", length),
			Self::Duplicate => write!(f, "duplicate poem"),
		}
	}
}

/// Result of one poem attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalkOutcome {
	/// Words of the finished poem, ascending by one letter.
	Complete(Vec<String>),
	Failed(FailureReason),
}

/// Construction phases of a single poem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
	Start,
	BackwardFill,
	ForwardFill,
	Complete,
	Failed(FailureReason),
}

/// Outcome of growing the snowball by one word.
enum Step {
	Grew,
	DeadEnd,
	/// The minimum key size ended forward growth.
	Stopped,
}

/// Builds individual snowball poems from the corpus tables.
///
/// The in-progress snowball is always kept in ascending order: backward
/// growth prepends, forward growth appends. Both directions go through
/// the same `extend` step.
pub struct SnowballWalker<'a> {
	tables: &'a CorpusTables,
	config: &'a GenerationConfig,
	sampler: WeightedSampler<'a>,
	starting_words: Vec<&'a str>,
}

impl<'a> SnowballWalker<'a> {
	pub fn new(tables: &'a CorpusTables, config: &'a GenerationConfig) -> Self {
		let starting_words = config.exclusion.filter(tables.lengths().words(config.begin_length())).collect();
		Self {
			tables,
			config,
			sampler: WeightedSampler::new(tables.weights(), &config.exclusion),
			starting_words,
		}
	}

	/// Runs one poem attempt.
	///
	/// The uniform-random generator ignores `seed`.
	pub fn walk<R: Rng + ?Sized>(&self, seed: Option<&SeedPhrase>, rng: &mut R) -> WalkOutcome {
		match self.config.mode() {
			GeneratorMode::Markov => self.walk_markov(seed, rng),
			GeneratorMode::UniformRandom => self.walk_random(rng),
		}
	}

	fn walk_markov<R: Rng + ?Sized>(&self, seed: Option<&SeedPhrase>, rng: &mut R) -> WalkOutcome {
		let mut snowball: Vec<String> = Vec::new();
		let mut phase = Phase::Start;

		loop {
			phase = match phase {
				Phase::Start => self.start(seed, &mut snowball, rng),
				Phase::BackwardFill => self.backward_fill(&mut snowball, rng),
				Phase::ForwardFill => self.forward_fill(&mut snowball, rng),
				Phase::Complete => return WalkOutcome::Complete(snowball),
				Phase::Failed(reason) => return WalkOutcome::Failed(reason),
			};
		}
	}

	fn start<R: Rng + ?Sized>(&self, seed: Option<&SeedPhrase>, snowball: &mut Vec<String>, rng: &mut R) -> Phase {
		match seed {
			None => match self.starting_words.choose(rng) {
				Some(word) => {
					snowball.push((*word).to_owned());
					Phase::ForwardFill
				}
				None => Phase::Failed(FailureReason::NoStartingWord),
			},
			Some(SeedPhrase::Starting(words)) => {
				snowball.extend(words.iter().cloned());
				Phase::ForwardFill
			}
			Some(SeedPhrase::Middle(words)) => {
				snowball.extend(words.iter().cloned());
				if self.front_is_above_begin(snowball) { Phase::BackwardFill } else { Phase::ForwardFill }
			}
		}
	}

	fn front_is_above_begin(&self, snowball: &[String]) -> bool {
		snowball.first().is_some_and(|word| word_length(word) > self.config.begin_length())
	}

	/// Prepends shorter words until the first word reaches the begin length.
	fn backward_fill<R: Rng + ?Sized>(&self, snowball: &mut Vec<String>, rng: &mut R) -> Phase {
		while self.front_is_above_begin(snowball) {
			match self.extend(snowball, Direction::Backward, rng) {
				Step::Grew => {}
				Step::DeadEnd | Step::Stopped => return Phase::Failed(FailureReason::BackwardDeadEnd),
			}
		}
		Phase::ForwardFill
	}

	/// Appends longer words until a dead branch or the minimum key size
	/// stops growth, then applies the end-length rule.
	fn forward_fill<R: Rng + ?Sized>(&self, snowball: &mut Vec<String>, rng: &mut R) -> Phase {
		while let Step::Grew = self.extend(snowball, Direction::Forward, rng) {}

		match self.config.minimum_word_count() {
			Some(required) if snowball.len() < required => {
				Phase::Failed(FailureReason::TooShort { words: snowball.len(), required })
			}
			_ => Phase::Complete,
		}
	}

	/// Grows the snowball by one word in `direction`.
	fn extend<R: Rng + ?Sized>(&self, snowball: &mut Vec<String>, direction: Direction, rng: &mut R) -> Step {
		let table = self.tables.table(direction);
		let resolver = KeyResolver::new(
			table,
			&self.config.exclusion,
			direction,
			self.config.multi_key_percentage(),
		);

		let Some(resolved) = resolver.resolve(snowball, rng) else {
			return Step::DeadEnd;
		};
		if direction == Direction::Forward && self.config.stops_forward_growth(resolved.longest_valid, snowball.len()) {
			return Step::Stopped;
		}
		let Some(word) = self.sampler.sample(table.get(resolved.key), rng) else {
			return Step::DeadEnd;
		};

		let word = word.to_owned();
		match direction {
			Direction::Forward => snowball.push(word),
			Direction::Backward => snowball.insert(0, word),
		}
		Step::Grew
	}

	/// One uniformly random valid word for each length from begin to end.
	fn walk_random<R: Rng + ?Sized>(&self, rng: &mut R) -> WalkOutcome {
		let begin = self.config.begin_length();
		let end = self.config.effective_end_length().unwrap_or(begin);

		let mut snowball = Vec::with_capacity(end.saturating_sub(begin) + 1);
		for length in begin..=end {
			let words: Vec<&str> = self.config.exclusion.filter(self.tables.lengths().words(length)).collect();
			match words.choose(rng) {
				Some(word) => snowball.push((*word).to_owned()),
				None => return WalkOutcome::Failed(FailureReason::MissingLength(length)),
			}
		}
		WalkOutcome::Complete(snowball)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::exclusion::ExclusionFilter;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn complete(outcome: WalkOutcome) -> Vec<String> {
		match outcome {
			WalkOutcome::Complete(words) => words,
			WalkOutcome::Failed(reason) => panic!("walk failed: {}", reason),
		}
	}

	#[test]
	fn unseeded_walk_follows_the_only_chain() {
		let tables = CorpusTables::from_lines(["i am the best"], true);
		let config = GenerationConfig::default();
		let walker = SnowballWalker::new(&tables, &config);
		let mut rng = StdRng::seed_from_u64(1);

		assert_eq!(complete(walker.walk(None, &mut rng)), ["i", "am", "the", "best"]);
	}

	#[test]
	fn starting_phrase_is_kept_verbatim() {
		let tables = CorpusTables::from_lines(["i am the best", "o no the"], true);
		let config = GenerationConfig::default();
		let walker = SnowballWalker::new(&tables, &config);
		let mut rng = StdRng::seed_from_u64(2);

		let seed = SeedPhrase::parse("o no").unwrap();
		let words = complete(walker.walk(Some(&seed), &mut rng));
		assert_eq!(&words[..2], ["o", "no"]);
		assert_eq!(&words[2..], ["the", "best"]);
	}

	#[test]
	fn middle_phrase_is_back_filled() {
		let tables = CorpusTables::from_lines(["i am the best"], true);
		let config = GenerationConfig::default();
		let walker = SnowballWalker::new(&tables, &config);
		let mut rng = StdRng::seed_from_u64(3);

		let seed = SeedPhrase::parse("the").unwrap();
		assert_eq!(complete(walker.walk(Some(&seed), &mut rng)), ["i", "am", "the", "best"]);
	}

	#[test]
	fn back_fill_stops_at_begin_length() {
		let tables = CorpusTables::from_lines(["i am the best"], true);
		let mut config = GenerationConfig::default();
		config.set_begin_length(2).unwrap();
		let walker = SnowballWalker::new(&tables, &config);
		let mut rng = StdRng::seed_from_u64(4);

		let seed = SeedPhrase::parse("the best").unwrap();
		assert_eq!(complete(walker.walk(Some(&seed), &mut rng)), ["am", "the", "best"]);
	}

	#[test]
	fn unexpanded_tables_grow_through_longer_keys() {
		let tables = CorpusTables::from_lines(["a am jam", "o on one"], false);
		let mut config = GenerationConfig::default();
		config.set_multi_key_percentage(0).unwrap();
		let walker = SnowballWalker::new(&tables, &config);
		let mut rng = StdRng::seed_from_u64(10);

		let seed = SeedPhrase::parse("a am").unwrap();
		for _ in 0..20 {
			assert_eq!(complete(walker.walk(Some(&seed), &mut rng)), ["a", "am", "jam"]);
		}
	}

	#[test]
	fn back_fill_gap_fails_the_attempt() {
		let tables = CorpusTables::from_lines(["be bed beds"], true);
		let config = GenerationConfig::default();
		let walker = SnowballWalker::new(&tables, &config);
		let mut rng = StdRng::seed_from_u64(5);

		let seed = SeedPhrase::parse("bed").unwrap();
		assert_eq!(walker.walk(Some(&seed), &mut rng), WalkOutcome::Failed(FailureReason::BackwardDeadEnd));
	}

	#[test]
	fn short_poems_fail_the_end_length() {
		let tables = CorpusTables::from_lines(["i am the"], true);
		let mut config = GenerationConfig::default();
		config.set_end_length(Some(4)).unwrap();
		let walker = SnowballWalker::new(&tables, &config);
		let mut rng = StdRng::seed_from_u64(6);

		assert_eq!(
			walker.walk(None, &mut rng),
			WalkOutcome::Failed(FailureReason::TooShort { words: 3, required: 4 })
		);
	}

	#[test]
	fn min_key_size_stops_forward_growth() {
		// After "i am the", only the single-word key "the" continues.
		let tables = CorpusTables::from_lines(["i am the", "a an the best"], true);
		let mut config = GenerationConfig::default();
		config.set_min_key_size(2).unwrap();
		let walker = SnowballWalker::new(&tables, &config);
		let mut rng = StdRng::seed_from_u64(7);

		let seed = SeedPhrase::parse("i am the").unwrap();
		assert_eq!(complete(walker.walk(Some(&seed), &mut rng)), ["i", "am", "the"]);

		let mut relaxed = config.clone();
		relaxed.set_min_key_size(1).unwrap();
		let walker = SnowballWalker::new(&tables, &relaxed);
		assert_eq!(complete(walker.walk(Some(&seed), &mut rng)), ["i", "am", "the", "best"]);
	}

	#[test]
	fn exclusion_applies_to_the_starting_word() {
		let tables = CorpusTables::from_lines(["a at the", "i in tin"], true);
		let mut config = GenerationConfig::default();
		config.exclusion = ExclusionFilter::new("a", 1);
		let walker = SnowballWalker::new(&tables, &config);
		let mut rng = StdRng::seed_from_u64(8);

		for _ in 0..20 {
			assert_eq!(complete(walker.walk(None, &mut rng)), ["i", "in", "tin"]);
		}
	}

	#[test]
	fn random_mode_picks_one_word_per_length() {
		let tables = CorpusTables::from_lines(["i am the best", "a an and sand"], true);
		let mut config = GenerationConfig::default();
		config.set_min_key_size(0).unwrap();
		config.set_end_length(Some(4)).unwrap();
		let walker = SnowballWalker::new(&tables, &config);
		let mut rng = StdRng::seed_from_u64(9);

		let words = complete(walker.walk(None, &mut rng));
		assert_eq!(words.len(), 4);
		for (i, word) in words.iter().enumerate() {
			assert_eq!(word_length(word), i + 1);
		}
	}
}
