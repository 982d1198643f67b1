use std::collections::BTreeSet;
use std::thread;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SnowballError;
use super::corpus_tables::CorpusTables;
use super::generation_config::{GenerationConfig, GeneratorMode};
use super::seed::SeedPhrase;
use super::walker::{FailureReason, SnowballWalker, WalkOutcome};

/// Result of one poem batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
	/// Seed phrase the batch was built around, if any.
	pub seed: Option<SeedPhrase>,

	/// Unique poems, sorted.
	pub poems: Vec<String>,

	/// Discarded attempts (dead branches, short poems, duplicates).
	pub failures: usize,

	/// Poem count the batch aimed for.
	pub target: usize,
}

impl BatchReport {
	pub fn successes(&self) -> usize {
		self.poems.len()
	}

	/// Whether the failure budget ran out before the target was reached.
	pub fn budget_exhausted(&self) -> bool {
		self.successes() < self.target
	}
}

/// Runs poem batches over shared, read-only corpus tables.
///
/// # Responsibilities
/// - Sanity-check the tables against the configuration before any attempt
/// - Drive the walker until the target or the failure budget is reached
/// - Run one batch per seed phrase, in parallel
///
/// # Behavior
/// - A poem already in the batch counts as a failure, so every batch
///   terminates once `failure_budget` attempts have been discarded.
/// - Batch `i` of `generate_all` draws from `StdRng::seed_from_u64(base + i)`,
///   so results are reproducible regardless of thread scheduling.
pub struct PoemBatchGenerator<'a> {
	tables: &'a CorpusTables,
	config: &'a GenerationConfig,
}

impl<'a> PoemBatchGenerator<'a> {
	pub fn new(tables: &'a CorpusTables, config: &'a GenerationConfig) -> Self {
		Self { tables, config }
	}

	/// Checks that the tables can satisfy the configuration.
	///
	/// # Errors
	/// - `EmptyTables` if there are no 1- or 2-letter words, or no transitions.
	/// - `BeginLengthTooHigh` if no word has the begin length.
	/// - `ExclusionTooRestrictive` if the filter empties the begin-length
	///   bucket or the bucket at its own threshold.
	/// - `Config` if the end length is below the begin length.
	/// - `MissingLength` if a length between begin and end has no valid word.
	pub fn validate(&self) -> Result<(), SnowballError> {
		let lengths = self.tables.lengths();
		let exclusion = &self.config.exclusion;
		let begin = self.config.begin_length();

		if lengths.words(1).is_empty()
			|| lengths.words(2).is_empty()
			|| self.tables.forward().is_empty()
			|| self.tables.backward().is_empty()
		{
			return Err(SnowballError::EmptyTables);
		}

		if lengths.words(begin).is_empty() {
			return Err(SnowballError::BeginLengthTooHigh(begin));
		}

		if exclusion.is_active() {
			let threshold = if exclusion.min_length() == 0 { begin } else { exclusion.min_length() };
			for length in [threshold, begin] {
				let words = lengths.words(length);
				if !words.is_empty() && !exclusion.has_valid(words) {
					return Err(SnowballError::ExclusionTooRestrictive { chars: exclusion.chars() });
				}
			}
		}

		if let Some(end) = self.config.effective_end_length() {
			if end < begin {
				return Err(SnowballError::Config(format!(
					"end word length {} is shorter than begin word length {}",
					end, begin
				)));
			}
			if let Some(missing) = (begin..=end).find(|length| !exclusion.has_valid(lengths.words(*length))) {
				return Err(SnowballError::MissingLength { begin, end, missing });
			}
		}

		Ok(())
	}

	/// Validates, then runs a single batch with the caller's random source.
	///
	/// # Errors
	/// Any sanity-check error from `validate`.
	pub fn generate<R: Rng + ?Sized>(&self, seed: Option<&SeedPhrase>, rng: &mut R) -> Result<BatchReport, SnowballError> {
		self.validate()?;
		Ok(self.run_batch(seed, rng))
	}

	/// Validates once, then runs one batch per seed phrase on worker threads
	/// (at most one per CPU at a time).
	///
	/// With no seed phrases, or in uniform-random mode, a single unseeded
	/// batch is run. Reports are returned in seed-phrase order.
	///
	/// # Errors
	/// Any sanity-check error from `validate`, or `WorkerPanicked`.
	pub fn generate_all(&self, seeds: &[SeedPhrase], base_seed: u64) -> Result<Vec<BatchReport>, SnowballError> {
		self.validate()?;

		let seeds: Vec<Option<&SeedPhrase>> = match self.config.mode() {
			GeneratorMode::UniformRandom => {
				if !seeds.is_empty() {
					info!("random generator ignores {} seed phrase(s)", seeds.len());
				}
				vec![None]
			}
			GeneratorMode::Markov if seeds.is_empty() => vec![None],
			GeneratorMode::Markov => seeds.iter().map(Some).collect(),
		};

		let workers = num_cpus::get().max(1);
		let mut reports = Vec::with_capacity(seeds.len());
		for (chunk_index, chunk) in seeds.chunks(workers).enumerate() {
			let batch = thread::scope(|scope| {
				let handles: Vec<_> = chunk
					.iter()
					.enumerate()
					.map(|(offset, seed)| {
						let index = (chunk_index * workers + offset) as u64;
						scope.spawn(move || {
							let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(index));
							self.run_batch(*seed, &mut rng)
						})
					})
					.collect();

				handles
					.into_iter()
					.map(|handle| handle.join().map_err(|_| SnowballError::WorkerPanicked("generating poems")))
					.collect::<Result<Vec<_>, _>>()
			})?;
			reports.extend(batch);
		}
		Ok(reports)
	}

	fn run_batch<R: Rng + ?Sized>(&self, seed: Option<&SeedPhrase>, rng: &mut R) -> BatchReport {
		let walker = SnowballWalker::new(self.tables, self.config);
		let target = self.config.target;
		let budget = self.config.failure_budget;

		let mut poems = BTreeSet::new();
		let mut failures = 0;
		while poems.len() < target && failures < budget {
			let reason = match walker.walk(seed, rng) {
				WalkOutcome::Complete(words) => {
					if poems.insert(words.join(" ")) {
						continue;
					}
					FailureReason::Duplicate
				}
				WalkOutcome::Failed(reason) => reason,
			};
			failures += 1;
			trace!("attempt {} discarded: {}", poems.len() + failures, reason);
		}

		let report = BatchReport {
			seed: seed.cloned(),
			poems: poems.into_iter().collect(),
			failures,
			target,
		};

		if report.budget_exhausted() {
			match &report.seed {
				Some(seed) => debug!("Too many incomplete poems with seed phrase \"{}\"", seed),
				None => debug!("Too many incomplete poems"),
			}
			debug!("Target: {} - Actual: {}", report.target, report.successes());
		} else {
			debug!("batch complete: {} poems, {} discarded attempts", report.successes(), report.failures);
		}
		report
	}
}
