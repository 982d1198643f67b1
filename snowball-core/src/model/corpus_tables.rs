use std::path::Path;
use std::thread;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::SnowballError;
use crate::io::read_file;
use super::corpus::{CorpusRecord, CorpusSource};
use super::transition_table::{LengthIndex, SourceId, TransitionTable};
use super::word_key::Direction;

/// The generation model: forward and backward transition tables plus the
/// length index, built once from one or more weighted corpus sources.
///
/// This struct manages:
/// - `forward` / `backward`: word-run → next word tables, one per direction.
/// - `lengths`: words grouped by letter count.
/// - `weights`: sampling weight of each `SourceId`.
/// - `sources` and `expanded`: how the tables were built (used to validate a cache).
///
/// Read-only once built; share it by reference between generators.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CorpusTables {
	forward: TransitionTable,
	backward: TransitionTable,
	lengths: LengthIndex,
	weights: Vec<u32>,
	sources: Vec<CorpusSource>,
	expanded: bool,
	broken_lines: usize,
}

impl CorpusTables {
	/// Builds the tables from every corpus source.
	///
	/// - If all sources share one weight, every candidate is recorded under
	///   source `0` and sampling is a plain union.
	/// - Otherwise source `i` keeps its own candidate lists.
	/// - `expand` indexes every contiguous sub-run of each line.
	///
	/// # Errors
	/// Returns an error if no source is given or if any source cannot be read.
	pub fn build(sources: &[CorpusSource], expand: bool) -> Result<Self, SnowballError> {
		let first = sources.first().ok_or(SnowballError::NoSources)?;
		let uniform = sources.iter().all(|source| source.weight() == first.weight());

		let mut tables = Self {
			weights: if uniform {
				vec![first.weight()]
			} else {
				sources.iter().map(CorpusSource::weight).collect()
			},
			sources: sources.to_vec(),
			expanded: expand,
			..Self::default()
		};

		for (index, source) in sources.iter().enumerate() {
			let lines = read_file(source.path()).map_err(|e| SnowballError::CorpusOpen {
				path: source.path().to_path_buf(),
				source: e,
			})?;
			let source_id: SourceId = if uniform { 0 } else { index };
			let partial = Self::build_source(&lines, source_id, expand)?;
			debug!(
				"corpus {}: {} lines, {} broken, weight {}",
				source.name(),
				lines.len(),
				partial.broken_lines,
				source.weight()
			);
			tables.merge(&partial);
		}

		tables.finalize();
		info!(
			"loaded {} corpus source(s): {} forward keys ({} transitions), {} backward keys, words up to {} letters",
			sources.len(),
			tables.forward.len(),
			tables.forward.iter().map(|(_, candidates)| candidates.total()).sum::<usize>(),
			tables.backward.len(),
			tables.lengths.lengths().last().unwrap_or_default()
		);
		Ok(tables)
	}

	/// Builds tables from in-memory lines as a single unweighted source.
	pub fn from_lines<I, S>(lines: I, expand: bool) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut tables = Self { weights: vec![1], expanded: expand, ..Self::default() };
		for line in lines {
			tables.add_line(line.as_ref(), 0, expand);
		}
		tables.finalize();
		tables
	}

	/// Loads the tables from a `postcard` cache if it was built from the same
	/// sources, otherwise builds them and (re)writes the cache.
	///
	/// Without a cache path this is `build`.
	pub fn load_or_build(
		sources: &[CorpusSource],
		cache_path: Option<&Path>,
		expand: bool,
	) -> Result<Self, SnowballError> {
		let Some(cache_path) = cache_path else {
			return Self::build(sources, expand);
		};

		if cache_path.exists() {
			let bytes = std::fs::read(cache_path)?;
			match postcard::from_bytes::<Self>(&bytes) {
				Ok(tables) if tables.sources == sources && tables.expanded == expand => {
					info!("loaded corpus tables from cache {}", cache_path.display());
					return Ok(tables);
				}
				Ok(_) => info!("cache {} was built from other sources, rebuilding", cache_path.display()),
				Err(e) => warn!("ignoring unreadable cache {}: {}", cache_path.display(), e),
			}
		}

		let tables = Self::build(sources, expand)?;
		let bytes = postcard::to_stdvec(&tables)?;
		std::fs::write(cache_path, bytes)?;
		debug!("wrote corpus tables cache {}", cache_path.display());
		Ok(tables)
	}

	/// Splits the lines of one source into chunks, builds partial tables in
	/// parallel and merges them.
	///
	/// Chunk count is based on CPU cores * factor. Merging only appends
	/// occurrences, so the result does not depend on thread scheduling once
	/// the tables are finalized.
	fn build_source(lines: &[String], source: SourceId, expand: bool) -> Result<Self, SnowballError> {
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = lines.len().div_ceil(chunks).max(1);

		let partials: Vec<Self> = thread::scope(|scope| {
			let handles: Vec<_> = lines
				.chunks(chunk_size)
				.map(|chunk| {
					scope.spawn(move || {
						let mut partial = Self::default();
						for line in chunk {
							partial.add_line(line, source, expand);
						}
						partial
					})
				})
				.collect();

			handles
				.into_iter()
				.map(|handle| handle.join().map_err(|_| SnowballError::WorkerPanicked("building corpus tables")))
				.collect::<Result<Vec<_>, _>>()
		})?;

		let mut tables = Self::default();
		for partial in &partials {
			tables.merge(partial);
		}
		Ok(tables)
	}

	/// Splits one corpus line into snowballing runs and records them.
	///
	/// Returns `false` (and logs) when the line had to be broken up; the
	/// valid runs of a broken line are still recorded.
	pub fn add_line(&mut self, line: &str, source: SourceId, expand: bool) -> bool {
		let (records, breaks) = CorpusRecord::split_line(line);

		for record in &records {
			if expand {
				for run in record.sub_chains() {
					self.add_run(run, source);
				}
			} else {
				self.add_run(record.words(), source);
			}
		}

		if let Some(first_break) = breaks.first() {
			debug!("broken corpus line \"{}\": {}", line.trim(), first_break);
			self.broken_lines += 1;
			return false;
		}
		true
	}

	/// Records one word run: `last` under the forward key, `first` under
	/// the backward key, and `first` in the length index.
	fn add_run(&mut self, run: &[String], source: SourceId) {
		let Some((first, tail)) = run.split_first() else {
			return;
		};
		if let Some((last, head)) = run.split_last() {
			self.forward.record(head, source, last);
		}
		self.backward.record(tail, source, first);
		self.lengths.record(first);
	}

	/// Merges another set of tables into this one.
	///
	/// Weights and source lists are owned by the top-level build and are
	/// not merged.
	pub fn merge(&mut self, other: &Self) {
		self.forward.merge(&other.forward);
		self.backward.merge(&other.backward);
		self.lengths.merge(&other.lengths);
		self.broken_lines += other.broken_lines;
	}

	fn finalize(&mut self) {
		self.forward.sort();
		self.backward.sort();
		self.lengths.sort_and_dedup();
	}

	pub fn forward(&self) -> &TransitionTable {
		&self.forward
	}

	pub fn backward(&self) -> &TransitionTable {
		&self.backward
	}

	/// The table grown from in the given direction.
	pub fn table(&self, direction: Direction) -> &TransitionTable {
		match direction {
			Direction::Forward => &self.forward,
			Direction::Backward => &self.backward,
		}
	}

	pub fn lengths(&self) -> &LengthIndex {
		&self.lengths
	}

	/// Sampling weight of each source id.
	pub fn weights(&self) -> &[u32] {
		&self.weights
	}

	pub fn sources(&self) -> &[CorpusSource] {
		&self.sources
	}

	/// Number of corpus lines that did not snowball from end to end.
	pub fn broken_lines(&self) -> usize {
		self.broken_lines
	}
}
