use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a table build or a whole poem batch.
///
/// Per-attempt failures (dead branches, poems that end too short) are not
/// errors; they are reported through `WalkOutcome::Failed` and only counted.
#[derive(Debug, Error)]
pub enum SnowballError {
	/// An option is out of range or contradicts another option.
	#[error("invalid configuration: {0}")]
	Config(String),

	/// No corpus source was supplied.
	#[error("no corpus sources were given")]
	NoSources,

	/// A corpus source could not be opened or read.
	#[error("cannot read corpus file {}: {source}", path.display())]
	CorpusOpen {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// The tables were built but hold too little to generate anything.
	#[error("snowball corpus contains invalid (or no) data")]
	EmptyTables,

	/// No corpus word has the requested beginning length.
	#[error("beginning word length \"{0}\" is too high for the corpus")]
	BeginLengthTooHigh(usize),

	/// The exclusion filter removes every word of a length that is needed.
	#[error("the exclude characters string \"{chars}\" is too restrictive for the corpus")]
	ExclusionTooRestrictive { chars: String },

	/// A length inside the requested begin..=end range has no valid word.
	#[error("poems were requested from {begin} to {end} letters, but the corpus has no valid words {missing} letters long")]
	MissingLength { begin: usize, end: usize, missing: usize },

	/// A table-building or generation worker thread panicked.
	#[error("a worker thread panicked while {0}")]
	WorkerPanicked(&'static str),

	/// The table cache could not be encoded.
	#[error("table cache: {0}")]
	Cache(#[from] postcard::Error),

	/// Reading or writing the table cache failed.
	#[error(transparent)]
	Io(#[from] io::Error),
}

/// Why a single corpus line was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
	#[error("word \"{0}\" is not purely alphabetic")]
	NotAlphabetic(String),

	#[error("\"{next}\" is not exactly one letter longer than \"{previous}\"")]
	NotSnowball { previous: String, next: String },
}
