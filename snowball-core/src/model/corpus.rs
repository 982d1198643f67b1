use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, SnowballError};
use crate::io::get_filename;

/// Number of letters in a word (UTF-8 aware).
pub fn word_length(word: &str) -> usize {
	word.chars().count()
}

/// A corpus file together with its sampling weight.
///
/// # Invariants
/// - `weight >= 1`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CorpusSource {
	path: PathBuf,
	weight: u32,
}

impl CorpusSource {
	/// Creates a weighted source.
	///
	/// # Errors
	/// Returns an error if `weight` is 0.
	pub fn new<P: AsRef<Path>>(path: P, weight: u32) -> Result<Self, SnowballError> {
		if weight == 0 {
			return Err(SnowballError::Config(format!(
				"corpus weight for {} must be at least 1",
				path.as_ref().display()
			)));
		}
		Ok(Self { path: path.as_ref().to_path_buf(), weight })
	}

	/// Creates a source with the default weight of 1.
	pub fn unweighted<P: AsRef<Path>>(path: P) -> Self {
		Self { path: path.as_ref().to_path_buf(), weight: 1 }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn weight(&self) -> u32 {
		self.weight
	}

	/// Short display name (file stem), falling back to the full path.
	pub fn name(&self) -> String {
		get_filename(&self.path).unwrap_or_else(|_| self.path.display().to_string())
	}
}

/// Parses `PATH` or `PATH:WEIGHT`.
///
/// The weight suffix is only taken when it parses as an integer, so paths
/// that contain a colon (`C:\corpus.txt`) still work unweighted.
impl FromStr for CorpusSource {
	type Err = SnowballError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Err(SnowballError::Config("corpus path cannot be empty".to_owned()));
		}
		match s.rsplit_once(':') {
			Some((path, weight)) if !path.is_empty() => match weight.parse::<u32>() {
				Ok(weight) => Self::new(path, weight),
				Err(_) => Ok(Self::unweighted(s)),
			},
			_ => Ok(Self::unweighted(s)),
		}
	}
}

/// One accepted corpus run: an ascending-by-one-letter chain of words.
///
/// # Invariants
/// - At least two words
/// - Every word is lowercase alphabetic
/// - `len(words[i + 1]) == len(words[i]) + 1`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusRecord {
	words: Vec<String>,
}

impl CorpusRecord {
	/// Splits one corpus line into its snowballing runs.
	///
	/// Words are lowercased. A non-alphabetic word, or a word that is not
	/// exactly one letter longer than its predecessor, ends the current run;
	/// each break is reported alongside the records. Runs of a single word
	/// carry no transition and are dropped. Blank lines yield nothing.
	pub fn split_line(line: &str) -> (Vec<Self>, Vec<RecordError>) {
		let mut records = Vec::new();
		let mut breaks = Vec::new();
		let mut run: Vec<String> = Vec::new();

		for word in line.split_whitespace() {
			if !word.chars().all(char::is_alphabetic) {
				breaks.push(RecordError::NotAlphabetic(word.to_owned()));
				Self::close_run(&mut run, &mut records);
				continue;
			}
			let word = word.to_lowercase();
			if let Some(previous) = run.last() {
				if word_length(&word) != word_length(previous) + 1 {
					breaks.push(RecordError::NotSnowball { previous: previous.clone(), next: word.clone() });
					Self::close_run(&mut run, &mut records);
				}
			}
			run.push(word);
		}
		Self::close_run(&mut run, &mut records);

		(records, breaks)
	}

	fn close_run(run: &mut Vec<String>, records: &mut Vec<Self>) {
		let words = std::mem::take(run);
		if words.len() > 1 {
			records.push(Self { words });
		}
	}

	pub fn words(&self) -> &[String] {
		&self.words
	}

	/// All words except the last: the key under which `last()` is recorded
	/// in the forward table.
	pub fn forward_key(&self) -> &[String] {
		&self.words[..self.words.len() - 1]
	}

	/// All words except the first: the key under which `first()` is
	/// recorded in the backward table.
	pub fn backward_key(&self) -> &[String] {
		&self.words[1..]
	}

	pub fn first(&self) -> &str {
		&self.words[0]
	}

	pub fn last(&self) -> &str {
		&self.words[self.words.len() - 1]
	}

	/// Every contiguous run of the record, longest runs first for each
	/// starting word.
	///
	/// `"a am jam"` yields `a am jam`, `a am`, `a`, `am jam`, `am`, `jam`.
	pub fn sub_chains(&self) -> impl Iterator<Item = &[String]> {
		let n = self.words.len();
		(0..n).flat_map(move |start| (start + 1..=n).rev().map(move |end| &self.words[start..end]))
	}
}
