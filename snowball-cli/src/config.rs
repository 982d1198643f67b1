use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::warn;
use snowball_core::error::SnowballError;
use snowball_core::model::corpus::CorpusSource;
use snowball_core::model::exclusion::ExclusionFilter;
use snowball_core::model::generation_config::{GenerationConfig, MinKeyBoundary};

/// Command-line options of the snowball poem generator
#[derive(Debug, Clone, Parser)]
#[command(name = "snowball", version)]
#[command(about = "Generate snowball poems, where each word is one letter longer than the last")]
pub struct Config {
    /// How many unique poems to create per seed phrase
    #[arg(short = 'n', long, default_value_t = 10_000)]
    pub target: usize,

    /// Failed poems to ignore before giving up
    #[arg(short = 'f', long = "failures", default_value_t = 100_000)]
    pub failure_budget: usize,

    /// Percentage chance to use longer word keys before shorter keys
    #[arg(short = 'P', long = "multi-key", default_value_t = 70)]
    pub multi_key_percentage: u32,

    /// Minimum word key size; 0 picks one random word per length instead
    #[arg(short = 'k', long, default_value_t = 1)]
    pub min_key_size: usize,

    /// Also stop growing when the longest key equals the minimum key size
    #[arg(long)]
    pub min_key_inclusive: bool,

    /// Begin poems at this word length
    #[arg(short = 'b', long, default_value_t = 1)]
    pub begin: usize,

    /// Reject poems whose last word is shorter than this
    #[arg(short = 'e', long)]
    pub end: Option<usize>,

    /// Exclude words containing any of these letters (lipograms)
    #[arg(short = 'x', long, value_name = "CHARS")]
    pub exclude: Option<String>,

    /// Minimum word length the exclusion applies to
    #[arg(short = 'X', long, default_value_t = 0)]
    pub exclude_min_length: usize,

    /// Read seed phrases from a file, one per line
    #[arg(short = 's', long, value_name = "FILE", conflicts_with = "stdin_delimiter")]
    pub seed_file: Option<PathBuf>,

    /// Read seed phrases from stdin, split on DELIM (default newline)
    #[arg(short = 'i', long = "stdin", value_name = "DELIM", num_args = 0..=1, default_missing_value = "\n")]
    pub stdin_delimiter: Option<char>,

    /// Corpus file, optionally weighted as PATH:WEIGHT (repeatable)
    #[arg(short = 'p', long = "corpus", value_name = "PATH[:WEIGHT]", default_value = "snowball-preprocessed.txt")]
    pub corpus: Vec<CorpusSource>,

    /// Use only the corpus lines as written, without indexing their sub-chains
    #[arg(long)]
    pub no_expand: bool,

    /// Cache the corpus tables (defaults to the first corpus with a .bin extension)
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    pub cache: Option<Option<PathBuf>>,

    /// Seed for the random number generator (for reproducible output)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the poems to stdout instead of to separate files
    #[arg(short = 'o', long)]
    pub stdout: bool,

    /// Do not log anything
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// More program information (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Batch options, with out-of-range values clamped the way the
    /// generator always has.
    pub fn generation_config(&self) -> Result<GenerationConfig, SnowballError> {
        let mut generation = GenerationConfig::default();
        generation.target = self.target;
        generation.failure_budget = self.failure_budget;
        generation.set_multi_key_percentage(clamp("multi-key percentage", self.multi_key_percentage, 0, 100))?;
        generation.set_min_key_size(clamp("minimum key size", self.min_key_size, 0, 10))?;
        generation.set_begin_length(clamp("begin length", self.begin, 1, usize::MAX))?;
        generation.set_end_length(self.end.map(|end| clamp("end length", end, 1, 100)))?;
        if self.min_key_inclusive {
            generation.min_key_boundary = MinKeyBoundary::AtOrBelow;
        }
        generation.exclusion = ExclusionFilter::new(self.exclude.as_deref().unwrap_or_default(), self.exclude_min_length);
        Ok(generation)
    }
}

fn clamp<T: Ord + Copy + std::fmt::Display>(name: &str, value: T, min: T, max: T) -> T {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("{} {} is out of range, using {}", name, value, clamped);
    }
    clamped
}
