//! Snowball model and generation pipeline.
//!
//! Data flows one way:
//! corpus sources → `CorpusTables` → `KeyResolver` + `WeightedSampler`
//! → `SnowballWalker` → `PoemBatchGenerator`.

/// Structured word-run keys and growth direction.
pub mod word_key;

/// Corpus sources (path + weight) and per-line snowball records.
///
/// Handles line validation and sub-chain expansion.
pub mod corpus;

/// Candidate multisets, transition tables and the word-length index.
pub mod transition_table;

/// Forward/backward tables plus length index, built in parallel from
/// weighted sources and optionally cached on disk.
pub mod corpus_tables;

/// Lipogram filter (forbidden characters above a length threshold).
pub mod exclusion;

/// Longest-to-shortest key back-off for one direction.
pub mod resolver;

/// Candidate pool construction and weighted pick.
pub mod sampler;

/// Starting and middle seed phrases.
pub mod seed;

/// Batch options and their validation.
pub mod generation_config;

/// Single-poem state machine.
pub mod walker;

/// Batch loop, sanity checks and parallel multi-seed runs.
pub mod generator;
