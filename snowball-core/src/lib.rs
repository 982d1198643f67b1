//! Snowball poem generation library.
//!
//! A snowball is a word sequence where each word is exactly one letter
//! longer than the previous one. This crate provides:
//! - Corpus loading into forward/backward transition tables
//! - Key back-off and weighted sampling over those tables
//! - A walker that grows single poems, optionally around a seed phrase
//! - A batch generator with sanity checks and a failure budget
//!
//! Tables are built once and shared read-only by every generator.

/// Corpus tables and poem generation.
pub mod model;

/// Error types for table building and batch generation.
pub mod error;

/// File helpers (line loading, derived output paths).
pub mod io;
