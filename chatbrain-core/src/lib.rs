//! Markov-chain chat brains.
//!
//! This crate learns word-level transition statistics from short text
//! fragments and generates new sentences, optionally anchored on a subject
//! word picked from a prompt. It provides:
//! - A tokenizer keeping separators as tokens, and subject extraction
//! - Order-N chain models with weighted sampling and persistence
//! - A forward-only brain and a bidirectional brain built on them
//! - JSON / binary persistence and parallel corpus training

/// Brains: training, generation, persistence.
pub mod brain;

/// Collaborator configuration (stopwords, mention prefix, content filter).
pub mod config;

/// Error type shared by the whole crate.
pub mod error;

/// Chain models and the sentence generator driving them.
pub mod model;

/// Tokenization and subject extraction.
pub mod text;

/// I/O utilities (file loading, atomic writes, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use brain::{Brain, DoubleMarkovBrain, MarkovBrain, Persist};
pub use config::{BrainConfig, ContentFilter};
pub use error::BrainError;
