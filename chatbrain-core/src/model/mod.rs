//! Order-N Markov chains over tokens.
//!
//! - Token interning (`TokenTable`, internal)
//! - Transition counts and weighted sampling (`State`, internal)
//! - The chain model itself (`ChainModel`)
//! - The sentence generator driving one chain (`generator`)

/// Order-N chain model with export / import and merging.
pub mod chain_model;

/// Single-chain sentence generation from a seed.
pub mod generator;

/// Outgoing transitions of one context.
///
/// Tracks occurrence counts and supports weighted random sampling.
/// This module is not exposed publicly.
mod state;

/// Token <-> ID table and the sentinels.
pub mod token_table;

pub use chain_model::{ChainModel, ChainSnapshot, TransitionSnapshot};
pub use token_table::{END_TOKEN, START_TOKEN, TokenId};
