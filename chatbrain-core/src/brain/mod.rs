//! Brains: the user-facing text generators.
//!
//! A brain owns one or more chain models, learns from free text with
//! [`Brain::train`] and answers prompts with [`Brain::generate`].
//!
//! - [`MarkovBrain`] drives a single forward chain from the prompt's subject
//! - [`DoubleMarkovBrain`] grows a sentence on both sides of the subject

use rand::RngCore;

use crate::error::BrainError;
use crate::text::tokenizer::capitalize;

/// Parallel corpus training and `.bin` caching.
pub mod corpus;

/// Bidirectional (forward + backward) brain.
pub mod double_markov;

/// Single forward-chain brain.
pub mod markov;

/// JSON / binary persistence shared by the brains.
pub mod persist;

pub use double_markov::{DoubleMarkovBrain, DoubleMarkovSnapshot};
pub use markov::{MarkovBrain, MarkovSnapshot};
pub use persist::Persist;

/// Common interface of every brain.
///
/// A brain is not synchronized internally: callers sharing one between
/// threads must serialize `train` calls themselves (e.g. behind a `Mutex`).
pub trait Brain {
	/// Number of preceding tokens the chains condition on.
	fn order(&self) -> usize;

	/// Upper bound on the number of tokens in a generated sentence.
	fn length_limit(&self) -> usize;

	/// Learns from one training example.
	fn train(&mut self, data: &str) -> Result<(), BrainError>;

	/// Learns from many training examples, one per line, using every CPU.
	///
	/// The learned distributions are the same as training line by line.
	fn train_corpus(&mut self, lines: &[String]) -> Result<(), BrainError>;

	/// Answers `prompt` using `rng` for every random decision.
	fn generate_with(&self, prompt: &str, rng: &mut dyn RngCore) -> Result<String, BrainError>;

	/// Answers `prompt` using the thread-local random source.
	fn generate(&self, prompt: &str) -> Result<String, BrainError> {
		self.generate_with(prompt, &mut rand::rng())
	}
}

/// Joins generated tokens into the final reply, capitalizing its first token.
pub(crate) fn assemble(mut tokens: Vec<String>) -> String {
	if let Some(first) = tokens.first_mut() {
		*first = capitalize(first);
	}
	tokens.concat()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_assemble() {
		let tokens = vec!["test".to_owned(), " ".to_owned(), "data".to_owned()];
		assert_eq!(assemble(tokens), "Test data");
		assert_eq!(assemble(Vec::new()), "");
	}
}
