use thiserror::Error;

/// Errors produced by the chain models and the brains built on top of them.
///
/// `UnknownContext` is the only expected, recoverable condition: the sentence
/// generator turns it into an end of sentence. Everything else is surfaced
/// to the caller.
#[derive(Debug, Error)]
pub enum BrainError {
	/// The context handed to `ChainModel::generate` was never observed.
	#[error("Unknown context: {0:?}")]
	UnknownContext(Vec<String>),

	/// An internal invariant does not hold (wrong context length, dangling token ID...).
	#[error("Internal error: {0}")]
	Internal(String),

	/// Persisted state could not be decoded or failed validation.
	#[error("Deserialization error: {0}")]
	Deserialization(String),

	/// A configuration value was rejected.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for BrainError {
	fn from(e: serde_json::Error) -> Self {
		BrainError::Deserialization(e.to_string())
	}
}

impl From<postcard::Error> for BrainError {
	fn from(e: postcard::Error) -> Self {
		BrainError::Deserialization(e.to_string())
	}
}

impl BrainError {
	/// Returns `true` for the "no valid continuation" condition.
	pub fn is_unknown_context(&self) -> bool {
		matches!(self, BrainError::UnknownContext(_))
	}
}
