use std::path::Path;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::corpus::{load_or_train, train_partials};
use super::persist::Persist;
use super::{Brain, assemble};
use crate::config::BrainConfig;
use crate::error::BrainError;
use crate::model::chain_model::{ChainModel, ChainSnapshot};
use crate::model::generator::generate_sentence;
use crate::text::{extract_subject, process_string};

/// Brain driving a single forward chain from the subject of the prompt.
///
/// The reply starts at the subject window and only grows forward, so the
/// whole length limit goes to that one run.
#[derive(Clone, Debug)]
pub struct MarkovBrain {
	chain: ChainModel,
	length_limit: usize,
	config: BrainConfig,
}

/// Persisted form of a [`MarkovBrain`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MarkovSnapshot {
	pub chain: ChainSnapshot,
	pub length_limit: usize,
}

impl MarkovBrain {
	pub fn new(order: usize, length_limit: usize, config: BrainConfig) -> Self {
		let brain = Self {
			chain: ChainModel::new(order),
			length_limit,
			config,
		};
		log::debug!("Braindump: {brain:?}");
		brain
	}

	/// Builds a brain from a corpus file (one example per line), reusing
	/// the `.bin` cache next to it when possible.
	pub fn from_corpus_file<P: AsRef<Path>>(
		path: P,
		order: usize,
		length_limit: usize,
		config: BrainConfig,
	) -> Result<Self, BrainError> {
		load_or_train(path, Self::new(order, length_limit, config))
	}

	/// The forward chain driving generation.
	pub fn chain(&self) -> &ChainModel {
		&self.chain
	}
}

impl Brain for MarkovBrain {
	fn order(&self) -> usize {
		self.chain.order()
	}

	fn length_limit(&self) -> usize {
		self.length_limit
	}

	fn train(&mut self, data: &str) -> Result<(), BrainError> {
		log::debug!("Training data: {data:?}");
		let tokens = process_string(data);
		log::debug!("Processed into: {tokens:?}");
		self.chain.add(&tokens);
		Ok(())
	}

	fn train_corpus(&mut self, lines: &[String]) -> Result<(), BrainError> {
		let order = self.chain.order();
		let partials = train_partials(lines, |chunk| {
			let mut chain = ChainModel::new(order);
			for line in chunk {
				chain.add(&process_string(line));
			}
			chain
		});
		for partial in &partials {
			self.chain.merge(partial)?;
		}
		Ok(())
	}

	fn generate_with(&self, prompt: &str, rng: &mut dyn RngCore) -> Result<String, BrainError> {
		log::debug!("Input: {prompt:?}");
		let tokens = process_string(prompt);
		log::debug!("Processed into: {tokens:?}");

		let subject = if tokens.is_empty() {
			Vec::new()
		} else {
			extract_subject(&tokens, self.chain.order(), &self.config, rng)
		};

		let sentence = generate_sentence(&self.chain, &subject, self.length_limit, &self.config.filter, rng)?;
		Ok(assemble(sentence))
	}
}

impl Persist for MarkovBrain {
	type Snapshot = MarkovSnapshot;

	fn export(&self) -> MarkovSnapshot {
		MarkovSnapshot {
			chain: self.chain.export(),
			length_limit: self.length_limit,
		}
	}

	fn import(snapshot: MarkovSnapshot, config: BrainConfig) -> Result<Self, BrainError> {
		Ok(Self {
			chain: ChainModel::import(snapshot.chain)?,
			length_limit: snapshot.length_limit,
			config,
		})
	}

	fn config(&self) -> &BrainConfig {
		&self.config
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn new_brain(order: usize, length: usize) -> MarkovBrain {
		let mut brain = MarkovBrain::new(order, length, BrainConfig::default());
		for data in ["test data test data", "data test data", "test data"] {
			brain.train(data).unwrap();
		}
		brain
	}

	#[test]
	fn test_init() {
		for order in [0, 1, 2, 100] {
			let brain = MarkovBrain::new(order, 32, BrainConfig::default());
			assert_eq!(brain.order(), order);
			assert_eq!(brain.length_limit(), 32);
		}
	}

	#[test]
	fn test_train() {
		for order in [1, 2] {
			for input in ["word", "two words", "two, words", "1 one", ""] {
				let mut brain = MarkovBrain::new(order, 32, BrainConfig::default());
				assert!(brain.train(input).is_ok(), "input {input:?}");
			}
		}
	}

	#[test]
	fn test_generate() {
		let cases: &[(&str, usize)] = &[
			("", 1),
			("", 2),
			("test", 1),
			("test", 2),
			("data", 1),
			("test data", 1),
			("test data test", 1),
		];
		for seed in 0..20 {
			let mut rng = StdRng::seed_from_u64(seed);
			for (prompt, order) in cases {
				let brain = new_brain(*order, 32);
				let got = brain.generate_with(prompt, &mut rng).unwrap();
				assert!(got.starts_with("Test") || got.starts_with("Data"), "{prompt:?}: {got:?}");
				assert!(got.len() <= 32 * 5);
			}
		}
	}

	#[test]
	fn test_generate_unknown_word() {
		let mut rng = StdRng::seed_from_u64(0);
		for order in [1, 2] {
			let brain = new_brain(order, 32);
			assert_eq!(brain.generate_with("testing", &mut rng).unwrap(), "Testing");
		}
	}

	#[test]
	fn test_generate_degenerate_orders() {
		let mut rng = StdRng::seed_from_u64(0);
		for order in [0, 100] {
			let brain = new_brain(order, 32);
			assert!(brain.generate_with("test", &mut rng).is_ok());
			assert!(brain.generate_with("", &mut rng).is_ok());
		}
	}

	#[test]
	fn test_json_round_trip() {
		let brain = new_brain(1, 31);
		let json = brain.to_json().unwrap();
		let restored = MarkovBrain::from_json(&json, BrainConfig::default()).unwrap();
		assert_eq!(restored.export(), brain.export());
		assert_eq!(restored.length_limit(), 31);
	}

	#[test]
	fn test_restore_keeps_state_on_error() {
		let mut brain = new_brain(1, 32);
		let before = brain.export();
		let err = brain.restore_json(r#"{{"int":2,"spool_map":{},"freq_mat":{}}"#).unwrap_err();
		assert!(matches!(err, BrainError::Deserialization(_)));
		assert_eq!(brain.export(), before);
	}
}
