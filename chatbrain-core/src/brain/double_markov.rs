use std::path::Path;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::corpus::{load_or_train, train_partials};
use super::persist::Persist;
use super::{Brain, assemble};
use crate::config::BrainConfig;
use crate::error::BrainError;
use crate::model::chain_model::{ChainModel, ChainSnapshot};
use crate::model::generator::{generate_sentence, half_limit};
use crate::text::tokenizer::has_non_word;
use crate::text::{extract_subject, process_string};

/// Brain growing a sentence on both sides of the prompt's subject.
///
/// Two chains of the same order are trained in lock-step: `forward` on the
/// token sequences, `backward` on the same sequences reversed. A reply is
/// made of a backward run from the subject (read back to front), followed
/// by a forward run from the subject. Each run gets half the length limit.
#[derive(Clone, Debug)]
pub struct DoubleMarkovBrain {
	backward: ChainModel,
	forward: ChainModel,
	length_limit: usize,
	config: BrainConfig,
}

/// Persisted form of a [`DoubleMarkovBrain`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DoubleMarkovSnapshot {
	pub backward: ChainSnapshot,
	pub forward: ChainSnapshot,
	pub length_limit: usize,
}

impl DoubleMarkovBrain {
	pub fn new(order: usize, length_limit: usize, config: BrainConfig) -> Self {
		let brain = Self {
			backward: ChainModel::new(order),
			forward: ChainModel::new(order),
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

	/// Chain trained on token sequences in reading order.
	pub fn forward(&self) -> &ChainModel {
		&self.forward
	}

	/// Chain trained on the same sequences reversed.
	pub fn backward(&self) -> &ChainModel {
		&self.backward
	}

	/// Turns a backward run into the prefix of the reply.
	///
	/// The run starts with the seed, which the forward run repeats, so its
	/// first `order` tokens go. A trailing separator goes too, as the reply
	/// must not open with punctuation. A run no longer than the seed gives
	/// an empty prefix. The rest is flipped back into reading order.
	fn prefix_from(&self, mut run: Vec<String>) -> Vec<String> {
		let order = self.backward.order();
		if run.len() <= order {
			return Vec::new();
		}

		run.drain(..order);
		if run.last().is_some_and(|t| has_non_word(t)) {
			run.pop();
		}
		run.reverse();
		run
	}
}

impl Brain for DoubleMarkovBrain {
	fn order(&self) -> usize {
		self.forward.order()
	}

	fn length_limit(&self) -> usize {
		self.length_limit
	}

	fn train(&mut self, data: &str) -> Result<(), BrainError> {
		log::debug!("Training data: {data:?}");
		let mut tokens = process_string(data);
		log::debug!("Processed into: {tokens:?}");

		self.forward.add(&tokens);
		tokens.reverse();
		log::debug!("Reversed: {tokens:?}");
		self.backward.add(&tokens);
		Ok(())
	}

	fn train_corpus(&mut self, lines: &[String]) -> Result<(), BrainError> {
		let order = self.forward.order();
		let partials = train_partials(lines, |chunk| {
			let mut forward = ChainModel::new(order);
			let mut backward = ChainModel::new(order);
			for line in chunk {
				let mut tokens = process_string(line);
				forward.add(&tokens);
				tokens.reverse();
				backward.add(&tokens);
			}
			(forward, backward)
		});
		for (forward, backward) in &partials {
			self.forward.merge(forward)?;
			self.backward.merge(backward)?;
		}
		Ok(())
	}

	fn generate_with(&self, prompt: &str, rng: &mut dyn RngCore) -> Result<String, BrainError> {
		log::debug!("Input: {prompt:?}");
		let tokens = process_string(prompt);

		let subject = if tokens.is_empty() {
			Vec::new()
		} else {
			extract_subject(&tokens, self.forward.order(), &self.config, rng)
		};
		log::debug!("Subject: {subject:?}");

		let max_tokens = half_limit(self.length_limit);
		let filter = &self.config.filter;
		let backward_run = generate_sentence(&self.backward, &subject, max_tokens, filter, rng)?;
		let forward_run = generate_sentence(&self.forward, &subject, max_tokens, filter, rng)?;
		log::debug!("Backward: {backward_run:?}, forward: {forward_run:?}");

		let mut sentence = self.prefix_from(backward_run);
		sentence.extend(forward_run);
		Ok(assemble(sentence))
	}
}

impl Persist for DoubleMarkovBrain {
	type Snapshot = DoubleMarkovSnapshot;

	fn export(&self) -> DoubleMarkovSnapshot {
		DoubleMarkovSnapshot {
			backward: self.backward.export(),
			forward: self.forward.export(),
			length_limit: self.length_limit,
		}
	}

	fn import(snapshot: DoubleMarkovSnapshot, config: BrainConfig) -> Result<Self, BrainError> {
		if snapshot.backward.order != snapshot.forward.order {
			return Err(BrainError::Deserialization(format!(
				"backward chain of order {} paired with forward chain of order {}",
				snapshot.backward.order, snapshot.forward.order
			)));
		}

		Ok(Self {
			backward: ChainModel::import(snapshot.backward)?,
			forward: ChainModel::import(snapshot.forward)?,
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
	use crate::config::ContentFilter;
	use crate::model::token_table::{END_TOKEN, START_TOKEN};
	use crate::text::tokenizer::is_word;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn strings(words: &[&str]) -> Vec<String> {
		words.iter().map(|w| (*w).to_owned()).collect()
	}

	#[test]
	fn test_train_feeds_both_chains() {
		let mut brain = DoubleMarkovBrain::new(1, 32, BrainConfig::default());
		brain.train("test data").unwrap();

		let forward = brain.forward().weights(&[START_TOKEN]).unwrap();
		assert_eq!(forward.get("test"), Some(&1));
		let backward = brain.backward().weights(&[START_TOKEN]).unwrap();
		assert_eq!(backward.get("data"), Some(&1));
		assert_eq!(brain.backward().weights(&["test"]).unwrap().get(END_TOKEN), Some(&1));
	}

	#[test]
	fn test_prefix_from() {
		let brain = DoubleMarkovBrain::new(1, 32, BrainConfig::default());
		let cases: &[(&[&str], &[&str])] = &[
			(&["subject", " ", "test"], &["test", " "]),
			(&["subject", " ", "test", " "], &["test", " "]),
			(&["subject"], &[]),
			(&[], &[]),
		];
		for (run, expected) in cases {
			assert_eq!(brain.prefix_from(strings(run)), strings(expected));
		}
	}

	#[test]
	fn test_runs_around_the_subject() {
		let mut brain = DoubleMarkovBrain::new(1, 32, BrainConfig::default());
		for data in ["test data test data", "data test data", "test data", "test subject data"] {
			brain.train(data).unwrap();
		}

		let filter = ContentFilter::default();
		for seed in 0..100 {
			let mut rng = StdRng::seed_from_u64(seed);
			let forward = generate_sentence(&brain.forward, &["subject"], half_limit(32), &filter, &mut rng).unwrap();
			let backward = generate_sentence(&brain.backward, &["subject"], half_limit(32), &filter, &mut rng).unwrap();

			assert!(forward.len() >= 3 && forward[..2] == ["subject", " "], "seed {seed}: {forward:?}");
			assert!(backward.len() >= 3 && backward[..2] == ["subject", " "], "seed {seed}: {backward:?}");

			// The seed shared with the forward run is dropped from the prefix
			let prefix = brain.prefix_from(backward.clone());
			assert!(prefix.len() >= 2 && prefix.len() < backward.len(), "seed {seed}: {prefix:?}");
			assert_eq!(prefix.last().map(String::as_str), Some(" "), "seed {seed}: {prefix:?}");
			assert!(prefix.first().is_some_and(|t| is_word(t)), "seed {seed}: {prefix:?}");
		}
	}

	#[test]
	fn test_import_rejects_mismatched_orders() {
		let mut snapshot = DoubleMarkovBrain::new(1, 32, BrainConfig::default()).export();
		snapshot.forward = ChainModel::new(2).export();
		let err = DoubleMarkovBrain::import(snapshot, BrainConfig::default()).unwrap_err();
		assert!(matches!(err, BrainError::Deserialization(_)));
	}
}
