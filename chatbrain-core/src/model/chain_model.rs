use std::collections::{BTreeMap, HashMap};
use std::iter;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::State;
use super::token_table::{END_ID, START_ID, TokenId, TokenTable};
use crate::error::BrainError;

/// An order-N Markov chain over tokens.
///
/// The model stores, for every context of `order` consecutive tokens seen
/// during training, how often each token followed it. Generation samples
/// a successor with probability proportional to those counts.
///
/// # Responsibilities
/// - Intern tokens into dense IDs
/// - Accumulate transition counts for each context
/// - Sample the next token given a context
/// - Merge with another model of the same order
/// - Export to / import from a [`ChainSnapshot`]
///
/// # Invariants
/// - `order` never changes after construction
/// - Every key of `states` holds exactly `order` IDs
/// - Every ID in `states` is registered in `tokens`
///
/// An order of 0 gives a model without context: every token is sampled from
/// the single distribution of all tokens seen, sentinel `END` included.
#[derive(Clone, Debug)]
pub struct ChainModel {
	order: usize,
	tokens: TokenTable,
	states: HashMap<Vec<TokenId>, State>,
}

impl ChainModel {
	/// Creates an empty chain of the given order.
	pub fn new(order: usize) -> Self {
		Self {
			order,
			tokens: TokenTable::new(),
			states: HashMap::new(),
		}
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of distinct tokens known, sentinels included.
	pub fn vocabulary_size(&self) -> usize {
		self.tokens.len()
	}

	/// Number of distinct contexts observed.
	pub fn context_count(&self) -> usize {
		self.states.len()
	}

	/// Learns from one token sequence.
	///
	/// The sequence is padded with `order` `START` sentinels in front and one
	/// `END` sentinel at the back, then every window of `order + 1` tokens
	/// records one transition. An empty sequence still records the
	/// `START^order -> END` transition.
	pub fn add<S: AsRef<str>>(&mut self, sequence: &[S]) {
		let mut ids = Vec::with_capacity(self.order + sequence.len() + 1);
		ids.extend(iter::repeat_n(START_ID, self.order));
		for token in sequence {
			ids.push(self.tokens.intern(token.as_ref()));
		}
		ids.push(END_ID);

		for window in ids.windows(self.order + 1) {
			let (context, next) = window.split_at(self.order);
			self.states.entry(context.to_vec()).or_default().add_transition(next[0]);
		}
	}

	/// Samples the token following `context`.
	///
	/// # Errors
	/// - [`BrainError::UnknownContext`] if the context was never observed
	///   (this includes contexts holding never-seen tokens).
	/// - [`BrainError::Internal`] if `context` does not hold exactly `order`
	///   tokens, or if the table is inconsistent.
	pub fn generate<S, R>(&self, context: &[S], rng: &mut R) -> Result<&str, BrainError>
	where
		S: AsRef<str>,
		R: Rng + ?Sized,
	{
		let key = self.context_ids(context)?;
		let state = self.states.get(&key).ok_or_else(|| Self::unknown(context))?;

		let next = state.predict(rng).ok_or_else(|| {
			BrainError::Internal(format!("context {:?} has no transitions", Self::owned(context)))
		})?;

		self.tokens
			.token(next)
			.ok_or_else(|| BrainError::Internal(format!("token ID {next} is not registered")))
	}

	/// Returns the successor counts of `context`, keyed by token.
	///
	/// Returns `None` if the context was never observed.
	pub fn weights<S: AsRef<str>>(&self, context: &[S]) -> Option<HashMap<String, u64>> {
		let key = self.context_ids(context).ok()?;
		let state = self.states.get(&key)?;
		state
			.counts()
			.iter()
			.map(|(id, count)| Some((self.tokens.token(*id)?.to_owned(), *count)))
			.collect()
	}

	/// Every observed context, as token strings.
	pub fn contexts(&self) -> Vec<Vec<String>> {
		self.states
			.keys()
			.map(|key| {
				key.iter()
					.filter_map(|id| self.tokens.token(*id))
					.map(str::to_owned)
					.collect()
			})
			.collect()
	}

	/// Merges another chain into this one.
	///
	/// Tokens unknown to this chain are registered with fresh IDs; the IDs
	/// already handed out are kept. Occurrence counts are summed.
	///
	/// # Errors
	/// Returns an error if the orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), BrainError> {
		if self.order != other.order {
			return Err(BrainError::InvalidConfig(format!(
				"cannot merge a chain of order {} into a chain of order {}",
				other.order, self.order
			)));
		}

		let remap: Vec<TokenId> = other.tokens.tokens().iter().map(|t| self.tokens.intern(t)).collect();
		let dangling = || BrainError::Internal("merged chain references an unregistered token".to_owned());

		for (context, state) in &other.states {
			let key = context
				.iter()
				.map(|id| remap.get(*id).copied())
				.collect::<Option<Vec<_>>>()
				.ok_or_else(dangling)?;
			self.states.entry(key).or_default().merge(state, &remap).ok_or_else(dangling)?;
		}

		Ok(())
	}

	/// Exports the full learned state.
	///
	/// Transitions are sorted by context so that equal models export equal snapshots.
	pub fn export(&self) -> ChainSnapshot {
		let mut transitions: Vec<TransitionSnapshot> = self
			.states
			.iter()
			.map(|(context, state)| TransitionSnapshot {
				context: context.clone(),
				next: state.counts().clone(),
			})
			.collect();
		transitions.sort_by(|a, b| a.context.cmp(&b.context));

		ChainSnapshot {
			order: self.order,
			tokens: self.tokens.tokens().to_vec(),
			transitions,
		}
	}

	/// Rebuilds a chain from a snapshot, validating it thoroughly.
	///
	/// # Errors
	/// Returns [`BrainError::Deserialization`] if the snapshot breaks any
	/// invariant of the model.
	pub fn import(snapshot: ChainSnapshot) -> Result<Self, BrainError> {
		let ChainSnapshot { order, tokens, transitions } = snapshot;
		let tokens = TokenTable::from_tokens(tokens)?;
		let in_range = |id: &TokenId| *id < tokens.len();

		let mut states = HashMap::with_capacity(transitions.len());
		for transition in transitions {
			if transition.context.len() != order {
				return Err(BrainError::Deserialization(format!(
					"context {:?} does not match order {order}",
					transition.context
				)));
			}
			if !transition.context.iter().all(in_range) || !transition.next.keys().all(in_range) {
				return Err(BrainError::Deserialization(format!(
					"transition from {:?} references an unknown token",
					transition.context
				)));
			}
			if transition.next.is_empty() || transition.next.values().any(|count| *count == 0) {
				return Err(BrainError::Deserialization(format!(
					"transition from {:?} has an empty or zero count",
					transition.context
				)));
			}
			if states.insert(transition.context.clone(), State::from_counts(transition.next)).is_some() {
				return Err(BrainError::Deserialization(format!(
					"duplicate context {:?}",
					transition.context
				)));
			}
		}

		Ok(Self { order, tokens, states })
	}

	/// Maps a context to IDs, checking its length.
	fn context_ids<S: AsRef<str>>(&self, context: &[S]) -> Result<Vec<TokenId>, BrainError> {
		if context.len() != self.order {
			return Err(BrainError::Internal(format!(
				"context of length {} given to a chain of order {}",
				context.len(),
				self.order
			)));
		}
		context
			.iter()
			.map(|token| self.tokens.id(token.as_ref()))
			.collect::<Option<Vec<_>>>()
			.ok_or_else(|| Self::unknown(context))
	}

	fn unknown<S: AsRef<str>>(context: &[S]) -> BrainError {
		BrainError::UnknownContext(Self::owned(context))
	}

	fn owned<S: AsRef<str>>(context: &[S]) -> Vec<String> {
		context.iter().map(|t| t.as_ref().to_owned()).collect()
	}
}

/// Self-contained persisted form of a [`ChainModel`].
///
/// `tokens[id]` is the token owning `id`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChainSnapshot {
	pub order: usize,
	pub tokens: Vec<String>,
	pub transitions: Vec<TransitionSnapshot>,
}

/// Successor counts of one context.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransitionSnapshot {
	pub context: Vec<TokenId>,
	pub next: BTreeMap<TokenId, u64>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::token_table::{END_TOKEN, START_TOKEN};
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn trained(order: usize, data: &[&[&str]]) -> ChainModel {
		let mut chain = ChainModel::new(order);
		for sequence in data {
			chain.add(*sequence);
		}
		chain
	}

	#[test]
	fn test_add_records_padded_transitions() {
		let chain = trained(1, &[&["test", " ", "data"]]);
		let weights = |context: &[&str]| chain.weights(context).unwrap();

		assert_eq!(weights(&[START_TOKEN]), HashMap::from([("test".to_owned(), 1)]));
		assert_eq!(weights(&["test"]), HashMap::from([(" ".to_owned(), 1)]));
		assert_eq!(weights(&["data"]), HashMap::from([(END_TOKEN.to_owned(), 1)]));
		assert_eq!(chain.context_count(), 4);
	}

	#[test]
	fn test_vocabulary_counts_sentinels_and_distinct_tokens() {
		assert_eq!(ChainModel::new(2).vocabulary_size(), 2);

		let chain = trained(1, &[&["a", " ", "b", " ", "a"], &["b"]]);
		assert_eq!(chain.vocabulary_size(), 5);
	}

	#[test]
	fn test_add_empty_sequence() {
		let empty: &[&str] = &[];
		for order in 0..3 {
			let chain = trained(order, &[empty]);
			let context = vec![START_TOKEN; order];
			assert_eq!(chain.weights(&context), Some(HashMap::from([(END_TOKEN.to_owned(), 1)])));
		}
	}

	#[test]
	fn test_counts_accumulate() {
		let chain = trained(1, &[&["a", " ", "b"], &["a", " ", "c"], &["a", " ", "b"]]);
		let weights = chain.weights(&[" "]).unwrap();
		assert_eq!(weights.get("b"), Some(&2));
		assert_eq!(weights.get("c"), Some(&1));
	}

	#[test]
	fn test_generate_unknown_context() {
		let chain = trained(2, &[&["a", " ", "b"]]);
		let mut rng = StdRng::seed_from_u64(0);

		let err = chain.generate(&["b", "a"], &mut rng).unwrap_err();
		assert!(err.is_unknown_context());

		let err = chain.generate(&["never", "seen"], &mut rng).unwrap_err();
		assert!(err.is_unknown_context());
	}

	#[test]
	fn test_generate_wrong_context_length_is_internal() {
		let chain = trained(2, &[&["a", " ", "b"]]);
		let mut rng = StdRng::seed_from_u64(0);
		let err = chain.generate(&["a"], &mut rng).unwrap_err();
		assert!(matches!(err, BrainError::Internal(_)));
	}

	#[test]
	fn test_generate_follows_training() {
		let chain = trained(2, &[&["a", " ", "b"]]);
		let mut rng = StdRng::seed_from_u64(9);
		assert_eq!(chain.generate(&[START_TOKEN, START_TOKEN], &mut rng).unwrap(), "a");
		assert_eq!(chain.generate(&["a", " "], &mut rng).unwrap(), "b");
		assert_eq!(chain.generate(&[" ", "b"], &mut rng).unwrap(), END_TOKEN);
	}

	#[test]
	fn test_order_zero_is_context_free() {
		let chain = trained(0, &[&["a", " ", "b"]]);
		let empty: [&str; 0] = [];
		let weights = chain.weights(&empty).unwrap();
		assert_eq!(weights.len(), 4);
		assert_eq!(weights.get(END_TOKEN), Some(&1));

		let mut rng = StdRng::seed_from_u64(5);
		assert!(chain.generate(&empty, &mut rng).is_ok());
	}

	#[test]
	fn test_export_import_preserves_weights() {
		let chain = trained(2, &[&["test", " ", "data"], &["test", " ", "node"], &["data"]]);
		let restored = ChainModel::import(chain.export()).unwrap();

		assert_eq!(restored.order(), 2);
		assert_eq!(restored.context_count(), chain.context_count());
		for context in chain.contexts() {
			assert_eq!(restored.weights(&context), chain.weights(&context));
		}
		assert_eq!(restored.export(), chain.export());
	}

	#[test]
	fn test_import_rejects_bad_snapshots() {
		let good = trained(1, &[&["test"]]).export();

		let mut bad_order = good.clone();
		bad_order.order = 2;
		assert!(matches!(ChainModel::import(bad_order), Err(BrainError::Deserialization(_))));

		let mut bad_id = good.clone();
		bad_id.transitions[0].next.insert(99, 1);
		assert!(matches!(ChainModel::import(bad_id), Err(BrainError::Deserialization(_))));

		let mut zero_count = good.clone();
		zero_count.transitions[0].next.insert(0, 0);
		assert!(matches!(ChainModel::import(zero_count), Err(BrainError::Deserialization(_))));

		let mut duplicate = good.clone();
		duplicate.transitions.push(duplicate.transitions[0].clone());
		assert!(matches!(ChainModel::import(duplicate), Err(BrainError::Deserialization(_))));

		let mut no_sentinels = good;
		no_sentinels.tokens.remove(0);
		assert!(ChainModel::import(no_sentinels).is_err());
	}

	#[test]
	fn test_merge_equals_sequential_training() {
		let sequential = trained(1, &[&["a", " ", "b"], &["b", " ", "c"]]);

		let mut left = trained(1, &[&["a", " ", "b"]]);
		let right = trained(1, &[&["b", " ", "c"]]);
		left.merge(&right).unwrap();

		assert_eq!(left.context_count(), sequential.context_count());
		for context in sequential.contexts() {
			assert_eq!(left.weights(&context), sequential.weights(&context));
		}
	}

	#[test]
	fn test_merge_order_mismatch() {
		let mut left = ChainModel::new(1);
		let right = ChainModel::new(2);
		assert!(matches!(left.merge(&right), Err(BrainError::InvalidConfig(_))));
	}
}
