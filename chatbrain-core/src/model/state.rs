use std::collections::BTreeMap;

use rand::Rng;

use super::token_table::TokenId;

/// Outgoing transitions of one context.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - Counts only ever grow
///
/// Transitions are kept ordered by token ID so that a seeded random source
/// always walks them in the same order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct State {
	/// Example: { 4 => 42, 7 => 3 }
	transitions: BTreeMap<TokenId, u64>,
}

impl State {
	/// Rebuilds a state from persisted counts.
	pub fn from_counts(transitions: BTreeMap<TokenId, u64>) -> Self {
		Self { transitions }
	}

	/// Records an occurrence of a transition toward `next`.
	pub fn add_transition(&mut self, next: TokenId) {
		self.add_occurrences(next, 1);
	}

	fn add_occurrences(&mut self, next: TokenId, occurrence: u64) {
		*self.transitions.entry(next).or_insert(0) += occurrence;
	}

	/// Picks the next token using weighted random sampling.
	///
	/// The probability of selecting a token is proportional to its
	/// occurrence count.
	///
	/// Returns `None` if the state has no transitions.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<TokenId> {
		let total = self.total();
		if total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..total);
		for (next, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(*next);
			}
			r -= occurrence;
		}

		None
	}

	/// Sum of all occurrence counts.
	pub fn total(&self) -> u64 {
		self.transitions.values().sum()
	}

	pub fn counts(&self) -> &BTreeMap<TokenId, u64> {
		&self.transitions
	}

	/// Adds the counts of `other` into this state.
	///
	/// `remap` translates the IDs of `other` into IDs of this state's model.
	/// Returns `None` if an ID has no translation.
	pub fn merge(&mut self, other: &Self, remap: &[TokenId]) -> Option<()> {
		for (next, occurrence) in &other.transitions {
			self.add_occurrences(*remap.get(*next)?, *occurrence);
		}
		Some(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn test_empty_state_predicts_nothing() {
		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(State::default().predict(&mut rng), None);
	}

	#[test]
	fn test_single_transition_is_certain() {
		let mut state = State::default();
		state.add_transition(5);
		state.add_transition(5);
		let mut rng = StdRng::seed_from_u64(3);
		for _ in 0..20 {
			assert_eq!(state.predict(&mut rng), Some(5));
		}
		assert_eq!(state.total(), 2);
	}

	#[test]
	fn test_sampling_follows_weights() {
		let mut state = State::default();
		for _ in 0..9 {
			state.add_transition(2);
		}
		state.add_transition(3);

		let mut rng = StdRng::seed_from_u64(42);
		let draws = 10_000;
		let heavy = (0..draws).filter(|_| state.predict(&mut rng) == Some(2)).count();
		// Expected 9000
		assert!((8_500..9_500).contains(&heavy), "got {heavy}");
	}

	#[test]
	fn test_merge_with_remap() {
		let mut left = State::default();
		left.add_transition(2);

		let mut right = State::default();
		right.add_transition(0);
		right.add_transition(1);

		// right's 0 is left's 2, right's 1 is left's 7
		left.merge(&right, &[2, 7]).unwrap();
		assert_eq!(left.counts().get(&2), Some(&2));
		assert_eq!(left.counts().get(&7), Some(&1));

		assert!(left.merge(&right, &[2]).is_none());
	}
}
