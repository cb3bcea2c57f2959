use std::collections::HashMap;

use crate::error::BrainError;

/// Dense integer identifier of a token inside one chain model.
pub type TokenId = usize;

/// Sentinel padding the front of every trained sequence.
pub const START_TOKEN: &str = "START";
/// Sentinel closing every trained sequence.
pub const END_TOKEN: &str = "END";

pub(crate) const START_ID: TokenId = 0;
pub(crate) const END_ID: TokenId = 1;

/// Bijective mapping between token strings and their IDs.
///
/// The two sentinels are registered first and always own IDs 0 and 1.
/// IDs are handed out in order of first sight and never change afterwards.
#[derive(Clone, Debug)]
pub(crate) struct TokenTable {
	tokens: Vec<String>,
	ids: HashMap<String, TokenId>,
}

impl TokenTable {
	pub fn new() -> Self {
		let mut table = Self {
			tokens: Vec::new(),
			ids: HashMap::new(),
		};
		table.intern(START_TOKEN);
		table.intern(END_TOKEN);
		table
	}

	/// Rebuilds a table from its ID-ordered token list.
	///
	/// # Errors
	/// Fails if the sentinels are not in place or a token appears twice.
	pub fn from_tokens(tokens: Vec<String>) -> Result<Self, BrainError> {
		if tokens.get(START_ID).map(String::as_str) != Some(START_TOKEN)
			|| tokens.get(END_ID).map(String::as_str) != Some(END_TOKEN)
		{
			return Err(BrainError::Deserialization(
				"token table must start with the START and END sentinels".to_owned(),
			));
		}

		let mut ids = HashMap::with_capacity(tokens.len());
		for (id, token) in tokens.iter().enumerate() {
			if ids.insert(token.clone(), id).is_some() {
				return Err(BrainError::Deserialization(format!("duplicate token {token:?}")));
			}
		}

		Ok(Self { tokens, ids })
	}

	/// Returns the ID of `token`, registering it on first sight.
	pub fn intern(&mut self, token: &str) -> TokenId {
		if let Some(id) = self.ids.get(token) {
			return *id;
		}
		let id = self.tokens.len();
		self.tokens.push(token.to_owned());
		self.ids.insert(token.to_owned(), id);
		id
	}

	pub fn id(&self, token: &str) -> Option<TokenId> {
		self.ids.get(token).copied()
	}

	pub fn token(&self, id: TokenId) -> Option<&str> {
		self.tokens.get(id).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	/// Tokens in ID order.
	pub fn tokens(&self) -> &[String] {
		&self.tokens
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sentinels_first() {
		let table = TokenTable::new();
		assert_eq!(table.len(), 2);
		assert_eq!(table.id(START_TOKEN), Some(START_ID));
		assert_eq!(table.id(END_TOKEN), Some(END_ID));
	}

	#[test]
	fn test_intern_is_stable() {
		let mut table = TokenTable::new();
		let test = table.intern("test");
		let space = table.intern(" ");
		assert_eq!(table.intern("test"), test);
		assert_eq!(table.intern(" "), space);
		assert_ne!(test, space);
		assert_eq!(table.token(test), Some("test"));
		assert_eq!(table.token(99), None);
	}

	#[test]
	fn test_from_tokens_validation() {
		let ok = vec![START_TOKEN.to_owned(), END_TOKEN.to_owned(), "a".to_owned()];
		assert_eq!(TokenTable::from_tokens(ok).unwrap().id("a"), Some(2));

		let missing = vec!["a".to_owned()];
		assert!(TokenTable::from_tokens(missing).is_err());

		let duplicate = vec![
			START_TOKEN.to_owned(),
			END_TOKEN.to_owned(),
			"a".to_owned(),
			"a".to_owned(),
		];
		assert!(TokenTable::from_tokens(duplicate).is_err());
	}
}
