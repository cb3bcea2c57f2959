use std::sync::LazyLock;

use regex::Regex;

/// Zero-width word boundary.
static WORD_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b").unwrap());

/// Any single non-word character.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").unwrap());

/// Splits raw text into lowercase tokens.
///
/// The text is cut at every word boundary, so words (letters, digits,
/// underscores) and the separator runs between them become tokens of their
/// own. Nothing is dropped: concatenating the returned tokens gives back the
/// lowercased input.
///
/// An empty input yields a single empty token.
pub fn process_string(raw: &str) -> Vec<String> {
	let lowered = raw.to_lowercase();
	if lowered.is_empty() {
		return vec![String::new()];
	}

	let mut tokens = Vec::new();
	let mut start = 0;
	for boundary in WORD_BOUNDARY.find_iter(&lowered) {
		let end = boundary.start();
		if end > start {
			tokens.push(lowered[start..end].to_owned());
			start = end;
		}
	}
	if start < lowered.len() {
		tokens.push(lowered[start..].to_owned());
	}
	tokens
}

/// Returns `true` if the token contains at least one non-word character.
pub fn has_non_word(token: &str) -> bool {
	NON_WORD.is_match(token)
}

/// Returns `true` for a non-empty token made only of word characters.
pub fn is_word(token: &str) -> bool {
	!token.is_empty() && !has_non_word(token)
}

/// Uppercases the first character of `token`.
pub fn capitalize(token: &str) -> String {
	let mut chars = token.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
