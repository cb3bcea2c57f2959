use std::collections::VecDeque;

use rand::Rng;
use rand::seq::IndexedRandom;

use super::tokenizer::is_word;
use crate::config::BrainConfig;

/// Returns the tokens of `message` that can serve as a subject.
///
/// A candidate is a non-empty word that is neither a stopword nor starts
/// with the mention prefix.
pub fn trim_message<'a>(message: &'a [String], config: &BrainConfig) -> Vec<&'a str> {
	message
		.iter()
		.map(String::as_str)
		.filter(|word| is_word(word) && !config.is_stopword(word) && !word.starts_with(config.mention_prefix))
		.collect()
}

/// Picks a subject from `message` and returns the window of `length` tokens around it.
///
/// The subject is chosen uniformly among the candidates of [`trim_message`].
/// The window is then cut from the original, unfiltered tokens: the subject
/// sits at index `length / 2` when enough tokens precede it, at the start
/// otherwise, and at the end when the message runs out first.
///
/// Returns an empty vector when no candidate exists.
pub fn extract_subject<R: Rng + ?Sized>(
	message: &[String],
	length: usize,
	config: &BrainConfig,
	rng: &mut R,
) -> Vec<String> {
	let candidates = trim_message(message, config);
	let subject = match candidates.choose(rng) {
		Some(s) => *s,
		None => return Vec::new(),
	};

	if length == 1 {
		return vec![subject.to_owned()];
	}

	let mut window: VecDeque<&str> = VecDeque::with_capacity(length + 1);
	for word in message {
		window.push_back(word);
		if window.len() > length {
			if window.front() == Some(&subject) {
				window.pop_back();
				break;
			}

			window.pop_front();
			if window.get(length / 2) == Some(&subject) {
				break;
			}
		}
	}

	window.into_iter().map(str::to_owned).collect()
}
