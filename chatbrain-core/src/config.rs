use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::BrainError;
use crate::io::read_file;

/// Built-in English stopword lexicon.
///
/// Stopwords are never picked as the subject of a prompt.
pub const DEFAULT_STOPWORDS: &[&str] = &[
	"a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
	"aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
	"but", "by", "can", "can't", "cannot", "could", "couldn't", "did", "didn't", "do", "does",
	"doesn't", "doing", "don't", "down", "during", "each", "few", "for", "from", "further", "had",
	"hadn't", "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her",
	"here", "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "i", "i'd",
	"i'll", "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself",
	"let's", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of", "off",
	"on", "once", "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over", "own",
	"same", "shan't", "she", "she'd", "she'll", "she's", "should", "shouldn't", "so", "some",
	"such", "than", "that", "that's", "the", "their", "theirs", "them", "themselves", "then",
	"there", "there's", "these", "they", "they'd", "they'll", "they're", "they've", "this",
	"those", "through", "to", "too", "under", "until", "up", "very", "was", "wasn't", "we",
	"we'd", "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when", "when's",
	"where", "where's", "which", "while", "who", "who's", "whom", "why", "why's", "with", "won't",
	"would", "wouldn't", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
	"yourself", "yourselves",
];

/// Predicate deciding whether a generated token is disallowed.
///
/// A disallowed token ends the sentence where it would have appeared.
#[derive(Clone)]
pub struct ContentFilter(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl ContentFilter {
	/// Wraps an arbitrary predicate.
	pub fn new<F>(predicate: F) -> Self
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		Self(Arc::new(predicate))
	}

	/// A filter that lets every token through.
	pub fn allow_all() -> Self {
		Self::new(|_| false)
	}

	/// Rejects any token equal (case-insensitively) to one of `words`.
	pub fn deny_list<I, S>(words: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let denied: HashSet<String> = words.into_iter().map(|w| w.as_ref().to_lowercase()).collect();
		Self::new(move |token| denied.contains(&token.to_lowercase()))
	}

	/// Loads a deny list from a file, one word per line.
	pub fn deny_list_file<P: AsRef<Path>>(path: P) -> Result<Self, BrainError> {
		Ok(Self::deny_list(read_word_list(path)?))
	}

	/// Returns `true` if `token` must not appear in a reply.
	pub fn is_disallowed(&self, token: &str) -> bool {
		(self.0)(token)
	}
}

impl Default for ContentFilter {
	fn default() -> Self {
		Self::allow_all()
	}
}

impl fmt::Debug for ContentFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("ContentFilter(..)")
	}
}

/// Collaborator configuration injected into a brain at construction.
#[derive(Clone, Debug)]
pub struct BrainConfig {
	/// Lowercase words that can never be a subject.
	pub stopwords: HashSet<String>,
	/// Tokens starting with this character are self-mentions and never a subject.
	pub mention_prefix: char,
	/// Content filter applied to every generated token.
	pub filter: ContentFilter,
}

impl Default for BrainConfig {
	fn default() -> Self {
		Self {
			stopwords: DEFAULT_STOPWORDS.iter().map(|w| (*w).to_owned()).collect(),
			mention_prefix: '@',
			filter: ContentFilter::default(),
		}
	}
}

impl BrainConfig {
	/// Replaces the stopword lexicon.
	pub fn with_stopwords<I, S>(mut self, stopwords: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.stopwords = stopwords.into_iter().map(Into::into).collect();
		self
	}

	/// Replaces the stopword lexicon with the content of a file (one word per line).
	pub fn with_stopwords_file<P: AsRef<Path>>(self, path: P) -> Result<Self, BrainError> {
		Ok(self.with_stopwords(read_word_list(path)?))
	}

	/// Replaces the content filter.
	pub fn with_filter(mut self, filter: ContentFilter) -> Self {
		self.filter = filter;
		self
	}

	/// Sets the self-mention marker.
	///
	/// # Errors
	/// Returns an error if the marker is a word character, since such a
	/// marker could never start an otherwise valid subject.
	pub fn with_mention_prefix(mut self, prefix: char) -> Result<Self, BrainError> {
		if prefix.is_alphanumeric() || prefix == '_' {
			return Err(BrainError::InvalidConfig(format!(
				"mention prefix must not be a word character, got {prefix:?}"
			)));
		}
		self.mention_prefix = prefix;
		Ok(self)
	}

	/// Returns `true` if `word` (already lowercase) is in the stopword lexicon.
	pub fn is_stopword(&self, word: &str) -> bool {
		self.stopwords.contains(word)
	}
}

/// Reads a word list: one entry per line, trimmed and lowercased, blank lines skipped.
fn read_word_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>, BrainError> {
	let words = read_file(&path)?
		.into_iter()
		.filter_map(|line| {
			let word = line.trim();
			if word.is_empty() {
				None
			} else {
				Some(word.to_lowercase())
			}
		})
		.collect::<Vec<_>>();
	if words.is_empty() {
		log::warn!("Word list {} is empty", path.as_ref().display());
	}
	Ok(words)
}
