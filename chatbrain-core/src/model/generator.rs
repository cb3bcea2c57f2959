use rand::Rng;

use super::chain_model::ChainModel;
use super::token_table::{END_TOKEN, START_TOKEN};
use crate::config::ContentFilter;
use crate::error::BrainError;

/// Builds the first context of a generation run from a seed.
///
/// - Shorter seeds are left-padded with `START`
/// - Longer seeds are truncated to their first `order` tokens
pub fn initial_context<S: AsRef<str>>(seed: &[S], order: usize) -> Vec<String> {
	let padding = order.saturating_sub(seed.len());
	std::iter::repeat_n(START_TOKEN, padding)
		.chain(seed.iter().take(order).map(|t| t.as_ref()))
		.map(str::to_owned)
		.collect()
}

/// Drops the trailing token (the `END` sentinel, or the last token when the
/// length budget ran out) and every leading `START` sentinel.
pub fn trim_tokens(mut tokens: Vec<String>) -> Vec<String> {
	tokens.pop();
	let leading = tokens.iter().take_while(|t| *t == START_TOKEN).count();
	tokens.drain(..leading);
	tokens
}

/// Samples the token following the last `order` tokens of `tokens`.
///
/// An unknown context, an empty token or a token rejected by `filter` all
/// mean there is no valid continuation, and yield `END`.
///
/// # Errors
/// Propagates every chain error other than an unknown context.
pub fn next_token<R: Rng + ?Sized>(
	chain: &ChainModel,
	tokens: &[String],
	filter: &ContentFilter,
	rng: &mut R,
) -> Result<String, BrainError> {
	let order = chain.order();
	let context = tokens.get(tokens.len().saturating_sub(order)..).unwrap_or_default();

	match chain.generate(context, rng) {
		Ok(next) if !next.is_empty() && !filter.is_disallowed(next) => Ok(next.to_owned()),
		Ok(next) => {
			log::debug!("Discarded token {next:?}");
			Ok(END_TOKEN.to_owned())
		}
		Err(BrainError::UnknownContext(context)) => {
			log::debug!("Unknown context {context:?}, ending sentence");
			Ok(END_TOKEN.to_owned())
		}
		Err(e) => Err(e),
	}
}

/// Drives `chain` from `seed` until it emits `END` or the run holds `max_tokens` tokens.
///
/// The returned tokens never contain a sentinel. The run counts the seed
/// context, padding included, towards `max_tokens`, and never returns more
/// than `max_tokens` tokens, even when the seed context alone is longer.
pub fn generate_sentence<S, R>(
	chain: &ChainModel,
	seed: &[S],
	max_tokens: usize,
	filter: &ContentFilter,
	rng: &mut R,
) -> Result<Vec<String>, BrainError>
where
	S: AsRef<str>,
	R: Rng + ?Sized,
{
	let mut tokens = initial_context(seed, chain.order());
	log::debug!("Initial context: {tokens:?}");

	while tokens.last().map(String::as_str) != Some(END_TOKEN) && tokens.len() < max_tokens {
		let next = next_token(chain, &tokens, filter, rng)?;
		tokens.push(next);
	}

	let mut sentence = trim_tokens(tokens);
	sentence.truncate(max_tokens);
	Ok(sentence)
}

/// Per-half token budget of a bidirectional generation: half the limit, rounded.
pub fn half_limit(length_limit: usize) -> usize {
	length_limit.div_ceil(2)
}
