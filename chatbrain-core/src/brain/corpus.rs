use std::path::Path;
use std::sync::mpsc;
use std::thread;

use super::Brain;
use super::persist::Persist;
use crate::error::BrainError;
use crate::io::{build_output_path, read_file};

/// Splits `lines` into chunks, trains one partial result per chunk on its own
/// thread and returns every partial result.
///
/// # Behavior
/// - Splits input lines into chunks (based on CPU cores * factor).
/// - Spawns threads to build partial models for each chunk.
/// - Collects the partial models over an MPSC channel and returns them in
///   chunk order, so the merged token ids do not depend on thread timing.
pub(crate) fn train_partials<P, F>(lines: &[String], train_chunk: F) -> Vec<P>
where
	P: Send,
	F: Fn(&[String]) -> P + Sync,
{
	if lines.is_empty() {
		return Vec::new();
	}

	let cpus = num_cpus::get();
	let factor = 8;
	let chunks = cpus * factor;
	let chunk_size = lines.len().div_ceil(chunks).max(1);
	log::info!(
		"Training on {} lines in chunks of {} ({} cpus)",
		lines.len(),
		chunk_size,
		cpus
	);

	let (tx, rx) = mpsc::channel();
	let train_chunk = &train_chunk;
	thread::scope(|scope| {
		for (index, chunk) in lines.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			scope.spawn(move || {
				if tx.send((index, train_chunk(chunk))).is_err() {
					log::warn!("Partial model dropped: receiver closed");
				}
			});
		}
	});
	drop(tx);

	let mut partials: Vec<(usize, P)> = rx.iter().collect();
	partials.sort_by_key(|(index, _)| *index);
	partials.into_iter().map(|(_, partial)| partial).collect()
}

/// Loads the brain cached next to a corpus file, or trains and caches it.
///
/// `fresh` is an untrained brain carrying the wanted order, length limit and
/// configuration. The cache is `corpus.bin` for `corpus.txt`; it is reused
/// only when it was built with the same order and length limit.
pub(crate) fn load_or_train<B, P>(corpus: P, mut fresh: B) -> Result<B, BrainError>
where
	B: Brain + Persist,
	P: AsRef<Path>,
{
	let cache = build_output_path(&corpus, "bin")?;
	if cache.exists() {
		match B::load(&cache, fresh.config().clone()) {
			Ok(cached) if cached.order() == fresh.order() && cached.length_limit() == fresh.length_limit() => {
				return Ok(cached);
			}
			Ok(cached) => log::warn!(
				"Ignoring cache {}: built for order {} / limit {}",
				cache.display(),
				cached.order(),
				cached.length_limit()
			),
			Err(err) => log::warn!("Ignoring unreadable cache {}: {err}", cache.display()),
		}
	}

	let lines = read_file(&corpus)?;
	fresh.train_corpus(&lines)?;
	fresh.save(&cache)?;
	Ok(fresh)
}
