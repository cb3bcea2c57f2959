use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::BrainConfig;
use crate::error::BrainError;
use crate::io::{is_json, write_atomic};

/// Export / import of a brain's learned state.
///
/// Only the learned state is persisted. The collaborator configuration
/// (stopwords, filter) is supplied again on import.
///
/// Two encodings are available:
/// - JSON (`serde_json`), readable and used for `.json` files
/// - `postcard`, compact and used for every other file
pub trait Persist: Sized {
	type Snapshot: Serialize + DeserializeOwned;

	/// Captures the learned state.
	fn export(&self) -> Self::Snapshot;

	/// Rebuilds a brain from a snapshot.
	///
	/// # Errors
	/// Returns [`BrainError::Deserialization`] if the snapshot is inconsistent.
	fn import(snapshot: Self::Snapshot, config: BrainConfig) -> Result<Self, BrainError>;

	fn config(&self) -> &BrainConfig;

	fn to_json(&self) -> Result<String, BrainError> {
		serde_json::to_string(&self.export()).map_err(|e| BrainError::Internal(e.to_string()))
	}

	fn from_json(json: &str, config: BrainConfig) -> Result<Self, BrainError> {
		Self::import(serde_json::from_str(json)?, config)
	}

	/// Replaces the learned state with the one encoded in `json`.
	///
	/// On error, `self` is left untouched.
	fn restore_json(&mut self, json: &str) -> Result<(), BrainError> {
		*self = Self::from_json(json, self.config().clone())?;
		Ok(())
	}

	fn to_bytes(&self) -> Result<Vec<u8>, BrainError> {
		postcard::to_stdvec(&self.export()).map_err(|e| BrainError::Internal(e.to_string()))
	}

	fn from_bytes(bytes: &[u8], config: BrainConfig) -> Result<Self, BrainError> {
		Self::import(postcard::from_bytes(bytes)?, config)
	}

	/// Replaces the learned state with the one encoded in `bytes`.
	///
	/// On error, `self` is left untouched.
	fn restore_bytes(&mut self, bytes: &[u8]) -> Result<(), BrainError> {
		*self = Self::from_bytes(bytes, self.config().clone())?;
		Ok(())
	}

	/// Writes the learned state to `path` atomically.
	///
	/// `.json` files are written as JSON, anything else with `postcard`.
	fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), BrainError> {
		let path = path.as_ref();
		log::info!("Saving brain to {}...", path.display());
		let bytes = if is_json(path) {
			self.to_json()?.into_bytes()
		} else {
			self.to_bytes()?
		};
		write_atomic(path, &bytes)?;
		Ok(())
	}

	/// Reads a brain saved with [`Persist::save`].
	fn load<P: AsRef<Path>>(path: P, config: BrainConfig) -> Result<Self, BrainError> {
		let path = path.as_ref();
		log::info!("Loading brain from {}...", path.display());
		let bytes = std::fs::read(path)?;
		if is_json(path) {
			let json = std::str::from_utf8(&bytes).map_err(|e| BrainError::Deserialization(e.to_string()))?;
			Self::from_json(json, config)
		} else {
			Self::from_bytes(&bytes, config)
		}
	}
}
