use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;

/// A small persistent key-value store, each value kept as JSON.
///
/// Backed by a single JSON object on disk, rewritten on every change, or by
/// nothing at all with [Settings::memory].
#[derive(Debug, Default)]
pub struct Settings {
	path: Option<PathBuf>,
	values: serde_json::Map<String, serde_json::Value>,
}

impl Settings {
	pub fn memory() -> Self {
		Self::default()
	}

	/// Load the settings file, starting empty if it doesn't exist yet.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
		let path = path.into();

		let values = match std::fs::read_to_string(&path) {
			Ok(json) => serde_json::from_str(&json)?,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Default::default(),
			Err(err) => return Err(err.into()),
		};

		tracing::debug!(path = %path.display(), "loaded settings");

		Ok(Self {
			path: Some(path),
			values,
		})
	}

	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Returns `None` if the key is missing or holds something that isn't a `T`.
	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let value = self.values.get(key)?;

		match serde_json::from_value(value.clone()) {
			Ok(value) => Some(value),
			Err(err) => {
				tracing::warn!(%key, %err, "ignoring malformed setting");
				None
			}
		}
	}

	pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
		self.values.insert(key.to_string(), serde_json::to_value(value)?);
		self.save()
	}

	pub fn remove(&mut self, key: &str) -> Result<()> {
		if self.values.remove(key).is_some() {
			self.save()?;
		}
		Ok(())
	}

	pub fn contains(&self, key: &str) -> bool {
		self.values.contains_key(key)
	}

	fn save(&self) -> Result<()> {
		let Some(path) = &self.path else {
			return Ok(());
		};

		// Write the whole file next to the old one, then swap it in.
		let tmp = path.with_extension("tmp");
		std::fs::write(&tmp, serde_json::to_vec_pretty(&self.values)?)?;
		std::fs::rename(&tmp, path)?;

		Ok(())
	}
}
