use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Api, Error, Result, ServerConfig, Settings};

/// A named stream and where to play it.
#[serde_with::serde_as]
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
	pub name: String,

	/// The WebSocket address that plays this stream.
	pub url: Url,

	/// Where the server pulls the stream from, when we added it ourselves.
	#[serde(default)]
	pub source: Option<String>,

	pub active: bool,

	#[serde_as(as = "serde_with::TimestampMilliSeconds<i64>")]
	pub created: SystemTime,
}

/// The streams available on one server, cached locally.
///
/// The server is the source of truth; the cache is only used when it can't be reached.
pub struct Catalog {
	server: ServerConfig,
	api: Api,
	settings: Settings,
	entries: Vec<Entry>,
}

impl Catalog {
	const KEY: &'static str = "catalog";

	/// Create a catalog for the server, starting from whatever was cached.
	pub fn new(server: ServerConfig, settings: Settings) -> Result<Self> {
		let api = Api::new(&server)?;

		let mut catalog = Self {
			server,
			api,
			settings,
			entries: Vec::new(),
		};
		catalog.load_cache()?;

		Ok(catalog)
	}

	/// Replace the entries with the server's streams.
	///
	/// If the server can't be reached, the cached entries are loaded instead and the error returned.
	pub async fn refresh(&mut self) -> Result<()> {
		let streams = match self.api.streams().await {
			Ok(streams) => streams,
			Err(err) => {
				tracing::warn!(%err, "failed to list streams, using cache");
				self.load_cache()?;
				return Err(err);
			}
		};

		let now = SystemTime::now();
		let mut entries = Vec::with_capacity(streams.len());

		for name in streams.into_keys() {
			let url = self.server.stream_url(&name)?;

			// Keep what only we know about streams we've seen before.
			let entry = match self.entries.iter().find(|entry| entry.name == name) {
				Some(known) => Entry { url, ..known.clone() },
				None => Entry {
					name,
					url,
					source: None,
					active: true,
					created: now,
				},
			};
			entries.push(entry);
		}

		tracing::info!(count = entries.len(), "refreshed streams");
		self.entries = entries;
		self.save_cache()
	}

	/// Register a new stream on the server.
	pub async fn add(&mut self, name: &str, source: &str) -> Result<&Entry> {
		let url = self.server.stream_url(name)?;
		self.api.add(name, source).await?;

		let entry = Entry {
			name: name.to_string(),
			url,
			source: Some(source.to_string()),
			active: true,
			created: SystemTime::now(),
		};

		self.entries.retain(|existing| existing.name != name);
		self.entries.push(entry);
		self.save_cache()?;

		Ok(&self.entries[self.entries.len() - 1])
	}

	/// Delete a stream from the server.
	pub async fn remove(&mut self, name: &str) -> Result<Entry> {
		self.api.remove(name).await?;

		let index = self
			.entries
			.iter()
			.position(|entry| entry.name == name)
			.ok_or_else(|| Error::UnknownStream(name.to_string()))?;

		let entry = self.entries.remove(index);
		self.save_cache()?;

		Ok(entry)
	}

	/// Show or hide a stream locally; the server isn't told.
	pub fn set_active(&mut self, name: &str, active: bool) -> Result<()> {
		let entry = self
			.entries
			.iter_mut()
			.find(|entry| entry.name == name)
			.ok_or_else(|| Error::UnknownStream(name.to_string()))?;

		entry.active = active;
		self.save_cache()
	}

	pub fn get(&self, name: &str) -> Option<&Entry> {
		self.entries.iter().find(|entry| entry.name == name)
	}

	pub fn entries(&self) -> &[Entry] {
		&self.entries
	}

	pub fn active(&self) -> impl Iterator<Item = &Entry> {
		self.entries.iter().filter(|entry| entry.active)
	}

	pub fn server(&self) -> &ServerConfig {
		&self.server
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	// URLs follow the current server config, not the one the cache was written with.
	fn load_cache(&mut self) -> Result<()> {
		let Some(mut entries) = self.settings.get::<Vec<Entry>>(Self::KEY) else {
			return Ok(());
		};

		for entry in &mut entries {
			entry.url = self.server.stream_url(&entry.name)?;
		}

		tracing::debug!(count = entries.len(), "loaded cached streams");
		self.entries = entries;
		Ok(())
	}

	fn save_cache(&mut self) -> Result<()> {
		self.settings.set(Self::KEY, &self.entries)
	}
}
