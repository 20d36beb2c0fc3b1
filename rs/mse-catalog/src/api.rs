use std::collections::BTreeMap;

use url::Url;

use crate::{Result, ServerConfig};

/// The streams known to the server, keyed by name.
///
/// The value is whatever the server reports about the stream, usually its producers and consumers.
pub type Streams = BTreeMap<String, serde_json::Value>;

/// A client for the server's `/api/streams` endpoints.
#[derive(Clone, Debug)]
pub struct Api {
	client: reqwest::Client,
	streams: Url,
}

impl Api {
	pub fn new(server: &ServerConfig) -> Result<Self> {
		Ok(Self {
			client: reqwest::Client::new(),
			streams: server.base_url()?.join("/api/streams")?,
		})
	}

	/// Use an existing HTTP client, sharing its connection pool.
	pub fn with_client(mut self, client: reqwest::Client) -> Self {
		self.client = client;
		self
	}

	pub async fn streams(&self) -> Result<Streams> {
		let streams: Option<Streams> = self
			.client
			.get(self.streams.clone())
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		Ok(streams.unwrap_or_default())
	}

	/// Register a stream pulled from `source`, usually an RTSP URL.
	pub async fn add(&self, name: &str, source: &str) -> Result<()> {
		self.client
			.put(self.streams.clone())
			.query(&[("name", name), ("src", source)])
			.send()
			.await?
			.error_for_status()?;

		tracing::debug!(%name, "added stream");
		Ok(())
	}

	pub async fn remove(&self, name: &str) -> Result<()> {
		self.client
			.delete(self.streams.clone())
			.query(&[("src", name)])
			.send()
			.await?
			.error_for_status()?;

		tracing::debug!(%name, "removed stream");
		Ok(())
	}
}
