use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result, Settings};

/// Where the streaming server lives.
///
/// JSON example:
/// {
///   "host": "192.168.1.20",
///   "port": 1984,
///   "wsPort": 1985
/// }
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
	pub host: String,

	/// The port serving the REST API.
	pub port: u16,

	/// The port serving WebSockets, if different from [Self::port].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ws_port: Option<u16>,
}

impl ServerConfig {
	const KEY: &'static str = "server_config";

	pub fn new(host: impl Into<String>, port: u16) -> Self {
		Self {
			host: host.into(),
			port,
			ws_port: None,
		}
	}

	pub fn with_ws_port(mut self, port: u16) -> Self {
		self.ws_port = Some(port);
		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.host.trim().is_empty() {
			return Err(Error::InvalidServer("missing host"));
		}
		if self.port == 0 {
			return Err(Error::InvalidServer("missing port"));
		}
		Ok(())
	}

	/// The root of the REST API.
	pub fn base_url(&self) -> Result<Url> {
		self.validate()?;
		Ok(Url::parse(&format!("http://{}:{}", self.host.trim(), self.port))?)
	}

	/// The root for WebSocket connections.
	pub fn ws_url(&self) -> Result<Url> {
		self.validate()?;
		let port = self.ws_port.unwrap_or(self.port);
		Ok(Url::parse(&format!("ws://{}:{}", self.host.trim(), port))?)
	}

	/// The WebSocket address playing the named stream.
	pub fn stream_url(&self, name: &str) -> Result<Url> {
		let mut url = self.ws_url()?.join("/api/ws")?;
		url.query_pairs_mut().append_pair("src", name);
		Ok(url)
	}

	/// The saved config, if there is a valid one.
	pub fn load(settings: &Settings) -> Option<Self> {
		let config: Self = settings.get(Self::KEY)?;
		match config.validate() {
			Ok(()) => Some(config),
			Err(err) => {
				tracing::warn!(%err, "ignoring saved server config");
				None
			}
		}
	}

	pub fn save(&self, settings: &mut Settings) -> Result<()> {
		self.validate()?;
		settings.set(Self::KEY, self)
	}

	pub fn clear(settings: &mut Settings) -> Result<()> {
		settings.remove(Self::KEY)
	}
}
