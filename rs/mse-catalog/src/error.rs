use std::sync::Arc;

/// A list of possible errors from the catalog, settings and REST client.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
	#[error("invalid server config: {0}")]
	InvalidServer(&'static str),

	#[error("http error: {0}")]
	Http(Arc<reqwest::Error>),

	#[error("json error: {0}")]
	Json(Arc<serde_json::Error>),

	#[error("io error: {0}")]
	Io(Arc<std::io::Error>),

	#[error("invalid url: {0}")]
	Url(#[from] url::ParseError),

	#[error("unknown stream: {0}")]
	UnknownStream(String),
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		Error::Http(Arc::new(err))
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Json(Arc::new(err))
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Error::Io(Arc::new(err))
	}
}

pub type Result<T> = std::result::Result<T, Error>;
