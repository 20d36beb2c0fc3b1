use std::sync::Arc;

use crate::ErrorKind;

/// A failure reported by the host platform (player element, media session or decode buffer).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlatformError {
	/// The decode buffer is still processing the previous append.
	#[error("busy")]
	Busy,

	#[error("not supported: {0}")]
	NotSupported(String),

	#[error("invalid state: {0}")]
	InvalidState(String),

	#[error("quota exceeded")]
	QuotaExceeded,

	#[error("decode error: {0}")]
	Decode(String),
}

/// A list of possible errors that can occur in the pipeline.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
	#[error("failed to connect: {0}")]
	Connect(Arc<dyn std::error::Error + Send + Sync>),

	#[error("socket error: {0}")]
	Socket(Arc<dyn std::error::Error + Send + Sync>),

	#[error("maximum reconnection attempts reached")]
	ReconnectExhausted,

	#[error("invalid control message: {0}")]
	Control(Arc<serde_json::Error>),

	#[error("server error: {0}")]
	Remote(String),

	#[error("no media session bound")]
	Unbound,

	#[error("failed to create media session: {0}")]
	Session(PlatformError),

	#[error("failed to create decode buffer: {0}")]
	BufferInit(PlatformError),

	#[error("decode buffer is not open")]
	NotOpen,

	#[error("failed to append segment: {0}")]
	Append(PlatformError),

	#[error("failed to end stream: {0}")]
	EndOfStream(PlatformError),

	#[error("playback failed: {0}")]
	Playback(PlatformError),

	#[error("pipeline reloaded {0} times without recovering")]
	ReloadExhausted(u32),
}

impl Error {
	pub fn connect(err: impl std::error::Error + Send + Sync + 'static) -> Self {
		Self::Connect(Arc::new(err))
	}

	pub fn socket(err: impl std::error::Error + Send + Sync + 'static) -> Self {
		Self::Socket(Arc::new(err))
	}

	/// The bucket this error is counted under by the [crate::ErrorPolicy].
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Connect(_) | Self::Socket(_) | Self::ReconnectExhausted => ErrorKind::Connection,
			Self::Unbound | Self::Session(_) | Self::BufferInit(_) | Self::ReloadExhausted(_) => ErrorKind::Media,
			Self::NotOpen | Self::Append(_) => ErrorKind::Buffer,
			Self::Control(_) | Self::Remote(_) | Self::EndOfStream(_) | Self::Playback(_) => ErrorKind::Unknown,
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Control(Arc::new(err))
	}
}

pub type Result<T> = std::result::Result<T, Error>;
