//! The host playback stack, implemented by whoever embeds the pipeline.
//!
//! The shape follows Media Source Extensions: a [MediaSink] (the player element)
//! is attached to a [MediaSession] (the media source), which owns one
//! [DecodeBuffer] (the source buffer) per codec string.
//!
//! None of these calls block. A [DecodeBuffer] only accepts one pending append,
//! reports [DecodeBuffer::is_updating] until it's done, and the host notifies the
//! pipeline when it becomes idle again with [crate::PlayerEvent::Idle].

use std::time::Duration;

use bytes::Bytes;

use crate::{PlatformError, Playback};

/// An append-only buffer feeding the decoder.
pub trait DecodeBuffer {
	/// True while the previous append is still being processed.
	fn is_updating(&self) -> bool;

	/// Start appending one chunk. Fails with [PlatformError::Busy] if [Self::is_updating].
	fn append(&mut self, chunk: Bytes) -> Result<(), PlatformError>;
}

/// A media source attached to a [MediaSink].
pub trait MediaSession {
	type Buffer: DecodeBuffer;

	/// Whether the session still accepts data and can be ended.
	fn is_open(&self) -> bool;

	/// Create a decode buffer for the codecs, failing if they're unsupported.
	fn add_buffer(&mut self, codecs: &str) -> Result<Self::Buffer, PlatformError>;

	fn end_of_stream(&mut self) -> Result<(), PlatformError>;
}

/// The element that plays whatever the session decodes.
pub trait MediaSink {
	type Session: MediaSession;

	/// Create a new session and make it the sink's source.
	fn attach(&mut self) -> Result<Self::Session, PlatformError>;

	/// Clear the sink's source.
	fn detach(&mut self);

	fn play(&mut self) -> Result<(), PlatformError>;

	fn seek(&mut self, position: Duration);

	fn playback(&self) -> Playback;
}
