use std::collections::VecDeque;

use bytes::Bytes;

use crate::{DecodeBuffer, Error, MediaSession, MediaSink, PlatformError};

type DecodeOf<S> = <<S as MediaSink>::Session as MediaSession>::Buffer;

/// Queues segments in front of a [DecodeBuffer], appending one at a time whenever it's idle.
///
/// The very first segment is appended straight away, since there's no idle
/// notification to wait for until something has been appended.
pub struct Buffer<S: MediaSink> {
	sink: Option<S>,
	session: Option<S::Session>,
	decode: Option<DecodeOf<S>>,

	// Segments waiting for the decode buffer, oldest first.
	queue: VecDeque<Bytes>,

	// The first segment has been appended.
	bootstrapped: bool,

	// There were queued segments as of the last append.
	streaming: bool,
}

impl<S: MediaSink> Buffer<S> {
	pub fn new() -> Self {
		Self {
			sink: None,
			session: None,
			decode: None,
			queue: VecDeque::new(),
			bootstrapped: false,
			streaming: false,
		}
	}

	/// Attach a new media session to the sink and start playback.
	///
	/// The sink is kept even if this fails, so it can be returned by [Self::take_sink].
	pub fn bind(&mut self, sink: S) -> Result<(), Error> {
		if let Err(err) = self.close() {
			tracing::warn!(%err, "failed to close previous session");
		}

		let sink = self.sink.insert(sink);
		let session = sink.attach().map_err(Error::Session)?;
		self.session = Some(session);

		sink.play().map_err(Error::Playback)
	}

	/// Create the decode buffer for the negotiated codecs.
	pub fn open(&mut self, codecs: &str) -> Result<(), Error> {
		let session = self.session.as_mut().ok_or(Error::Unbound)?;
		if self.decode.is_some() {
			tracing::debug!(%codecs, "decode buffer already open");
			return Ok(());
		}

		let decode = session.add_buffer(codecs).map_err(Error::BufferInit)?;
		self.decode = Some(decode);

		tracing::debug!(%codecs, "decode buffer open");
		Ok(())
	}

	/// Hand a segment to the decoder, now if possible or once the buffer is idle.
	pub fn submit(&mut self, chunk: Bytes) -> Result<(), Error> {
		let decode = self.decode.as_mut().ok_or(Error::NotOpen)?;

		if !self.bootstrapped {
			self.bootstrapped = true;
			self.streaming = true;
			return append(decode, &mut self.queue, chunk);
		}

		self.queue.push_back(chunk);
		self.streaming = true;
		self.drain()
	}

	/// The decode buffer finished its last append.
	pub fn on_idle(&mut self) -> Result<(), Error> {
		self.drain()
	}

	fn drain(&mut self) -> Result<(), Error> {
		let Some(decode) = self.decode.as_mut() else {
			return Ok(());
		};

		if decode.is_updating() {
			return Ok(());
		}

		let Some(chunk) = self.queue.pop_front() else {
			self.streaming = false;
			return Ok(());
		};

		append(decode, &mut self.queue, chunk)?;
		if self.queue.is_empty() {
			self.streaming = false;
		}
		Ok(())
	}

	/// Tear down the decode buffer and session, clearing the sink's source.
	///
	/// Everything is reset even when ending the stream fails.
	pub fn close(&mut self) -> Result<(), Error> {
		self.queue.clear();
		self.bootstrapped = false;
		self.streaming = false;

		// Dropping the decode buffer means idle notifications have nothing to drain.
		self.decode = None;

		let Some(mut session) = self.session.take() else {
			return Ok(());
		};

		let res = match session.is_open() {
			true => session.end_of_stream().map_err(Error::EndOfStream),
			false => Ok(()),
		};

		if let Some(sink) = self.sink.as_mut() {
			sink.detach();
		}

		res
	}

	/// Release the sink, closing first.
	pub fn take_sink(&mut self) -> Option<S> {
		if let Err(err) = self.close() {
			tracing::warn!(%err, "failed to close before releasing sink");
		}
		self.sink.take()
	}

	pub fn sink(&self) -> Option<&S> {
		self.sink.as_ref()
	}

	pub fn sink_mut(&mut self) -> Option<&mut S> {
		self.sink.as_mut()
	}

	pub fn is_bound(&self) -> bool {
		self.session.is_some()
	}

	pub fn is_open(&self) -> bool {
		self.decode.is_some()
	}

	pub fn is_idle(&self) -> bool {
		self.decode.as_ref().is_none_or(|decode| !decode.is_updating())
	}

	pub fn is_streaming(&self) -> bool {
		self.streaming
	}

	pub fn queued(&self) -> usize {
		self.queue.len()
	}
}

// A busy decode buffer gets the chunk back at the front of the queue, retried on the next idle notification.
fn append<B: DecodeBuffer>(decode: &mut B, queue: &mut VecDeque<Bytes>, chunk: Bytes) -> Result<(), Error> {
	match decode.append(chunk.clone()) {
		Ok(()) => Ok(()),
		Err(PlatformError::Busy) => {
			queue.push_front(chunk);
			Ok(())
		}
		Err(err) => Err(Error::Append(err)),
	}
}

impl<S: MediaSink> Default for Buffer<S> {
	fn default() -> Self {
		Self::new()
	}
}
