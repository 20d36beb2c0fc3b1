use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use url::Url;

use crate::{
	Buffer, Config, Connector, Control, Error, ErrorPolicy, MediaSink, Message, Transport, TransportEvent, position,
};

/// A notification from the host's player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
	/// The decode buffer finished an append.
	Idle,

	/// Playback paused, usually because it ran out of data.
	Pause,
}

/// Feeds one live stream from a [Transport] into a [MediaSink].
///
/// The pipeline owns its transport, decode buffer and [ErrorPolicy]. Call
/// [Ingest::start] with the sink, then [Ingest::run] with the player's events.
pub struct Ingest<C: Connector, S: MediaSink> {
	config: Config,
	url: Url,
	handshake: Message,

	transport: Transport<C>,
	buffer: Buffer<S>,
	errors: ErrorPolicy,

	// The server answered the handshake with a MIME type.
	negotiated: bool,

	// Reloads since a segment was last accepted.
	reloads: u32,
}

impl<C: Connector, S: MediaSink> Ingest<C, S> {
	pub fn new(connector: C, url: Url, config: Config) -> Result<Self, Error> {
		let handshake = Control::Mse(config.codecs.clone()).encode()?;

		Ok(Self {
			transport: Transport::new(connector, config.reconnect.clone()),
			buffer: Buffer::new(),
			errors: ErrorPolicy::new(config.escalate_after),
			negotiated: false,
			reloads: 0,
			handshake,
			config,
			url,
		})
	}

	/// Bind the sink and start connecting.
	///
	/// Failing to bind is recorded rather than returned; the connection is still made.
	pub fn start(&mut self, sink: S) {
		self.errors.clear();
		self.negotiated = false;

		if let Err(err) = self.buffer.bind(sink) {
			self.record(err);
		}

		self.transport.connect(self.url.clone(), self.handshake.clone());
	}

	/// Drive the pipeline until the player goes away or the stream can't be recovered.
	///
	/// Escalating errors reload the pipeline after `reconnect.delay` times the number of
	/// reloads in a row. Returns [Error::ReconnectExhausted] or [Error::ReloadExhausted]
	/// when either limit is reached. The pipeline is stopped either way.
	pub async fn run(&mut self, events: &mut mpsc::UnboundedReceiver<PlayerEvent>) -> Result<(), Error> {
		let res = loop {
			tokio::select! {
				Some(event) = self.transport.next() => {
					if let Err(err) = self.on_event(event) {
						break Err(err);
					}
				}
				event = events.recv() => match event {
					Some(PlayerEvent::Idle) => self.on_idle(),
					Some(PlayerEvent::Pause) => self.on_pause(),
					None => break Ok(()),
				},
			}

			if !self.errors.should_escalate() {
				continue;
			}

			self.reloads += 1;
			if self.reloads > self.config.max_reloads {
				tracing::error!(reloads = self.config.max_reloads, errors = %self.errors.summary(), "giving up on pipeline");
				let err = Error::ReloadExhausted(self.config.max_reloads);
				self.record(err.clone());
				break Err(err);
			}

			let Some(sink) = self.unload() else {
				continue;
			};

			let delay = self.config.reconnect.delay * self.reloads;
			tracing::info!(reload = self.reloads, ?delay, "waiting to reload");
			if !wait(events, delay).await {
				break Ok(());
			}

			self.restart(sink);
		};

		self.stop();
		res
	}

	/// Handle a single transport event, returning an error only when the transport gave up.
	pub fn on_event(&mut self, event: TransportEvent) -> Result<(), Error> {
		match event {
			TransportEvent::Message(Message::Binary(chunk)) => self.on_segment(chunk),
			TransportEvent::Message(Message::Text(text)) => self.on_control(&text),
			TransportEvent::Error(err) => self.record(err),
			TransportEvent::Failed(err) => {
				self.record(err.clone());
				return Err(err);
			}
		}

		Ok(())
	}

	fn on_control(&mut self, text: &str) {
		match Control::decode(text) {
			Ok(Control::Mse(mime)) if self.negotiated => {
				tracing::debug!(%mime, "ignoring repeated negotiation");
			}
			Ok(Control::Mse(mime)) => {
				tracing::info!(%mime, "negotiated");
				self.negotiated = true;

				if let Err(err) = self.buffer.open(&mime) {
					self.record(err);
				}
			}
			Ok(Control::Error(message)) => self.record(Error::Remote(message)),
			Err(err) => tracing::debug!(%err, %text, "ignoring text message"),
		}
	}

	fn on_segment(&mut self, chunk: Bytes) {
		if !self.negotiated {
			tracing::debug!(size = chunk.len(), "dropping segment before negotiation");
			return;
		}

		match self.buffer.submit(chunk) {
			Ok(()) => {
				self.reloads = 0;
				self.catch_up();
			}
			Err(err) => self.record(err),
		}
	}

	/// The decode buffer is idle: append the next segment and keep up while hidden.
	pub fn on_idle(&mut self) {
		if !self.buffer.is_open() {
			return;
		}

		if let Err(err) = self.buffer.on_idle() {
			self.record(err);
		}

		self.catch_up();
	}

	fn catch_up(&mut self) {
		let Some(sink) = self.buffer.sink_mut() else {
			return;
		};

		if let Some(seek) = position::catch_up(&sink.playback(), &self.config.playback) {
			tracing::debug!(position = ?seek.position, "catching up while hidden");
			sink.seek(seek.position);
		}
	}

	/// Playback paused: jump back to the live edge and resume.
	pub fn on_pause(&mut self) {
		if !self.buffer.is_bound() {
			return;
		}

		let Some(sink) = self.buffer.sink_mut() else {
			return;
		};

		let Some(seek) = position::unstall(&sink.playback(), &self.config.playback) else {
			return;
		};

		tracing::debug!(position = ?seek.position, "resuming at live edge");
		sink.seek(seek.position);

		if !seek.resume {
			return;
		}

		if let Err(err) = sink.play() {
			self.record(Error::Playback(err));
		}
	}

	/// Close the decode buffer, then the connection.
	pub fn stop(&mut self) {
		let res = self.buffer.close();
		self.transport.disconnect();

		if let Err(err) = res {
			self.record(err);
		}
	}

	/// Tear everything down and start again on the same sink, right away.
	pub fn reload(&mut self) {
		if let Some(sink) = self.unload() {
			self.restart(sink);
		}
	}

	fn unload(&mut self) -> Option<S> {
		tracing::warn!(errors = %self.errors.summary(), "reloading pipeline");

		self.stop();
		let sink = self.buffer.take_sink();
		if sink.is_none() {
			tracing::warn!("no sink to reload");
		}
		sink
	}

	fn restart(&mut self, sink: S) {
		self.transport = self.transport.renew();
		self.buffer = Buffer::new();
		self.start(sink);
	}

	pub fn errors(&self) -> &ErrorPolicy {
		&self.errors
	}

	pub fn transport(&self) -> &Transport<C> {
		&self.transport
	}

	pub fn buffer(&self) -> &Buffer<S> {
		&self.buffer
	}

	fn record(&mut self, err: Error) {
		self.errors.record(err.kind(), err.to_string());
	}
}

// Sleep while the pipeline is down, returning false if the player went away first.
async fn wait(events: &mut mpsc::UnboundedReceiver<PlayerEvent>, delay: Duration) -> bool {
	let sleep = tokio::time::sleep(delay);
	tokio::pin!(sleep);

	loop {
		tokio::select! {
			_ = &mut sleep => return true,
			event = events.recv() => if event.is_none() {
				return false;
			},
		}
	}
}
