//! In-memory platform and socket used by the unit tests.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{FutureExt, Sink, Stream};
use tokio::sync::mpsc;
use tokio::time::Instant;
use url::Url;

use crate::{Connector, DecodeBuffer, Error, MediaSession, MediaSink, Message, PlatformError, Playback};

#[derive(Default)]
struct Net {
	attempts: Vec<Instant>,
	urls: Vec<Url>,
	accept: VecDeque<MockSocket>,
}

/// Refuses every connection unless [MockConnector::accept] queued a socket for it.
#[derive(Clone, Default)]
pub struct MockConnector {
	net: Arc<Mutex<Net>>,
}

impl MockConnector {
	/// Accept the next connection attempt, returning the server side of it.
	pub fn accept(&self) -> MockRemote {
		let (tx, rx) = mpsc::unbounded_channel();
		let sent = Arc::new(Mutex::new(Vec::new()));

		self.net.lock().unwrap().accept.push_back(MockSocket {
			inbound: rx,
			sent: sent.clone(),
		});

		MockRemote { tx, sent }
	}

	pub fn attempts(&self) -> Vec<Instant> {
		self.net.lock().unwrap().attempts.clone()
	}

	pub fn urls(&self) -> Vec<Url> {
		self.net.lock().unwrap().urls.clone()
	}
}

impl Connector for MockConnector {
	type Socket = MockSocket;

	fn connect(&self, url: Url) -> BoxFuture<'static, Result<MockSocket, Error>> {
		let mut net = self.net.lock().unwrap();
		net.attempts.push(Instant::now());
		net.urls.push(url);

		let socket = net.accept.pop_front();
		async move {
			socket.ok_or_else(|| Error::connect(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)))
		}
		.boxed()
	}
}

pub struct MockSocket {
	inbound: mpsc::UnboundedReceiver<Result<Message, Error>>,
	sent: Arc<Mutex<Vec<Message>>>,
}

impl Stream for MockSocket {
	type Item = Result<Message, Error>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		self.inbound.poll_recv(cx)
	}
}

impl Sink<Message> for MockSocket {
	type Error = Error;

	fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
		Poll::Ready(Ok(()))
	}

	fn start_send(self: Pin<&mut Self>, item: Message) -> Result<(), Error> {
		self.sent.lock().unwrap().push(item);
		Ok(())
	}

	fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
		Poll::Ready(Ok(()))
	}

	fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
		Poll::Ready(Ok(()))
	}
}

/// The server end of a [MockSocket].
pub struct MockRemote {
	tx: mpsc::UnboundedSender<Result<Message, Error>>,
	sent: Arc<Mutex<Vec<Message>>>,
}

impl MockRemote {
	pub fn text(&self, text: &str) {
		let _ = self.tx.send(Ok(Message::Text(text.to_string())));
	}

	pub fn binary(&self, data: impl Into<Bytes>) {
		let _ = self.tx.send(Ok(Message::Binary(data.into())));
	}

	pub fn fail(&self) {
		let _ = self.tx.send(Err(Error::socket(std::io::Error::from(
			std::io::ErrorKind::ConnectionReset,
		))));
	}

	pub fn hangup(self) {}

	/// Messages the client sent on this socket.
	pub fn sent(&self) -> Vec<Message> {
		self.sent.lock().unwrap().clone()
	}

	/// Resolves once the client dropped its end of the socket.
	pub async fn closed(&self) {
		self.tx.closed().await
	}
}

#[derive(Debug, Default)]
pub struct Player {
	pub attached: usize,
	pub detached: usize,
	pub plays: usize,
	pub ended: usize,
	pub seeks: Vec<Duration>,
	pub codecs: Vec<String>,
	pub appended: Vec<Bytes>,

	pub session_open: bool,
	pub updating: bool,
	pub playback: Playback,

	pub reject_codecs: bool,
	pub fail_appends: bool,
	pub fail_attach: bool,
}

/// A fake player element shared between the test and the pipeline.
#[derive(Clone, Default)]
pub struct MockPlatform {
	player: Arc<Mutex<Player>>,
}

impl MockPlatform {
	pub fn sink(&self) -> MockSink {
		MockSink { platform: self.clone() }
	}

	pub fn player(&self) -> std::sync::MutexGuard<'_, Player> {
		self.player.lock().unwrap()
	}

	pub fn appended(&self) -> Vec<Bytes> {
		self.player().appended.clone()
	}

	/// The decode buffer finished processing the last append.
	pub fn finish_update(&self) {
		self.player().updating = false;
	}
}

pub struct MockSink {
	platform: MockPlatform,
}

impl MediaSink for MockSink {
	type Session = MockSession;

	fn attach(&mut self) -> Result<MockSession, PlatformError> {
		let mut player = self.platform.player();
		if player.fail_attach {
			return Err(PlatformError::NotSupported("MediaSource".into()));
		}

		player.attached += 1;
		player.session_open = true;
		Ok(MockSession {
			platform: self.platform.clone(),
		})
	}

	fn detach(&mut self) {
		let mut player = self.platform.player();
		player.detached += 1;
		player.session_open = false;
	}

	fn play(&mut self) -> Result<(), PlatformError> {
		self.platform.player().plays += 1;
		Ok(())
	}

	fn seek(&mut self, position: Duration) {
		let mut player = self.platform.player();
		player.seeks.push(position);
		player.playback.position = position;
	}

	fn playback(&self) -> Playback {
		self.platform.player().playback
	}
}

pub struct MockSession {
	platform: MockPlatform,
}

impl MediaSession for MockSession {
	type Buffer = MockBuffer;

	fn is_open(&self) -> bool {
		self.platform.player().session_open
	}

	fn add_buffer(&mut self, codecs: &str) -> Result<MockBuffer, PlatformError> {
		let mut player = self.platform.player();
		if player.reject_codecs {
			return Err(PlatformError::NotSupported(codecs.to_string()));
		}

		player.codecs.push(codecs.to_string());
		Ok(MockBuffer {
			platform: self.platform.clone(),
		})
	}

	fn end_of_stream(&mut self) -> Result<(), PlatformError> {
		let mut player = self.platform.player();
		player.ended += 1;
		player.session_open = false;
		Ok(())
	}
}

pub struct MockBuffer {
	platform: MockPlatform,
}

impl DecodeBuffer for MockBuffer {
	fn is_updating(&self) -> bool {
		self.platform.player().updating
	}

	fn append(&mut self, chunk: Bytes) -> Result<(), PlatformError> {
		let mut player = self.platform.player();
		if player.updating {
			return Err(PlatformError::Busy);
		}
		if player.fail_appends {
			return Err(PlatformError::Decode("corrupt segment".into()));
		}

		player.appended.push(chunk);
		player.updating = true;
		Ok(())
	}
}
