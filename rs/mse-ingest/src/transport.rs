use std::collections::VecDeque;
use std::pin::Pin;

use futures::future::BoxFuture;
use futures::{FutureExt, Sink, SinkExt, Stream, StreamExt};
use url::Url;

use crate::{Backoff, ConnectionState, Error, Message, ReconnectConfig, Retry, Signal};

/// A message-oriented, bidirectional socket.
pub trait Socket:
	Stream<Item = Result<Message, Error>> + Sink<Message, Error = Error> + Send + Unpin + 'static
{
}

impl<T> Socket for T where
	T: Stream<Item = Result<Message, Error>> + Sink<Message, Error = Error> + Send + Unpin + 'static
{
}

/// Opens sockets for a [Transport].
pub trait Connector: Clone + Send + 'static {
	type Socket: Socket;

	fn connect(&self, url: Url) -> BoxFuture<'static, Result<Self::Socket, Error>>;
}

/// Something that happened on the [Transport].
#[derive(Debug)]
pub enum TransportEvent {
	/// An inbound message, in arrival order.
	Message(Message),

	/// The connection failed or dropped; a reconnect may be scheduled.
	Error(Error),

	/// Reconnection gave up. Emitted once, nothing follows.
	Failed(Error),
}

struct Target {
	url: Url,
	handshake: Message,
}

/// A single socket connection that reconnects with linear backoff.
///
/// Events are pulled with [Transport::next], which is cancel safe: any pending
/// connect or backoff timer is held by the transport between calls.
pub struct Transport<C: Connector> {
	connector: C,
	config: ReconnectConfig,
	target: Option<Target>,
	state: ConnectionState,
	backoff: Backoff,

	connecting: Option<BoxFuture<'static, Result<C::Socket, Error>>>,
	socket: Option<C::Socket>,
	sleep: Option<Pin<Box<tokio::time::Sleep>>>,

	pending: VecDeque<TransportEvent>,
}

impl<C: Connector> Transport<C> {
	pub fn new(connector: C, config: ReconnectConfig) -> Self {
		Self {
			connector,
			backoff: Backoff::new(&config),
			config,
			target: None,
			state: ConnectionState::Idle,
			connecting: None,
			socket: None,
			sleep: None,
			pending: VecDeque::new(),
		}
	}

	/// Start connecting to `url`, sending `handshake` as the first message of every connection.
	///
	/// Any existing connection is closed first.
	pub fn connect(&mut self, url: Url, handshake: Message) {
		self.disconnect();

		tracing::info!(%url, "connecting");
		self.target = Some(Target { url, handshake });
		self.open();
	}

	/// Close the socket and cancel any pending reconnect. Safe to call repeatedly.
	pub fn disconnect(&mut self) {
		if let Some(socket) = self.socket.take() {
			tracing::debug!("closing socket");
			close(socket);
		}

		self.connecting = None;
		self.sleep = None;
		self.target = None;
		self.pending.clear();
		self.backoff.reset();
		self.transition(Signal::Disconnect);
	}

	pub fn state(&self) -> ConnectionState {
		self.state
	}

	pub fn attempts(&self) -> u32 {
		self.backoff.attempts()
	}

	/// A fresh transport with the same connector and settings.
	pub fn renew(&self) -> Self {
		Self::new(self.connector.clone(), self.config.clone())
	}

	/// Wait for the next event, or `None` once idle or failed.
	pub async fn next(&mut self) -> Option<TransportEvent> {
		loop {
			if let Some(event) = self.pending.pop_front() {
				return Some(event);
			}

			match self.state {
				ConnectionState::Idle | ConnectionState::Failed => return None,
				ConnectionState::Connecting => {
					let res = self.connecting.as_mut()?.await;
					self.connecting = None;

					match res {
						Ok(socket) => {
							tracing::info!(attempts = self.backoff.attempts(), "connected");
							self.socket = Some(socket);
							self.backoff.reset();
							self.transition(Signal::Opened);
						}
						Err(err) => {
							tracing::warn!(%err, "failed to connect");
							self.pending.push_back(TransportEvent::Error(err));
							self.lost();
						}
					}
				}
				ConnectionState::Open => match self.socket.as_mut()?.next().await {
					Some(Ok(message)) => return Some(TransportEvent::Message(message)),
					Some(Err(err)) => {
						tracing::warn!(%err, "socket error");
						self.socket = None;
						self.pending.push_back(TransportEvent::Error(err));
						self.lost();
					}
					None => {
						tracing::info!("socket closed");
						self.socket = None;
						self.lost();
					}
				},
				ConnectionState::Reconnecting => {
					if let Some(sleep) = self.sleep.as_mut() {
						sleep.await;
					}
					self.sleep = None;
					self.transition(Signal::Elapsed);
					self.open();
				}
			}
		}
	}

	fn open(&mut self) {
		let Some(target) = &self.target else {
			return;
		};

		let connect = self.connector.connect(target.url.clone());
		let handshake = target.handshake.clone();

		self.connecting = Some(
			async move {
				let mut socket = connect.await?;
				socket.send(handshake).await?;
				Ok(socket)
			}
			.boxed(),
		);
		self.transition(Signal::Connect);
	}

	fn lost(&mut self) {
		match self.backoff.on_lost() {
			Retry::After(delay) => {
				tracing::warn!(attempt = self.backoff.attempts(), delay = ?delay, "reconnecting");
				self.sleep = Some(Box::pin(tokio::time::sleep(delay)));
				self.transition(Signal::Lost { retry: true });
			}
			Retry::GiveUp => {
				tracing::error!(attempts = self.backoff.attempts(), "giving up on connection");
				self.pending.push_back(TransportEvent::Failed(Error::ReconnectExhausted));
				self.transition(Signal::Lost { retry: false });
			}
		}
	}

	fn transition(&mut self, signal: Signal) {
		let next = self.state.next(signal);
		if next != self.state {
			tracing::trace!(from = ?self.state, to = ?next, "transport state");
		}
		self.state = next;
	}
}

impl<C: Connector> Drop for Transport<C> {
	fn drop(&mut self) {
		self.disconnect();
	}
}

// Send a close frame in the background if we're inside a runtime, otherwise just drop the socket.
fn close<S: Socket>(mut socket: S) {
	if let Ok(runtime) = tokio::runtime::Handle::try_current() {
		runtime.spawn(async move {
			if let Err(err) = socket.close().await {
				tracing::debug!(%err, "failed to close socket");
			}
		});
	}
}
