use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::future::BoxFuture;
use futures::{FutureExt, Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::{Connector, Error, Message};

/// Connects over WebSocket, with TLS for `wss://` URLs.
#[derive(Clone, Debug, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
	type Socket = WebSocket;

	fn connect(&self, url: Url) -> BoxFuture<'static, Result<WebSocket, Error>> {
		async move {
			let (inner, response) = tokio_tungstenite::connect_async(url.as_str())
				.await
				.map_err(Error::connect)?;

			tracing::debug!(%url, status = %response.status(), "websocket connected");
			Ok(WebSocket { inner })
		}
		.boxed()
	}
}

/// A client WebSocket carrying text and binary [Message]s.
///
/// Ping and pong frames are handled internally. A close frame ends the stream.
pub struct WebSocket {
	inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Stream for WebSocket {
	type Item = Result<Message, Error>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		loop {
			let message = match ready!(self.inner.poll_next_unpin(cx)) {
				Some(Ok(message)) => message,
				Some(Err(err)) => return Poll::Ready(Some(Err(Error::socket(err)))),
				None => return Poll::Ready(None),
			};

			match message {
				tungstenite::Message::Text(text) => {
					return Poll::Ready(Some(Ok(Message::Text(text.as_str().to_string()))));
				}
				tungstenite::Message::Binary(data) => return Poll::Ready(Some(Ok(Message::Binary(data)))),
				tungstenite::Message::Close(frame) => {
					tracing::debug!(?frame, "websocket closed by remote");
					return Poll::Ready(None);
				}
				_ => continue,
			}
		}
	}
}

impl Sink<Message> for WebSocket {
	type Error = Error;

	fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
		self.inner.poll_ready_unpin(cx).map_err(Error::socket)
	}

	fn start_send(mut self: Pin<&mut Self>, item: Message) -> Result<(), Error> {
		let message = match item {
			Message::Text(text) => tungstenite::Message::Text(text.into()),
			Message::Binary(data) => tungstenite::Message::Binary(data),
		};

		self.inner.start_send_unpin(message).map_err(Error::socket)
	}

	fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
		self.inner.poll_flush_unpin(cx).map_err(Error::socket)
	}

	fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
		self.inner.poll_close_unpin(cx).map_err(Error::socket)
	}
}
