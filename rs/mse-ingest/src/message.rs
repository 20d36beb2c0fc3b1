use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A single WebSocket message, in either direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
	/// A JSON control message.
	Text(String),

	/// One media segment, appended verbatim to the decode buffer.
	Binary(Bytes),
}

/// A JSON control message exchanged with the server.
///
/// JSON example:
/// {
///   "type": "mse",
///   "value": "avc1.640029,mp4a.40.2"
/// }
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Control {
	/// Sent by the client with the acceptable codecs, answered by the server with the negotiated MIME type.
	Mse(String),

	/// The server could not produce the stream.
	Error(String),
}

impl Control {
	pub fn encode(&self) -> Result<Message, serde_json::Error> {
		Ok(Message::Text(serde_json::to_string(self)?))
	}

	pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn handshake() {
		let handshake = Control::Mse("avc1.640029,mp4a.40.2".into()).encode().unwrap();
		assert_eq!(
			handshake,
			Message::Text(r#"{"type":"mse","value":"avc1.640029,mp4a.40.2"}"#.into())
		);
	}

	#[test]
	fn negotiated() {
		let reply = Control::decode(r#"{"type":"mse","value":"video/mp4; codecs=\"avc1.640029\""}"#).unwrap();
		assert_eq!(reply, Control::Mse("video/mp4; codecs=\"avc1.640029\"".into()));

		let err = Control::decode(r#"{"type":"error","value":"streams: not found"}"#).unwrap();
		assert_eq!(err, Control::Error("streams: not found".into()));
	}

	#[test]
	fn unrecognized() {
		assert!(Control::decode(r#"{"type":"webrtc/offer","value":"v=0"}"#).is_err());
		assert!(Control::decode("not json").is_err());
	}
}
