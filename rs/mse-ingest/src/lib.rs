//! # mse-ingest: live media over WebSocket into an append-only decode buffer
//!
//! A server pushes fragmented MP4 segments over a WebSocket after a short JSON
//! handshake. This crate keeps that connection alive and feeds each segment to a
//! decoder that only accepts one append at a time.
//!
//! The pieces, leaf first:
//! - [Transport]: one socket with a linear backoff reconnect loop, see [ConnectionState].
//! - [Buffer]: a FIFO in front of a [DecodeBuffer], drained whenever it reports idle.
//! - [ErrorPolicy]: counts errors by [ErrorKind] and decides when to [Escalation::Reload].
//! - [Ingest]: routes messages between them and keeps playback near the live edge.
//!
//! The player itself is supplied by the host through the [MediaSink] trait, and the
//! socket through [Connector]. [WebSocketConnector] is the real one.
//!
//! Includes optional logging ([Log]) and configuration ([Config]).

mod buffer;
mod config;
mod error;
mod ingest;
mod message;
mod platform;
mod policy;
mod reconnect;
mod transport;
mod websocket;

pub mod log;
pub mod position;

#[cfg(test)]
mod mock;

pub use buffer::*;
pub use config::*;
pub use error::*;
pub use ingest::*;
pub use log::*;
pub use message::*;
pub use platform::*;
pub use policy::*;
pub use position::{Playback, Seek};
pub use reconnect::*;
pub use transport::*;
pub use websocket::*;

// Re-export these crates.
pub use bytes;
pub use url;
