//! The streams a server offers, and where to play them.
//!
//! - [ServerConfig]: the server's address, saved in the [Settings].
//! - [Api]: the `/api/streams` REST endpoints.
//! - [Catalog]: the server's streams as [Entry]s with their WebSocket URLs, cached for when the server is down.
//!
//! Each [Entry::url] is what `mse-ingest` connects to.

mod api;
mod catalog;
mod error;
mod server;
mod settings;

pub use api::*;
pub use catalog::*;
pub use error::*;
pub use server::*;
pub use settings::*;
