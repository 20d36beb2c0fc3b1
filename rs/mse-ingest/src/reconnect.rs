use std::time::Duration;

use crate::ReconnectConfig;

/// The lifecycle of a [crate::Transport] connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
	#[default]
	Idle,
	Connecting,
	Open,
	Reconnecting,
	Failed,
}

/// An input to the [ConnectionState] machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
	Connect,
	Opened,
	/// The socket closed or failed to open; `retry` is the [Backoff] decision.
	Lost {
		retry: bool,
	},
	Elapsed,
	Disconnect,
}

impl ConnectionState {
	pub fn next(self, signal: Signal) -> Self {
		use ConnectionState::*;

		match (self, signal) {
			(_, Signal::Disconnect) => Idle,
			(_, Signal::Connect) => Connecting,
			(Connecting, Signal::Opened) => Open,
			(Connecting | Open, Signal::Lost { retry: true }) => Reconnecting,
			(Connecting | Open, Signal::Lost { retry: false }) => Failed,
			(Reconnecting, Signal::Elapsed) => Connecting,
			(state, _) => state,
		}
	}

	/// Whether the transport has any work left to do.
	pub fn is_active(self) -> bool {
		!matches!(self, Self::Idle | Self::Failed)
	}
}

/// What to do after losing the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retry {
	After(Duration),
	GiveUp,
}

/// Linear backoff with a ceiling on consecutive attempts.
#[derive(Clone, Debug)]
pub struct Backoff {
	attempts: u32,
	max_attempts: u32,
	delay: Duration,
}

impl Backoff {
	pub fn new(config: &ReconnectConfig) -> Self {
		Self {
			attempts: 0,
			max_attempts: config.attempts,
			delay: config.delay,
		}
	}

	/// The connection opened, so start counting from zero again.
	pub fn reset(&mut self) {
		self.attempts = 0;
	}

	pub fn on_lost(&mut self) -> Retry {
		if self.attempts >= self.max_attempts {
			return Retry::GiveUp;
		}

		self.attempts += 1;
		Retry::After(self.delay * self.attempts)
	}

	pub fn attempts(&self) -> u32 {
		self.attempts
	}
}
