use std::time::Duration;

use crate::PlaybackConfig;

/// A snapshot of the player's position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Playback {
	/// The current play position.
	pub position: Duration,

	/// The end of the last buffered range, if anything is buffered.
	pub buffered_end: Option<Duration>,

	/// The page or window showing the player is in the background.
	pub hidden: bool,
}

impl Playback {
	/// How far the play position trails the buffered end.
	pub fn lag(&self) -> Option<Duration> {
		Some(self.buffered_end?.saturating_sub(self.position))
	}
}

/// Move the play position, optionally resuming playback afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seek {
	pub position: Duration,
	pub resume: bool,
}

/// While hidden, skip ahead so the buffer doesn't keep growing.
pub fn catch_up(playback: &Playback, config: &PlaybackConfig) -> Option<Seek> {
	if !playback.hidden {
		return None;
	}

	let end = playback.buffered_end?;
	if playback.lag()? <= config.hidden_threshold {
		return None;
	}

	Some(Seek {
		position: end.saturating_sub(config.hidden_offset),
		resume: false,
	})
}

/// After a pause, jump back to the live edge and keep playing.
pub fn unstall(playback: &Playback, config: &PlaybackConfig) -> Option<Seek> {
	let end = playback.buffered_end?;

	let behind = playback.position + config.pause_offset < end;
	let overrun = playback.position > end;
	if !behind && !overrun {
		return None;
	}

	Some(Seek {
		position: end.saturating_sub(config.pause_offset),
		resume: true,
	})
}
