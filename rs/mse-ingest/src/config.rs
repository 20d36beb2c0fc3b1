use std::time::Duration;

/// The codecs offered to the server when none are configured.
pub const DEFAULT_CODECS: &str = "avc1.640029,avc1.64002A,avc1.640033,hvc1.1.6.L153.B0,mp4a.40.2,mp4a.40.5,flac,opus";

/// Reconnection settings for the transport.
#[derive(Clone, Debug, clap::Args, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct ReconnectConfig {
	/// The number of reconnection attempts before giving up.
	#[arg(
		id = "reconnect-attempts",
		long = "reconnect-attempts",
		env = "MSE_RECONNECT_ATTEMPTS",
		default_value = "3"
	)]
	pub attempts: u32,

	/// The base delay between reconnection attempts, multiplied by the attempt number.
	#[arg(
		id = "reconnect-delay",
		long = "reconnect-delay",
		env = "MSE_RECONNECT_DELAY",
		default_value = "1s",
		value_parser = humantime::parse_duration,
	)]
	#[serde(with = "humantime_serde")]
	pub delay: Duration,
}

impl Default for ReconnectConfig {
	fn default() -> Self {
		Self {
			attempts: 3,
			delay: Duration::from_secs(1),
		}
	}
}

/// Playback position recovery settings.
#[derive(Clone, Debug, clap::Args, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct PlaybackConfig {
	/// While hidden, jump to this far behind the buffered end.
	#[arg(
		id = "hidden-offset",
		long = "hidden-offset",
		env = "MSE_HIDDEN_OFFSET",
		default_value = "500ms",
		value_parser = humantime::parse_duration,
	)]
	#[serde(with = "humantime_serde")]
	pub hidden_offset: Duration,

	/// While hidden, only jump once the player is at least this far behind the buffered end.
	#[arg(
		id = "hidden-threshold",
		long = "hidden-threshold",
		env = "MSE_HIDDEN_THRESHOLD",
		default_value = "500ms",
		value_parser = humantime::parse_duration,
	)]
	#[serde(with = "humantime_serde")]
	pub hidden_threshold: Duration,

	/// After a pause, resume this far behind the buffered end.
	#[arg(
		id = "pause-offset",
		long = "pause-offset",
		env = "MSE_PAUSE_OFFSET",
		default_value = "100ms",
		value_parser = humantime::parse_duration,
	)]
	#[serde(with = "humantime_serde")]
	pub pause_offset: Duration,
}

impl Default for PlaybackConfig {
	fn default() -> Self {
		Self {
			hidden_offset: Duration::from_millis(500),
			hidden_threshold: Duration::from_millis(500),
			pause_offset: Duration::from_millis(100),
		}
	}
}

/// Configuration for an ingestion pipeline.
#[derive(Clone, Debug, clap::Args, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct Config {
	/// The comma separated codecs we're willing to decode, sent in the handshake.
	#[arg(long = "codecs", env = "MSE_CODECS", default_value = DEFAULT_CODECS)]
	pub codecs: String,

	/// Rebuild the pipeline after this many media or buffer errors.
	#[arg(long = "escalate-after", env = "MSE_ESCALATE_AFTER", default_value = "3")]
	pub escalate_after: u32,

	/// Give up after this many reloads in a row without a segment getting through.
	#[arg(long = "max-reloads", env = "MSE_MAX_RELOADS", default_value = "3")]
	pub max_reloads: u32,

	#[command(flatten)]
	#[serde(default)]
	pub reconnect: ReconnectConfig,

	#[command(flatten)]
	#[serde(default)]
	pub playback: PlaybackConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			codecs: DEFAULT_CODECS.to_string(),
			escalate_after: 3,
			max_reloads: 3,
			reconnect: ReconnectConfig::default(),
			playback: PlaybackConfig::default(),
		}
	}
}

impl Config {
	pub fn with_codecs(mut self, codecs: impl Into<String>) -> Self {
		self.codecs = codecs.into();
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;

	#[derive(clap::Parser)]
	struct Cli {
		#[command(flatten)]
		config: Config,
	}

	#[test]
	fn cli_defaults_match_default() {
		let cli = Cli::parse_from(["test"]);
		let default = Config::default();

		assert_eq!(cli.config.codecs, default.codecs);
		assert_eq!(cli.config.escalate_after, 3);
		assert_eq!(cli.config.max_reloads, default.max_reloads);
		assert_eq!(cli.config.reconnect.attempts, default.reconnect.attempts);
		assert_eq!(cli.config.reconnect.delay, default.reconnect.delay);
		assert_eq!(cli.config.playback.hidden_offset, default.playback.hidden_offset);
		assert_eq!(cli.config.playback.hidden_threshold, default.playback.hidden_threshold);
		assert_eq!(cli.config.playback.pause_offset, default.playback.pause_offset);
	}

	#[test]
	fn cli_overrides() {
		let cli = Cli::parse_from([
			"test",
			"--codecs",
			"avc1.640029,mp4a.40.2",
			"--reconnect-attempts",
			"5",
			"--reconnect-delay",
			"250ms",
		]);

		assert_eq!(cli.config.codecs, "avc1.640029,mp4a.40.2");
		assert_eq!(cli.config.reconnect.attempts, 5);
		assert_eq!(cli.config.reconnect.delay, Duration::from_millis(250));
	}

	#[test]
	fn toml_partial() {
		let toml = r#"
			codecs = "hvc1.1.6.L153.B0"

			[reconnect]
			delay = "2s"

			[playback]
			pause_offset = "50ms"
		"#;

		let config: Config = toml::from_str(toml).unwrap();
		assert_eq!(config.codecs, "hvc1.1.6.L153.B0");
		assert_eq!(config.reconnect.attempts, 3);
		assert_eq!(config.reconnect.delay, Duration::from_secs(2));
		assert_eq!(config.playback.pause_offset, Duration::from_millis(50));
		assert_eq!(config.playback.hidden_offset, Duration::from_millis(500));
	}

	#[test]
	fn toml_rejects_unknown() {
		let toml = r#"
			[reconnect]
			backoff = "exponential"
		"#;

		assert!(toml::from_str::<Config>(toml).is_err());
	}
}
