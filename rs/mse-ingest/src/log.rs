use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Log configuration, usually flattened into a host application's arguments.
#[derive(Clone, Debug, clap::Args)]
pub struct Log {
	/// The level to log at, unless overridden by `RUST_LOG`.
	#[arg(id = "log-level", long = "log-level", env = "MSE_LOG_LEVEL", default_value = "info")]
	pub level: Level,
}

impl Default for Log {
	fn default() -> Self {
		Self { level: Level::INFO }
	}
}

impl Log {
	pub fn filter(&self) -> EnvFilter {
		EnvFilter::builder()
			.with_default_directive(LevelFilter::from_level(self.level).into())
			.from_env_lossy()
	}

	/// Install the global subscriber; later calls are ignored.
	pub fn init(&self) {
		let res = tracing_subscriber::fmt()
			.with_env_filter(self.filter())
			.with_writer(std::io::stderr)
			.try_init();

		if let Err(err) = res {
			tracing::debug!(%err, "logging already initialized");
		}
	}
}
