use std::fmt;
use std::time::SystemTime;

/// The closed set of error buckets tracked by the [ErrorPolicy].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
	Connection,
	Media,
	Buffer,
	Unknown,
}

impl ErrorKind {
	/// Media and buffer errors count towards escalation.
	pub fn is_critical(self) -> bool {
		matches!(self, Self::Media | Self::Buffer)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Connection => "connection",
			Self::Media => "media",
			Self::Buffer => "buffer",
			Self::Unknown => "unknown",
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single recorded error, never modified after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorRecord {
	pub kind: ErrorKind,
	pub message: String,
	pub timestamp: SystemTime,
}

/// Whether accumulated critical errors warrant a full reload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Escalation {
	#[default]
	Stable,
	Degraded {
		critical: u32,
	},
	Reload,
}

impl Escalation {
	/// Advance the state after an error of the given kind.
	pub fn next(self, kind: ErrorKind, threshold: u32) -> Self {
		let critical = match (self, kind.is_critical()) {
			(state, false) => return state,
			(Self::Reload, true) => return Self::Reload,
			(Self::Stable, true) => 1,
			(Self::Degraded { critical }, true) => critical + 1,
		};

		if critical >= threshold {
			Self::Reload
		} else {
			Self::Degraded { critical }
		}
	}
}

/// Records typed errors and decides when the pipeline should be rebuilt.
#[derive(Debug)]
pub struct ErrorPolicy {
	records: Vec<ErrorRecord>,
	last: Option<ErrorRecord>,
	escalation: Escalation,
	threshold: u32,
}

impl ErrorPolicy {
	pub const DEFAULT_THRESHOLD: u32 = 3;

	pub fn new(threshold: u32) -> Self {
		Self {
			records: Vec::new(),
			last: None,
			escalation: Escalation::Stable,
			threshold,
		}
	}

	pub fn record(&mut self, kind: ErrorKind, message: impl Into<String>) -> &ErrorRecord {
		let record = ErrorRecord {
			kind,
			message: message.into(),
			timestamp: SystemTime::now(),
		};

		tracing::warn!(
			%kind,
			timestamp = %humantime::format_rfc3339_millis(record.timestamp),
			"{}",
			record.message
		);

		self.escalation = self.escalation.next(kind, self.threshold);
		self.last = Some(record.clone());
		self.records.push(record);
		&self.records[self.records.len() - 1]
	}

	/// Record an [ErrorKind::Unknown] error, appending the cause when there is one.
	pub fn record_unknown(&mut self, message: &str, cause: Option<&dyn std::error::Error>) -> &ErrorRecord {
		match cause {
			Some(cause) => self.record(ErrorKind::Unknown, format!("{message}: {cause}")),
			None => self.record(ErrorKind::Unknown, message),
		}
	}

	pub fn should_escalate(&self) -> bool {
		self.escalation == Escalation::Reload
	}

	pub fn escalation(&self) -> Escalation {
		self.escalation
	}

	pub fn records(&self) -> &[ErrorRecord] {
		&self.records
	}

	pub fn last(&self) -> Option<&ErrorRecord> {
		self.last.as_ref()
	}

	/// Count records per kind, in the order each kind was first seen.
	pub fn summary(&self) -> String {
		if self.records.is_empty() {
			return "No errors".to_string();
		}

		let mut counts: Vec<(ErrorKind, usize)> = Vec::new();
		for record in &self.records {
			match counts.iter_mut().find(|(kind, _)| *kind == record.kind) {
				Some((_, count)) => *count += 1,
				None => counts.push((record.kind, 1)),
			}
		}

		counts
			.iter()
			.map(|(kind, count)| format!("{kind}: {count}"))
			.collect::<Vec<_>>()
			.join(", ")
	}

	pub fn clear(&mut self) {
		self.records.clear();
		self.last = None;
		self.escalation = Escalation::Stable;
	}
}

impl Default for ErrorPolicy {
	fn default() -> Self {
		Self::new(Self::DEFAULT_THRESHOLD)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn escalates_on_third_critical() {
		let mut policy = ErrorPolicy::default();

		policy.record(ErrorKind::Media, "codec rejected");
		policy.record(ErrorKind::Buffer, "append failed");
		assert!(!policy.should_escalate());
		assert_eq!(policy.escalation(), Escalation::Degraded { critical: 2 });

		policy.record(ErrorKind::Buffer, "append failed");
		assert!(policy.should_escalate());
	}

	#[test]
	fn ignores_connection_and_unknown() {
		let mut policy = ErrorPolicy::default();

		for _ in 0..10 {
			policy.record(ErrorKind::Connection, "socket closed");
			policy.record(ErrorKind::Unknown, "weird");
		}
		assert!(!policy.should_escalate());
		assert_eq!(policy.escalation(), Escalation::Stable);

		policy.record(ErrorKind::Media, "a");
		policy.record(ErrorKind::Connection, "b");
		policy.record(ErrorKind::Media, "c");
		assert!(!policy.should_escalate());
		policy.record(ErrorKind::Unknown, "d");
		policy.record(ErrorKind::Media, "e");
		assert!(policy.should_escalate());
	}

	#[test]
	fn reload_is_sticky_until_clear() {
		let mut state = Escalation::Stable;
		for _ in 0..3 {
			state = state.next(ErrorKind::Buffer, 3);
		}
		assert_eq!(state, Escalation::Reload);
		assert_eq!(state.next(ErrorKind::Connection, 3), Escalation::Reload);
		assert_eq!(state.next(ErrorKind::Media, 3), Escalation::Reload);
	}

	#[test]
	fn summary() {
		let mut policy = ErrorPolicy::default();
		assert_eq!(policy.summary(), "No errors");

		policy.record(ErrorKind::Connection, "a");
		policy.record(ErrorKind::Media, "b");
		policy.record(ErrorKind::Connection, "c");
		assert_eq!(policy.summary(), "connection: 2, media: 1");
	}

	#[test]
	fn last_and_clear() {
		let mut policy = ErrorPolicy::default();
		assert!(policy.last().is_none());

		policy.record(ErrorKind::Media, "first");
		policy.record(ErrorKind::Buffer, "second");
		assert_eq!(policy.last().unwrap().message, "second");
		assert_eq!(policy.records().len(), 2);

		policy.record(ErrorKind::Buffer, "third");
		assert!(policy.should_escalate());

		policy.clear();
		assert!(policy.records().is_empty());
		assert!(policy.last().is_none());
		assert!(!policy.should_escalate());
		assert_eq!(policy.summary(), "No errors");
	}

	#[test]
	fn unknown_with_cause() {
		let mut policy = ErrorPolicy::default();
		let cause = std::io::Error::other("boom");

		let record = policy.record_unknown("player crashed", Some(&cause));
		assert_eq!(record.kind, ErrorKind::Unknown);
		assert_eq!(record.message, "player crashed: boom");

		let record = policy.record_unknown("player crashed", None);
		assert_eq!(record.message, "player crashed");
	}
}
