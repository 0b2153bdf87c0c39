//! Per-cycle statistics

use std::time::Duration;

/// Counters for a single sync cycle
///
/// A fresh block is created at the start of every cycle; nothing is carried
/// over between cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
	pub files_checked: u64,
	pub files_changed: u64,
	pub files_created: u64,
	pub files_overwritten: u64,
	pub files_deleted: u64,
	pub directories_checked: u64,
	pub directories_created: u64,
	pub directories_deleted: u64,
	pub bytes_checked: u64,
	pub bytes_written: u64,
}

impl Statistics {
	pub fn new() -> Self {
		Self::default()
	}

	/// True if the cycle modified the destination in any way
	pub fn destination_modified(&self) -> bool {
		self.files_changed > 0
			|| self.files_deleted > 0
			|| self.directories_created > 0
			|| self.directories_deleted > 0
	}

	/// Human-readable summary printed after each cycle
	pub fn summary_lines(&self) -> Vec<String> {
		vec![
			format!(
				"Checked {} files for {} bytes in {} directories",
				self.files_checked, self.bytes_checked, self.directories_checked
			),
			format!(
				"Created {} files and overwrote {} files",
				self.files_created, self.files_overwritten
			),
			format!("Wrote {} bytes in {} files", self.bytes_written, self.files_changed),
			format!(
				"Created {} directories, deleted {} files and {} directories",
				self.directories_created, self.files_deleted, self.directories_deleted
			),
		]
	}
}

/// How long a cycle took relative to the configured interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUsage {
	/// Less than half the interval
	Comfortable,
	/// At least half the interval
	OverHalf,
	/// Longer than the interval
	Exceeded,
}

impl IntervalUsage {
	pub fn classify(elapsed: Duration, interval: Duration) -> Self {
		if elapsed > interval {
			IntervalUsage::Exceeded
		} else if elapsed >= interval / 2 {
			IntervalUsage::OverHalf
		} else {
			IntervalUsage::Comfortable
		}
	}
}


// vim: ts=4
