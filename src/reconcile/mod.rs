//! Reconciliation engine: one full pass of the shadow tree over the source
//!
//! A pass is strictly sequential. Directories are walked depth first, each
//! directory's files before its subdirectories, and all statistics are
//! accumulated into the single [`CycleContext`] threaded through the walk.

pub mod directory;
pub mod file;

pub use self::directory::{delete_destination_tree, reconcile_directory};
pub use self::file::{reconcile_file, FileOutcome};

use std::time::{Duration, Instant};

use crate::error::SyncError;
use crate::logging::*;
use crate::stats::Statistics;
use crate::tree::{Generation, TrackedDirectory};
use crate::utils::Cancellation;

/// Mutable state shared by every step of one cycle
#[derive(Debug)]
pub struct CycleContext {
	/// Generation stamped on every entry seen during this cycle
	pub generation: Generation,
	pub stats: Statistics,
	cancel: Cancellation,
	cancel_noticed: bool,
}

impl CycleContext {
	pub fn new(generation: Generation, cancel: Cancellation) -> Self {
		CycleContext { generation, stats: Statistics::new(), cancel, cancel_noticed: false }
	}

	/// Cancellation checkpoint between files
	///
	/// A pending cancellation never interrupts the cycle; it is reported
	/// once and honoured by the scheduler after the cycle completes.
	pub fn checkpoint(&mut self) -> bool {
		let requested = self.cancel.is_requested();
		if requested && !self.cancel_noticed {
			self.cancel_noticed = true;
			info!("Cancellation requested, exiting after the current sync completes");
		}
		requested
	}
}

/// Result of a completed cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
	pub generation: Generation,
	pub stats: Statistics,
	pub elapsed: Duration,
}

/// Run one full synchronization pass from the root
///
/// Source-side failures are handled below and never reach the caller; any
/// error returned here is a destination-side failure and is fatal.
pub async fn run_cycle(
	root: &mut TrackedDirectory,
	generation: Generation,
	cancel: &Cancellation,
) -> Result<CycleReport, SyncError> {
	let mut ctx = CycleContext::new(generation, cancel.clone());
	let start = Instant::now();
	reconcile_directory(root, &mut ctx).await?;
	Ok(CycleReport { generation, stats: ctx.stats, elapsed: start.elapsed() })
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_cycle_resets_statistics() {
		let src = TempDir::new().unwrap();
		let dst = TempDir::new().unwrap();
		fs::write(src.path().join("a.txt"), b"hello").unwrap();

		let cancel = Cancellation::new();
		let mut root = TrackedDirectory::root(src.path(), dst.path());

		let first = run_cycle(&mut root, 1, &cancel).await.unwrap();
		assert_eq!(first.generation, 1);
		assert_eq!(first.stats.files_created, 1);

		let second = run_cycle(&mut root, 2, &cancel).await.unwrap();
		assert_eq!(second.stats.files_created, 0);
		assert_eq!(second.stats.files_checked, 1);
		assert_eq!(root.file("a.txt").unwrap().generation, 2);
	}

	#[test]
	fn test_checkpoint_reports_pending_cancellation() {
		let cancel = Cancellation::new();
		let mut ctx = CycleContext::new(1, cancel.clone());
		assert!(!ctx.checkpoint());
		cancel.request();
		assert!(ctx.checkpoint());
		assert!(ctx.checkpoint());
	}
}

// vim: ts=4
