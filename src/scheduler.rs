//! Periodic sync loop with cooperative cancellation
//!
//! The scheduler owns the shadow tree and the cycle counter for the whole
//! life of the process. Cancellation is only observed between cycles (and
//! reported between files); a cycle in progress always runs to completion.

use crate::config::Config;
use crate::error::SyncError;
use crate::logging::*;
use crate::reconcile::{run_cycle, CycleReport};
use crate::stats::IntervalUsage;
use crate::tree::{Generation, TrackedDirectory};
use crate::utils::Cancellation;

pub struct Scheduler {
	config: Config,
	root: TrackedDirectory,
	cycle: Generation,
	cancel: Cancellation,
	log_file: Option<LogFile>,
}

impl Scheduler {
	pub fn new(config: Config, cancel: Cancellation) -> Self {
		let root = TrackedDirectory::root(&config.source, &config.destination);
		Scheduler { config, root, cycle: 0, cancel, log_file: None }
	}

	/// Check this log file after every cycle and stop if a write failed
	pub fn with_log_file(mut self, log_file: Option<LogFile>) -> Self {
		self.log_file = log_file;
		self
	}

	/// Number of the last cycle started
	pub fn cycle(&self) -> Generation {
		self.cycle
	}

	pub fn root(&self) -> &TrackedDirectory {
		&self.root
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Run a single cycle and report on it
	pub async fn run_once(&mut self) -> Result<CycleReport, SyncError> {
		self.cycle += 1;
		info!(
			"Starting sync #{} {} -> {}",
			self.cycle,
			self.config.source.display(),
			self.config.destination.display()
		);

		let report = match run_cycle(&mut self.root, self.cycle, &self.cancel).await {
			Ok(report) => report,
			Err(e) => {
				error!("CRITICAL: I/O error detected, exiting. {}", e);
				return Err(e);
			}
		};

		info!("Sync #{} complete in {:.3} seconds!", self.cycle, report.elapsed.as_secs_f64());
		match IntervalUsage::classify(report.elapsed, self.config.interval) {
			IntervalUsage::Exceeded => {
				warn!("Total synchronization time exceeded synchronization interval!")
			}
			IntervalUsage::OverHalf => {
				warn!("Total synchronization time is more than half of the synchronization interval")
			}
			IntervalUsage::Comfortable => {}
		}
		for line in report.stats.summary_lines() {
			info!("{}", line);
		}
		if !report.stats.destination_modified() {
			debug!("Destination already up to date");
		}
		debug!("Tracking {} files", self.root.total_files());

		if let Some(log_file) = &self.log_file {
			if let Err(e) = log_file.check() {
				eprintln!("Failed to access the log file {}: {}", log_file.path().display(), e);
				return Err(e);
			}
		}
		Ok(report)
	}

	/// Sync every interval until cancelled
	///
	/// Returns `Ok(())` once a pending cancellation is observed at the top of
	/// the loop, or the first fatal error.
	pub async fn run(&mut self) -> Result<(), SyncError> {
		info!(
			"Synchronizing from {} into {} every {} seconds",
			self.config.source.display(),
			self.config.destination.display(),
			self.config.interval_secs()
		);
		loop {
			if self.cancel.is_requested() {
				info!("Cancellation requested, exiting gracefully");
				return Ok(());
			}
			self.run_once().await?;
			self.cancel.wait_timeout(self.config.interval).await;
		}
	}
}


// vim: ts=4
