//! Two-stage cancellation driven by termination signals
//!
//! The first SIGINT/SIGTERM moves the token from `Running` to
//! `CancelRequested`; the sync loop notices at its next checkpoint and exits
//! cleanly. A second signal while a cancellation is already pending exits
//! the process immediately.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Exit status used when the user forces termination (128 + SIGINT)
pub const FORCED_EXIT_CODE: i32 = 130;

/// Observable cancellation states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelState {
	Running,
	CancelRequested,
}

/// Shared, cloneable cancellation token
#[derive(Debug, Clone)]
pub struct Cancellation {
	state: Arc<watch::Sender<CancelState>>,
}

impl Cancellation {
	pub fn new() -> Self {
		let (tx, _rx) = watch::channel(CancelState::Running);
		Cancellation { state: Arc::new(tx) }
	}

	pub fn state(&self) -> CancelState {
		*self.state.borrow()
	}

	pub fn is_requested(&self) -> bool {
		self.state() == CancelState::CancelRequested
	}

	/// Request cancellation, returning the state before the request
	pub fn request(&self) -> CancelState {
		self.state.send_replace(CancelState::CancelRequested)
	}

	/// Sleep for `timeout`, waking early if cancellation is requested
	///
	/// Returns true if cancellation is pending when the wait ends.
	pub async fn wait_timeout(&self, timeout: Duration) -> bool {
		let mut rx = self.state.subscribe();
		if self.is_requested() {
			return true;
		}
		tokio::select! {
			_ = rx.changed() => {}
			_ = tokio::time::sleep(timeout) => {}
		}
		self.is_requested()
	}
}

impl Default for Cancellation {
	fn default() -> Self {
		Self::new()
	}
}

/// Termination signal streams, registered once for the life of the process
///
/// Keeping the same streams across deliveries means a signal arriving while
/// the previous one is being handled is queued rather than lost.
#[cfg(unix)]
struct Signals {
	sigterm: tokio::signal::unix::Signal,
	sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
	fn register() -> std::io::Result<Self> {
		use tokio::signal::unix::{signal, SignalKind};

		Ok(Signals { sigterm: signal(SignalKind::terminate())?, sigint: signal(SignalKind::interrupt())? })
	}

	async fn next(&mut self) -> std::io::Result<&'static str> {
		tokio::select! {
			_ = self.sigterm.recv() => Ok("SIGTERM"),
			_ = self.sigint.recv() => Ok("SIGINT"),
		}
	}
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
	fn register() -> std::io::Result<Self> {
		Ok(Signals)
	}

	async fn next(&mut self) -> std::io::Result<&'static str> {
		tokio::signal::ctrl_c().await?;
		Ok("CTRL+C")
	}
}

/// Spawn a task translating termination signals into cancellation requests
///
/// The handlers are installed before this returns.
pub fn setup_signal_handlers(cancel: Cancellation) {
	let mut signals = match Signals::register() {
		Ok(signals) => signals,
		Err(e) => {
			warn!("Failed to setup signal handler: {}. Process will not shut down gracefully.", e);
			return;
		}
	};
	tokio::spawn(async move {
		loop {
			let name = match signals.next().await {
				Ok(name) => name,
				Err(e) => {
					warn!("Failed to wait for signal: {}. Process will not shut down gracefully.", e);
					return;
				}
			};
			match cancel.request() {
				CancelState::Running => {
					info!(
						"{} received, closing after operations complete. Press again to force-quit.",
						name
					);
				}
				CancelState::CancelRequested => {
					warn!("{} received again, exiting forcefully", name);
					std::process::exit(FORCED_EXIT_CODE);
				}
			}
		}
	});
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_two_stage_request() {
		let cancel = Cancellation::new();
		assert_eq!(cancel.state(), CancelState::Running);

		assert_eq!(cancel.request(), CancelState::Running);
		assert!(cancel.is_requested());

		// The second request sees the pending cancellation
		assert_eq!(cancel.request(), CancelState::CancelRequested);
	}

	#[test]
	fn test_clones_share_state() {
		let cancel = Cancellation::new();
		let other = cancel.clone();
		other.request();
		assert!(cancel.is_requested());
	}

	#[tokio::test]
	async fn test_wait_times_out_without_request() {
		let cancel = Cancellation::new();
		assert!(!cancel.wait_timeout(Duration::from_millis(10)).await);
	}

	#[tokio::test]
	async fn test_wait_returns_immediately_when_already_requested() {
		let cancel = Cancellation::new();
		cancel.request();
		let start = std::time::Instant::now();
		assert!(cancel.wait_timeout(Duration::from_secs(3600)).await);
		assert!(start.elapsed() < Duration::from_secs(5));
	}

	#[tokio::test]
	async fn test_wait_wakes_on_request() {
		let cancel = Cancellation::new();
		let remote = cancel.clone();
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(20)).await;
			remote.request();
		});
		let woke = tokio::time::timeout(Duration::from_secs(10), cancel.wait_timeout(Duration::from_secs(3600)))
			.await
			.expect("wait should wake on cancellation");
		assert!(woke);
	}
}

// vim: ts=4
