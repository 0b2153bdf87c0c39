//! Logging prelude module for convenient access to tracing macros.
//!
//! Log output always goes to the console. When a log file is configured, the
//! same events are also written to it, and a failed write is remembered so
//! the sync loop can stop: the log file is an audit trail and must not
//! silently fall behind.
//!
//! # Usage
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("This is an info message");
//! warn!("This is a warning");
//! ```

pub use tracing::{debug, error, info, warn};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

use crate::error::SyncError;

#[derive(Debug)]
struct LogFileInner {
	path: PathBuf,
	file: Mutex<fs::File>,
	failure: Mutex<Option<io::Error>>,
}

/// Shared handle to the log file
#[derive(Debug, Clone)]
pub struct LogFile {
	inner: Arc<LogFileInner>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
	m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl LogFile {
	/// Create the log file, truncating anything already there
	pub fn create(path: impl AsRef<Path>) -> Result<Self, SyncError> {
		let path = path.as_ref().to_path_buf();
		let file = fs::File::create(&path)
			.map_err(|source| SyncError::LogFile { path: path.clone(), source })?;
		Ok(LogFile {
			inner: Arc::new(LogFileInner { path, file: Mutex::new(file), failure: Mutex::new(None) }),
		})
	}

	pub fn path(&self) -> &Path {
		&self.inner.path
	}

	/// Report the first write failure since the last check, if any
	pub fn check(&self) -> Result<(), SyncError> {
		match lock(&self.inner.failure).take() {
			Some(e) => Err(SyncError::LogWrite(e)),
			None => Ok(()),
		}
	}

	fn record_failure(&self, e: &io::Error) {
		let mut failure = lock(&self.inner.failure);
		if failure.is_none() {
			*failure = Some(io::Error::new(e.kind(), e.to_string()));
		}
	}
}

impl Write for LogFile {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let result = lock(&self.inner.file).write_all(buf);
		match result {
			Ok(()) => Ok(buf.len()),
			Err(e) => {
				self.record_failure(&e);
				Err(e)
			}
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		let result = lock(&self.inner.file).flush();
		if let Err(e) = &result {
			self.record_failure(e);
		}
		result
	}
}

impl<'a> MakeWriter<'a> for LogFile {
	type Writer = LogFile;

	fn make_writer(&'a self) -> Self::Writer {
		self.clone()
	}
}

/// Initialize the tracing subscriber with environment filter support.
///
/// By default, logs at INFO level and above are displayed. Control the log level
/// with the `RUST_LOG` environment variable:
///
/// ```bash
/// RUST_LOG=debug dirmirror ./src ./dst 5
/// RUST_LOG=dirmirror::reconcile=debug dirmirror ./src ./dst 5
/// ```
pub fn init_tracing(log_file: Option<LogFile>) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
	let console = tracing_subscriber::fmt::layer().with_writer(io::stderr);
	let file = log_file.map(|log| tracing_subscriber::fmt::layer().with_ansi(false).with_writer(log));

	tracing_subscriber::registry().with(filter).with(console).with(file).init();
}


// vim: ts=4
