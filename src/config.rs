//! Run configuration built from the command line
//!
//! Validation happens once at startup; every failure here is reported before
//! any synchronization begins. Parsing the arguments touches nothing on disk;
//! the directories are checked separately by [`Config::verify_directories`]
//! once logging is up, so that its warnings reach the log.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SyncError;
use crate::logging::*;

/// Validated configuration for a mirroring run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	/// Directory mirrored from
	pub source: PathBuf,

	/// Directory mirrored into
	pub destination: PathBuf,

	/// Pause between the end of one cycle and the start of the next
	pub interval: Duration,

	/// Optional file receiving a copy of all log output
	pub log_file: Option<PathBuf>,
}

impl Config {
	/// Validate raw command-line values
	pub fn from_args(
		source: &str,
		destination: &str,
		interval: &str,
		log_file: Option<&str>,
	) -> Result<Self, SyncError> {
		let source = non_empty_path("Source", source)?;
		let destination = non_empty_path("Destination", destination)?;
		let interval = parse_interval(interval)?;
		let log_file = match log_file {
			Some("") => {
				return Err(SyncError::InvalidConfig {
					message: "Log file cannot be an empty string".to_string(),
				})
			}
			Some(path) => Some(PathBuf::from(path)),
			None => None,
		};
		Ok(Config { source, destination, interval, log_file })
	}

	pub fn interval_secs(&self) -> f64 {
		self.interval.as_secs_f64()
	}

	/// Check that source and destination exist and are directories
	pub fn verify_directories(&self) -> Result<(), SyncError> {
		verify_directory(&self.source)?;
		verify_directory(&self.destination)
	}
}

fn non_empty_path(label: &str, raw: &str) -> Result<PathBuf, SyncError> {
	if raw.is_empty() {
		return Err(SyncError::InvalidConfig { message: format!("{} cannot be an empty string", label) });
	}
	Ok(PathBuf::from(raw))
}

/// Check that a path names an existing directory
///
/// A permission error while checking is only logged: the directory may
/// still be usable, and per-directory failures are handled during sync.
fn verify_directory(path: &Path) -> Result<(), SyncError> {
	match fs::metadata(path) {
		Ok(meta) if meta.is_dir() => Ok(()),
		Ok(_) => Err(SyncError::InvalidConfig {
			message: format!("{} is not a directory", path.display()),
		}),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SyncError::InvalidConfig {
			message: format!("Directory {} does not exist", path.display()),
		}),
		Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
			warn!("Cannot access directory {}: access denied", path.display());
			Ok(())
		}
		Err(e) => {
			warn!("Cannot access directory {}: unknown error {}", path.display(), e);
			Ok(())
		}
	}
}

/// Parse a positive number of seconds, fractions allowed
pub fn parse_interval(raw: &str) -> Result<Duration, SyncError> {
	let secs: f64 = raw.trim().parse().map_err(|_| SyncError::InvalidConfig {
		message: "Interval is not a valid floating point value".to_string(),
	})?;
	if !secs.is_finite() {
		return Err(SyncError::InvalidConfig {
			message: "Interval is not a valid floating point value".to_string(),
		});
	}
	if secs <= 0.0 {
		return Err(SyncError::InvalidConfig {
			message: "Interval value must be greater than 0".to_string(),
		});
	}
	Duration::try_from_secs_f64(secs).map_err(|e| SyncError::InvalidConfig {
		message: format!("Interval is out of range: {}", e),
	})
}


// vim: ts=4
