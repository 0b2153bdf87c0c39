//! Error types for dirmirror operations
//!
//! Only failures that must stop the process are represented here. Source-side
//! read and listing failures are logged where they happen and never become
//! values (see [`SourceAccess`]).

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Fatal error raised by a sync cycle or during startup
#[derive(Debug)]
pub enum SyncError {
	/// Deleting a destination file or directory failed
	DeleteFailed { path: PathBuf, source: io::Error },

	/// Creating a destination directory failed
	CreateDirFailed { path: PathBuf, source: io::Error },

	/// Copying a file into the destination failed
	CopyFailed { from: PathBuf, to: PathBuf, source: io::Error },

	/// Reading an existing destination file for verification failed
	DestinationRead { path: PathBuf, source: io::Error },

	/// Appending to the configured log file failed
	LogWrite(io::Error),

	/// The log file could not be created at startup
	LogFile { path: PathBuf, source: io::Error },

	/// Invalid configuration
	InvalidConfig { message: String },

	/// I/O error
	Io(io::Error),
}

impl SyncError {
	/// Process exit status for this error
	pub fn exit_code(&self) -> i32 {
		1
	}
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::DeleteFailed { path, source } => {
				write!(f, "Unable to delete {}: {}", path.display(), SourceAccess::of(source))
			}
			SyncError::CreateDirFailed { path, source } => {
				write!(
					f,
					"Unable to create directory {}: {}",
					path.display(),
					SourceAccess::of(source)
				)
			}
			SyncError::CopyFailed { from, to, source } => write!(
				f,
				"Unable to copy {} to {}: {}",
				from.display(),
				to.display(),
				SourceAccess::of(source)
			),
			SyncError::DestinationRead { path, source } => {
				write!(f, "Unable to read {}: {}", path.display(), SourceAccess::of(source))
			}
			SyncError::LogWrite(e) => write!(f, "Failed to write the log file: {}", e),
			SyncError::LogFile { path, source } => {
				write!(f, "Unable to create log file at {}: {}", path.display(), SourceAccess::of(source))
			}
			SyncError::InvalidConfig { message } => write!(f, "{}", message),
			SyncError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::DeleteFailed { source, .. }
			| SyncError::CreateDirFailed { source, .. }
			| SyncError::CopyFailed { source, .. }
			| SyncError::DestinationRead { source, .. }
			| SyncError::LogFile { source, .. } => Some(source),
			SyncError::LogWrite(e) | SyncError::Io(e) => Some(e),
			SyncError::InvalidConfig { .. } => None,
		}
	}
}

impl From<io::Error> for SyncError {
	fn from(e: io::Error) -> Self {
		SyncError::Io(e)
	}
}

impl From<String> for SyncError {
	fn from(message: String) -> Self {
		SyncError::InvalidConfig { message }
	}
}

/// Classification of an I/O failure for log output
///
/// Permission problems are reported as `ACCESS DENIED`, everything else as
/// `UNKNOWN ERROR (<message>)`.
#[derive(Debug)]
pub enum SourceAccess<'a> {
	Denied,
	Other(&'a io::Error),
}

impl<'a> SourceAccess<'a> {
	pub fn of(e: &'a io::Error) -> Self {
		if e.kind() == io::ErrorKind::PermissionDenied {
			SourceAccess::Denied
		} else {
			SourceAccess::Other(e)
		}
	}
}

impl fmt::Display for SourceAccess<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SourceAccess::Denied => write!(f, "ACCESS DENIED"),
			SourceAccess::Other(e) => write!(f, "UNKNOWN ERROR ({})", e),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_permission_denied_is_reported_as_access_denied() {
		let e = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
		assert_eq!(SourceAccess::of(&e).to_string(), "ACCESS DENIED");
	}

	#[test]
	fn test_other_errors_carry_their_message() {
		let e = io::Error::new(io::ErrorKind::Other, "disk on fire");
		assert_eq!(SourceAccess::of(&e).to_string(), "UNKNOWN ERROR (disk on fire)");
	}

	#[test]
	fn test_delete_failure_display() {
		let err = SyncError::DeleteFailed {
			path: PathBuf::from("/dst/a.txt"),
			source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
		};
		assert_eq!(err.to_string(), "Unable to delete /dst/a.txt: ACCESS DENIED");
		assert_eq!(err.exit_code(), 1);
		assert!(err.source().is_some());
	}

	#[test]
	fn test_invalid_config_from_string() {
		let err: SyncError = "Interval is not a valid floating point value".to_string().into();
		assert!(matches!(err, SyncError::InvalidConfig { .. }));
		assert!(err.source().is_none());
	}
}

// vim: ts=4
