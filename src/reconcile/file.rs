//! Single-file reconciliation

use tokio::fs as afs;

use crate::digest::{digest_file, Digest};
use crate::error::{SourceAccess, SyncError};
use crate::logging::*;
use crate::stats::Statistics;
use crate::tree::TrackedFile;

/// What happened to a file during reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
	/// Source could not be read this cycle
	Skipped,
	/// Destination already matches
	Unchanged,
	Created,
	Overwritten,
}

/// Bring one destination file in line with its source
///
/// The source is expected to exist (it was just listed). Failures to read
/// the source are logged and the file is skipped until the next cycle;
/// failures touching the destination are fatal.
pub async fn reconcile_file(
	file: &mut TrackedFile,
	stats: &mut Statistics,
) -> Result<FileOutcome, SyncError> {
	stats.files_checked += 1;

	let size = match afs::metadata(&file.source).await {
		Ok(meta) => meta.len(),
		Err(e) => {
			error!("Cannot access file {}: {}", file.source.display(), SourceAccess::of(&e));
			return Ok(FileOutcome::Skipped);
		}
	};
	stats.bytes_checked += size;

	let mut handle = match afs::File::open(&file.source).await {
		Ok(handle) => handle,
		Err(e) => {
			error!("Cannot access file {}: {}", file.source.display(), SourceAccess::of(&e));
			return Ok(FileOutcome::Skipped);
		}
	};
	let digest = match Digest::of_reader(&mut handle).await {
		Ok(digest) => digest,
		Err(e) => {
			error!("Cannot read file {}: {}", file.source.display(), SourceAccess::of(&e));
			return Ok(FileOutcome::Skipped);
		}
	};
	drop(handle);

	let exists = afs::try_exists(&file.destination)
		.await
		.map_err(|source| SyncError::DestinationRead { path: file.destination.clone(), source })?;

	let outcome = if !exists {
		info!("Creating file {}", file.destination.display());
		FileOutcome::Created
	} else {
		let known = file.digest;
		match known {
			None => {
				// First sighting with both sides present: trust the source
				// digest from now on, and only copy if the bytes differ today.
				file.digest = Some(digest);
				let existing = digest_file(&file.destination).await.map_err(|source| {
					SyncError::DestinationRead { path: file.destination.clone(), source }
				})?;
				if existing == digest {
					debug!("{} already matches the source, no copy needed", file.destination.display());
					return Ok(FileOutcome::Unchanged);
				}
			}
			Some(known) if known == digest => {
				debug!("{} unchanged ({:?})", file.source.display(), digest);
				return Ok(FileOutcome::Unchanged);
			}
			Some(_) => {}
		}
		info!("Overwriting file {}", file.destination.display());
		FileOutcome::Overwritten
	};

	let written = afs::copy(&file.source, &file.destination).await.map_err(|source| {
		SyncError::CopyFailed { from: file.source.clone(), to: file.destination.clone(), source }
	})?;
	file.digest = Some(digest);

	stats.bytes_written += written;
	stats.files_changed += 1;
	match outcome {
		FileOutcome::Created => stats.files_created += 1,
		FileOutcome::Overwritten => stats.files_overwritten += 1,
		FileOutcome::Skipped | FileOutcome::Unchanged => {}
	}
	Ok(outcome)
}


// vim: ts=4
