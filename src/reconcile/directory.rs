//! Directory reconciliation and destination subtree removal

use futures::future::{BoxFuture, FutureExt};
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::time::Instant;
use tokio::fs as afs;

use super::file::{reconcile_file, FileOutcome};
use super::CycleContext;
use crate::error::{SourceAccess, SyncError};
use crate::logging::*;
use crate::stats::Statistics;
use crate::tree::TrackedDirectory;

/// Names found by one listing of a source directory, sorted
#[derive(Debug, Default)]
struct Listing {
	files: Vec<OsString>,
	directories: Vec<OsString>,
}

/// Read a source directory completely before anything acts on it
///
/// A listing that fails halfway must not be mistaken for deletions, so the
/// result is all or nothing.
async fn list_source(path: &Path) -> io::Result<Listing> {
	let mut listing = Listing::default();
	let mut entries = afs::read_dir(path).await?;
	while let Some(entry) = entries.next_entry().await? {
		let file_type = entry.file_type().await?;
		if file_type.is_file() {
			listing.files.push(entry.file_name());
		} else if file_type.is_dir() {
			listing.directories.push(entry.file_name());
		} else {
			debug!("Skipping {}: not a regular file or directory", entry.path().display());
		}
	}
	listing.files.sort();
	listing.directories.sort();
	Ok(listing)
}

/// Reconcile one tracked directory against the source, depth first
///
/// Every entry seen in the listing is stamped with the cycle's generation;
/// entries left with an older stamp have vanished and are removed from the
/// destination and the tree. A source listing failure skips this subtree for
/// the cycle. Destination failures abort the cycle.
pub fn reconcile_directory<'a>(
	dir: &'a mut TrackedDirectory,
	ctx: &'a mut CycleContext,
) -> BoxFuture<'a, Result<(), SyncError>> {
	async move {
		ctx.stats.directories_checked += 1;
		let start = Instant::now();
		let generation = ctx.generation;

		let listing = match list_source(&dir.source).await {
			Ok(listing) => listing,
			Err(e) => {
				error!("Failed to access {}: {}", dir.source.display(), SourceAccess::of(&e));
				return Ok(());
			}
		};

		let mut skipped = 0usize;
		for name in &listing.files {
			ctx.checkpoint();
			let (file, inserted) = dir.file_entry(name, generation);
			if inserted {
				debug!("New file found: {}", file.source.display());
			}
			if reconcile_file(file, &mut ctx.stats).await? == FileOutcome::Skipped {
				skipped += 1;
			}
		}
		if skipped > 0 {
			debug!("Skipped {} unreadable files in {}", skipped, dir.display_path().display());
		}

		for name in dir.stale_files(generation) {
			if let Some(file) = dir.file(&name) {
				info!("Deleting file {}", file.destination.display());
				remove_destination_file(&file.destination).await?;
				ctx.stats.files_deleted += 1;
			}
			dir.remove_file(&name);
		}

		for name in &listing.directories {
			let (child, inserted) = dir.directory_entry(name, generation);
			if inserted {
				debug!("New directory found: {}", child.source.display());
				create_destination_dir(&child.destination, &mut ctx.stats).await?;
			}
			reconcile_directory(child, ctx).await?;
		}

		for name in dir.stale_directories(generation) {
			if let Some(child) = dir.directory(&name) {
				info!("Deleting directory {}", child.display_path().display());
				delete_destination_tree(&child.destination, &mut ctx.stats).await?;
			}
			dir.remove_directory(&name);
		}

		debug!(
			"Finished synchronizing directory {} in {} ms",
			dir.display_path().display(),
			start.elapsed().as_millis()
		);
		Ok(())
	}
	.boxed()
}

async fn create_destination_dir(path: &Path, stats: &mut Statistics) -> Result<(), SyncError> {
	let fail = |source: io::Error| SyncError::CreateDirFailed { path: path.to_path_buf(), source };
	if afs::try_exists(path).await.map_err(fail)? {
		return Ok(());
	}
	info!("Creating directory {}", path.display());
	afs::create_dir_all(path).await.map_err(fail)?;
	stats.directories_created += 1;
	Ok(())
}

/// Remove one destination file; a file that is already gone counts as removed
async fn remove_destination_file(path: &Path) -> Result<(), SyncError> {
	match afs::remove_file(path).await {
		Ok(()) => Ok(()),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
		Err(source) => Err(SyncError::DeleteFailed { path: path.to_path_buf(), source }),
	}
}

/// Remove a destination directory and everything below it
///
/// Files go first, then subdirectories recursively, then the now empty
/// directory itself.
pub fn delete_destination_tree<'a>(
	path: &'a Path,
	stats: &'a mut Statistics,
) -> BoxFuture<'a, Result<(), SyncError>> {
	async move {
		let fail = |source: io::Error| SyncError::DeleteFailed { path: path.to_path_buf(), source };

		let mut entries = match afs::read_dir(path).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
			Err(e) => return Err(fail(e)),
		};

		let mut subdirs = Vec::new();
		while let Some(entry) = entries.next_entry().await.map_err(fail)? {
			let file_type = entry.file_type().await.map_err(fail)?;
			if file_type.is_dir() {
				subdirs.push(entry.path());
			} else {
				debug!("Deleting file {}", entry.path().display());
				remove_destination_file(&entry.path()).await?;
				stats.files_deleted += 1;
			}
		}

		for subdir in subdirs {
			delete_destination_tree(&subdir, stats).await?;
		}

		afs::remove_dir(path).await.map_err(fail)?;
		stats.directories_deleted += 1;
		Ok(())
	}
	.boxed()
}


// vim: ts=4
