//! Shadow tree: the last known state of the source tree
//!
//! Every tracked entry carries a generation marker, the number of the last
//! cycle in which it was seen in a source listing. After a directory has been
//! listed, children whose marker differs from the current cycle have vanished
//! from the source.
//!
//! Children are kept in a single ordered map keyed by name, so lookup and
//! iteration can never disagree about membership.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::digest::Digest;

/// Cycle number stamped on tracked entries
pub type Generation = u64;

/// A file seen in the source tree
#[derive(Debug, Clone)]
pub struct TrackedFile {
	pub name: OsString,
	pub source: PathBuf,
	pub destination: PathBuf,
	/// Digest of the last copied or verified source content, `None` if never verified
	pub digest: Option<Digest>,
	pub generation: Generation,
}

/// A directory seen in the source tree
#[derive(Debug, Clone)]
pub struct TrackedDirectory {
	/// Path relative to the sync root (empty for the root)
	pub relative: PathBuf,
	pub source: PathBuf,
	pub destination: PathBuf,
	pub generation: Generation,
	files: BTreeMap<OsString, TrackedFile>,
	directories: BTreeMap<OsString, TrackedDirectory>,
}

impl TrackedDirectory {
	/// Root of the shadow tree, stamped with generation 0
	pub fn root(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
		TrackedDirectory {
			relative: PathBuf::new(),
			source: source.into(),
			destination: destination.into(),
			generation: 0,
			files: BTreeMap::new(),
			directories: BTreeMap::new(),
		}
	}

	/// Look up a child file by name, inserting it if unknown, and stamp it
	///
	/// Returns the entry and whether it was newly inserted.
	pub fn file_entry(&mut self, name: &OsStr, generation: Generation) -> (&mut TrackedFile, bool) {
		let mut inserted = false;
		let source = &self.source;
		let destination = &self.destination;
		let file = self.files.entry(name.to_os_string()).or_insert_with(|| {
			inserted = true;
			TrackedFile {
				name: name.to_os_string(),
				source: source.join(name),
				destination: destination.join(name),
				digest: None,
				generation,
			}
		});
		file.generation = generation;
		(file, inserted)
	}

	/// Look up a child directory by name, inserting it if unknown, and stamp it
	///
	/// Returns the entry and whether it was newly inserted. Nothing is
	/// created on disk here.
	pub fn directory_entry(
		&mut self,
		name: &OsStr,
		generation: Generation,
	) -> (&mut TrackedDirectory, bool) {
		let mut inserted = false;
		let relative = &self.relative;
		let source = &self.source;
		let destination = &self.destination;
		let dir = self.directories.entry(name.to_os_string()).or_insert_with(|| {
			inserted = true;
			TrackedDirectory {
				relative: relative.join(name),
				source: source.join(name),
				destination: destination.join(name),
				generation,
				files: BTreeMap::new(),
				directories: BTreeMap::new(),
			}
		});
		dir.generation = generation;
		(dir, inserted)
	}

	/// Names of files not seen during the given generation
	pub fn stale_files(&self, generation: Generation) -> Vec<OsString> {
		self.files
			.values()
			.filter(|f| f.generation != generation)
			.map(|f| f.name.clone())
			.collect()
	}

	/// Names of subdirectories not seen during the given generation
	pub fn stale_directories(&self, generation: Generation) -> Vec<OsString> {
		self.directories
			.iter()
			.filter(|(_, d)| d.generation != generation)
			.map(|(name, _)| name.clone())
			.collect()
	}

	pub fn remove_file(&mut self, name: &OsStr) -> Option<TrackedFile> {
		self.files.remove(name)
	}

	pub fn remove_directory(&mut self, name: &OsStr) -> Option<TrackedDirectory> {
		self.directories.remove(name)
	}

	pub fn file(&self, name: impl AsRef<OsStr>) -> Option<&TrackedFile> {
		self.files.get(name.as_ref())
	}

	pub fn directory(&self, name: impl AsRef<OsStr>) -> Option<&TrackedDirectory> {
		self.directories.get(name.as_ref())
	}

	#[cfg(test)]
	pub fn directory_mut(&mut self, name: impl AsRef<OsStr>) -> Option<&mut TrackedDirectory> {
		self.directories.get_mut(name.as_ref())
	}

	pub fn files(&self) -> impl Iterator<Item = &TrackedFile> {
		self.files.values()
	}

	pub fn directories(&self) -> impl Iterator<Item = &TrackedDirectory> {
		self.directories.values()
	}

	/// Number of files tracked in this whole subtree
	pub fn total_files(&self) -> usize {
		self.files.len() + self.directories.values().map(|d| d.total_files()).sum::<usize>()
	}

	/// Path of this directory relative to the sync root, for log output
	pub fn display_path(&self) -> &Path {
		if self.relative.as_os_str().is_empty() {
			Path::new(".")
		} else {
			&self.relative
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn root() -> TrackedDirectory {
		TrackedDirectory::root("/src", "/dst")
	}

	#[test]
	fn test_root_starts_at_generation_zero() {
		let root = root();
		assert_eq!(root.generation, 0);
		assert_eq!(root.display_path(), Path::new("."));
		assert_eq!(root.files().count(), 0);
	}

	#[test]
	fn test_file_entry_inserts_then_matches() {
		let mut root = root();

		let (file, inserted) = root.file_entry(OsStr::new("a.txt"), 1);
		assert!(inserted);
		assert_eq!(file.source, PathBuf::from("/src/a.txt"));
		assert_eq!(file.destination, PathBuf::from("/dst/a.txt"));
		assert!(file.digest.is_none());
		file.digest = Some(Digest::of_bytes(b"hello"));

		let (file, inserted) = root.file_entry(OsStr::new("a.txt"), 2);
		assert!(!inserted);
		assert_eq!(file.generation, 2);
		assert_eq!(file.digest, Some(Digest::of_bytes(b"hello")));
		assert_eq!(root.files().count(), 1);
	}

	#[test]
	fn test_nested_directory_paths() {
		let mut root = root();
		let (sub, inserted) = root.directory_entry(OsStr::new("sub"), 1);
		assert!(inserted);
		let (deep, _) = sub.directory_entry(OsStr::new("deep"), 1);
		assert_eq!(deep.relative, PathBuf::from("sub/deep"));
		assert_eq!(deep.source, PathBuf::from("/src/sub/deep"));
		assert_eq!(deep.destination, PathBuf::from("/dst/sub/deep"));
	}

	#[test]
	fn test_stale_entries_and_removal() {
		let mut root = root();
		root.file_entry(OsStr::new("keep"), 1);
		root.file_entry(OsStr::new("gone"), 1);
		root.directory_entry(OsStr::new("olddir"), 1);

		root.file_entry(OsStr::new("keep"), 2);
		assert_eq!(root.stale_files(2), vec![OsString::from("gone")]);
		assert_eq!(root.stale_directories(2), vec![OsString::from("olddir")]);

		assert!(root.remove_file(OsStr::new("gone")).is_some());
		assert!(root.remove_directory(OsStr::new("olddir")).is_some());
		assert!(root.file("gone").is_none());
		assert!(root.directory("olddir").is_none());
		assert!(root.stale_files(2).is_empty());
		assert!(root.remove_file(OsStr::new("gone")).is_none());
	}

	#[test]
	fn test_total_files_counts_subtree() {
		let mut root = root();
		root.file_entry(OsStr::new("a"), 1);
		let (sub, _) = root.directory_entry(OsStr::new("sub"), 1);
		sub.file_entry(OsStr::new("b"), 1);
		sub.file_entry(OsStr::new("c"), 1);
		assert_eq!(root.total_files(), 3);
	}
}

// vim: ts=4
