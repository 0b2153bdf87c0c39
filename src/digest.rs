//! Content digests used for change detection
//!
//! Digests are only ever compared for equality; they are not an integrity
//! proof. BLAKE3 is used because it is fast on large files.

use std::fmt;
use std::io;
use std::path::Path;
use tokio::fs as afs;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read buffer size for streaming a file through the hasher
pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Content digest of a file's bytes
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Digest(blake3::Hash);

impl Digest {
	/// Digest of an in-memory buffer
	pub fn of_bytes(buf: &[u8]) -> Self {
		Digest(blake3::hash(buf))
	}

	/// Stream a reader to EOF and digest everything read
	pub async fn of_reader<R>(reader: &mut R) -> io::Result<Self>
	where
		R: AsyncRead + Unpin,
	{
		let mut hasher = blake3::Hasher::new();
		let mut buf = vec![0u8; HASH_BUFFER_SIZE];
		loop {
			let n = reader.read(&mut buf).await?;
			if n == 0 {
				break;
			}
			hasher.update(&buf[..n]);
		}
		Ok(Digest(hasher.finalize()))
	}

	pub fn to_hex(&self) -> String {
		self.0.to_hex().to_string()
	}
}

impl fmt::Display for Digest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.to_hex())
	}
}

impl fmt::Debug for Digest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Digest({})", &self.to_hex()[..16])
	}
}

/// Open a file and digest its contents
pub async fn digest_file(path: &Path) -> io::Result<Digest> {
	let mut file = afs::File::open(path).await?;
	Digest::of_reader(&mut file).await
}


// vim: ts=4
