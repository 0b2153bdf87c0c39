//! # dirmirror - Continuous One-Way Directory Mirroring
//!
//! dirmirror keeps a destination directory in line with a source directory:
//! new and changed files are copied, new subdirectories are created, and
//! anything that disappears from the source is removed from the destination.
//! The pass repeats on a fixed interval until the process is interrupted.
//!
//! The last known state of the source lives in an in-memory shadow tree
//! ([`tree::TrackedDirectory`]). Nothing is persisted, so a restart verifies
//! every existing destination file by digest once before trusting it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dirmirror::config::Config;
//! use dirmirror::scheduler::Scheduler;
//! use dirmirror::utils::Cancellation;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_args("./src", "./dst", "5", None)?;
//!     let mut scheduler = Scheduler::new(config, Cancellation::new());
//!     let report = scheduler.run_once().await?;
//!     println!("Created {} files", report.stats.files_created);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod scheduler;
pub mod stats;
pub mod tree;
pub mod utils;

// Re-export commonly used types and functions
pub use config::Config;
pub use error::SyncError;
pub use reconcile::{run_cycle, CycleReport};
pub use scheduler::Scheduler;
pub use stats::Statistics;
pub use tree::{TrackedDirectory, TrackedFile};

// vim: ts=4
