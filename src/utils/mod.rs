//! Utility modules for common functionality

pub mod signal;

pub use signal::{setup_signal_handlers, CancelState, Cancellation};

// vim: ts=4
