//! Shared utilities for Strand.

pub mod logging;

pub use logging::{init_logging, LogFormat};
