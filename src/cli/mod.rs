//! CLI interface
//!
//! This module handles the global command line, manifest loading, task
//! listing and shell completion.

pub mod app;

// Re-export main types
pub use app::*;
