//! Manifest loading
//!
//! This module discovers and parses taskchain.yml files and turns their
//! task entries into registered task definitions.

pub mod parse;
pub mod types;

// Re-export main types
pub use parse::*;
pub use types::*;
