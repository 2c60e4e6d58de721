//! Command-line binding for tasks
//!
//! This module adapts clap to what the registry needs from an argument
//! parser: named options, checks over the parsed result, lazy parsing and
//! help rendering.

pub mod context;
pub mod parsed;

// Re-export main types
pub use context::*;
pub use parsed::*;

/// Arguments of the current process, program name first
pub fn process_args() -> Vec<String> {
    std::env::args().collect()
}
