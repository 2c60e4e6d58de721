//! Task running
//!
//! This module drives the init/run lifecycle over a registry, and provides
//! the shell execution used by manifest-defined tasks.

pub mod command;
pub mod context;
pub mod interpolate;
pub mod lifecycle;
pub mod when;

// Re-export main types
pub use command::*;
pub use context::*;
pub use interpolate::*;
pub use lifecycle::*;
pub use when::*;
