//! Task definitions, validation and the fluent builder

pub mod definition;
pub mod fluent;
pub mod validate;

// Re-export main types
pub use definition::*;
pub use fluent::*;
pub use validate::*;
