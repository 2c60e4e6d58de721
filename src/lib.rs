//! Taskchain - tasks with prerequisites and a command-line lifecycle
//!
//! Tasks are registered with a description, prerequisite tasks, command-line
//! options and checks, and `on_init`/`on_run` hooks. Running a task parses
//! the command line against the options of its whole prerequisite chain,
//! initialises every task in that chain and then runs the task itself.
//!
//! ```
//! use taskchain::runner::TaskRunner;
//! use taskchain::task::{OptionConfig, TaskOption};
//!
//! let mut runner = TaskRunner::default();
//! runner
//!     .create("build")
//!     .describe("Build the project")
//!     .option(TaskOption::new("release", OptionConfig::flag().alias("r")))
//!     .on_run(|ctx| {
//!         let release = ctx.parsed()?.flag("release");
//!         println!("release build: {}", release);
//!         Ok(())
//!     })
//!     .register()
//!     .unwrap();
//!
//! let argv = ["taskchain", "build", "-r"].map(String::from);
//! runner.run_by_name("build", None, Some(&argv)).unwrap();
//! ```

// Public modules
pub mod args;
pub mod cli;
pub mod config;
pub mod error;
pub mod registry;
pub mod runner;
pub mod task;
pub mod ui;

// Re-export commonly used types
pub use error::{Result, TaskchainError};
pub use registry::Registry;

/// Current version of taskchain
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
