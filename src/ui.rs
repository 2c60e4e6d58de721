//! Terminal reporting
//!
//! All progress output goes to stderr and is gated by a [`Verbosity`] level,
//! so task output on stdout stays clean.

use colored::Colorize;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    #[default]
    Normal = 2,
    Verbose = 3,
}

/// Verbosity-gated stderr reporter
#[derive(Debug, Clone, Copy, Default)]
pub struct Ui {
    pub verbosity: Verbosity,
}

impl Ui {
    pub fn new(verbosity: Verbosity) -> Self {
        Ui { verbosity }
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[INFO]".green().bold(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    /// Echo a shell command before it runs
    pub fn print_command(&self, command: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[RUN]".cyan().bold(), command);
        }
    }

    /// Print task start message
    pub fn print_task_start(&self, task_name: &str) {
        self.print_info(&format!("Running task: {}", task_name.bold()));
    }

    /// Print task complete message
    pub fn print_task_complete(&self, task_name: &str) {
        self.print_debug(&format!("Task completed: {}", task_name));
    }

    /// Print hook start message
    pub fn print_hook(&self, task_name: &str, stage: &str) {
        self.print_debug(&format!("Running {} of '{}'", stage, task_name));
    }
}
