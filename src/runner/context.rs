//! Shell execution context
//!
//! Shared by every shell hook and declarative check built from a manifest.

use crate::ui::{Ui, Verbosity};
use std::env;
use std::path::{Path, PathBuf};

/// Where and how manifest commands run
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory commands run in, and relative paths resolve against
    pub working_dir: PathBuf,

    /// Command prefix, the command text is appended (e.g. ["bash", "-c"])
    pub interpreter: Vec<String>,

    pub ui: Ui,
}

impl Context {
    /// Create a context in the current directory with `sh -c`
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            ui: Ui::default(),
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.ui = Ui::new(verbosity);
        self
    }

    /// Resolve `path` against the working directory
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_new() {
        let ctx = Context::new();
        assert_eq!(ctx.ui.verbosity, Verbosity::Normal);
        assert_eq!(ctx.interpreter, vec!["sh", "-c"]);
    }

    #[test]
    fn test_with_interpreter() {
        let ctx = Context::new().with_interpreter(vec!["bash".to_string(), "-c".to_string()]);
        assert_eq!(ctx.interpreter, vec!["bash", "-c"]);
    }

    #[test]
    fn test_resolve_path() {
        let ctx = Context::new().with_working_dir("/work");
        assert_eq!(ctx.resolve_path("out/a.txt"), PathBuf::from("/work/out/a.txt"));
        assert_eq!(ctx.resolve_path("/tmp/b"), PathBuf::from("/tmp/b"));
    }
}
