//! Fluent task builder
//!
//! ```no_run
//! use taskchain::registry::Registry;
//!
//! let mut registry = Registry::new();
//! registry
//!     .create("build")
//!     .describe("Build the project")
//!     .prerequisite("lint")
//!     .on_run(|_ctx| Ok(()))
//!     .register()?;
//! # Ok::<(), taskchain::error::RegistryError>(())
//! ```

use crate::args::{ArgumentContext, ParsedArgs};
use crate::error::{CheckResult, RegistryResult};
use crate::registry::Registry;
use crate::task::{Check, Hook, TaskDefinition, TaskOption};

/// Accumulates a task definition; nothing is validated until [`FluentTask::register`]
#[must_use = "a fluent task does nothing until `register` is called"]
pub struct FluentTask<'r> {
    registry: &'r mut Registry,
    definition: TaskDefinition,
}

impl<'r> FluentTask<'r> {
    pub(crate) fn new(registry: &'r mut Registry, name: impl Into<String>) -> Self {
        FluentTask {
            registry,
            definition: TaskDefinition {
                name: name.into(),
                ..TaskDefinition::default()
            },
        }
    }

    /// The definition accumulated so far
    pub fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.definition.description = description.into();
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.definition.hidden = hidden;
        self
    }

    /// Shorthand for `hidden(true)`
    pub fn hide(self) -> Self {
        self.hidden(true)
    }

    pub fn on_init<F>(mut self, f: F) -> Self
    where
        F: Fn(&ArgumentContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.definition.on_init = Some(Hook::new(f));
        self
    }

    pub fn on_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&ArgumentContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.definition.on_run = Some(Hook::new(f));
        self
    }

    pub fn prerequisite(mut self, name: impl Into<String>) -> Self {
        self.definition.prerequisite_tasks.push(name.into());
        self
    }

    pub fn prerequisites<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition
            .prerequisite_tasks
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Append a named check
    pub fn check<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&ParsedArgs) -> CheckResult + Send + Sync + 'static,
    {
        self.definition.checks.push(Check::new(name, predicate));
        self
    }

    pub fn checks<I>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = Check>,
    {
        self.definition.checks.extend(checks);
        self
    }

    pub fn option(mut self, option: TaskOption) -> Self {
        self.definition.options.push(option);
        self
    }

    pub fn options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = TaskOption>,
    {
        self.definition.options.extend(options);
        self
    }

    /// Register the accumulated definition, ending the chain
    pub fn register(self) -> RegistryResult<TaskDefinition> {
        self.registry.register_definition(self.definition).cloned()
    }
}
