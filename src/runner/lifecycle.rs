//! Init/run lifecycle
//!
//! Running a task parses its command line, calls `on_init` for every task it
//! depends on (each after its own prerequisites, the task itself last), then
//! calls `on_run` for the task alone. Any failure stops the run and propagates.

use crate::args::{process_args, ArgumentContext};
use crate::error::{HookStage, LifecycleError, LifecycleResult};
use crate::registry::Registry;
use crate::task::{FluentTask, Hook};
use crate::ui::{Ui, Verbosity};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The invocation named no registered task; nothing ran
    Skipped,
    /// Help was requested and shown; nothing ran
    HelpShown,
    /// Init hooks and the run hook completed
    Ran,
}

/// Drives task lifecycles over a registry
#[derive(Debug, Default)]
pub struct TaskRunner {
    registry: Registry,
    ui: Ui,
}

impl TaskRunner {
    pub fn new(registry: Registry) -> Self {
        TaskRunner {
            registry,
            ui: Ui::default(),
        }
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.ui = Ui::new(verbosity);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Start a fluent definition on the wrapped registry
    pub fn create(&mut self, name: impl Into<String>) -> FluentTask<'_> {
        self.registry.create(name)
    }

    /// Call `on_init` of every prerequisite of `name`, then of `name` itself
    ///
    /// A prerequisite's hook always runs before the hooks of the tasks that
    /// depend on it.
    pub fn initialise(&self, name: &str, ctx: &ArgumentContext) -> LifecycleResult<()> {
        for task_name in self.registry.dependency_order(name)? {
            let task = self.registry.definition(task_name)?;
            if let Some(on_init) = &task.on_init {
                self.ui.print_hook(task_name, "onInit");
                on_init
                    .call(ctx)
                    .map_err(|source| LifecycleError::Hook {
                        task: task_name.to_string(),
                        stage: HookStage::Init,
                        source,
                    })?;
            }
        }

        Ok(())
    }

    /// Run task `name` for the invocation `argv` (program name first;
    /// defaults to the process arguments)
    ///
    /// `on_run` replaces the task's own run hook when given. When help is
    /// requested it is shown and no hook runs.
    pub fn run_by_name(
        &self,
        name: &str,
        on_run: Option<&Hook>,
        argv: Option<&[String]>,
    ) -> LifecycleResult<()> {
        let on_run = self.effective_on_run(name, on_run)?;
        let argv = argv.map(<[String]>::to_vec).unwrap_or_else(process_args);

        let ctx = self
            .registry
            .build_argument_context(name, argv.into_iter().skip(1))?;
        if ctx.parsed()?.help() {
            ctx.show_help()?;
            return Ok(());
        }

        self.execute(name, &on_run, &ctx)
    }

    /// Run whichever task the invocation `argv` names
    ///
    /// Naming no registered task is not an error: nothing runs.
    pub fn run_current(
        &self,
        on_run: Option<&Hook>,
        argv: Option<&[String]>,
    ) -> LifecycleResult<RunOutcome> {
        let argv = argv.map(<[String]>::to_vec).unwrap_or_else(process_args);

        let ctx = match self.registry.current_task(&argv)? {
            Some(ctx) => ctx,
            None => {
                self.ui.print_debug("No registered task named, nothing to run");
                return Ok(RunOutcome::Skipped);
            }
        };

        if ctx.parsed()?.help() {
            ctx.show_help()?;
            return Ok(RunOutcome::HelpShown);
        }

        let name = ctx.task_name().to_string();
        let on_run = self.effective_on_run(&name, on_run)?;
        self.execute(&name, &on_run, &ctx)?;

        Ok(RunOutcome::Ran)
    }

    fn effective_on_run(&self, name: &str, on_run: Option<&Hook>) -> LifecycleResult<Hook> {
        if let Some(hook) = on_run {
            return Ok(hook.clone());
        }
        self.registry
            .definition(name)?
            .on_run
            .clone()
            .ok_or_else(|| LifecycleError::NoRunnable(name.to_string()))
    }

    fn execute(&self, name: &str, on_run: &Hook, ctx: &ArgumentContext) -> LifecycleResult<()> {
        self.ui.print_task_start(name);

        self.initialise(name, ctx)?;

        self.ui.print_hook(name, "onRun");
        on_run.call(ctx).map_err(|source| LifecycleError::Hook {
            task: name.to_string(),
            stage: HookStage::Run,
            source,
        })?;

        self.ui.print_task_complete(name);
        Ok(())
    }
}
