//! Task registry and prerequisite resolution
//!
//! The registry is write-once-then-read: tasks are registered up front, and
//! the first lookup freezes it. From then on resolved prerequisite lists can
//! be cached without ever being invalidated.

use crate::args::{command_match_check, ArgumentContext};
use crate::error::{RegistryError, RegistryResult};
use crate::task::{validate_definition, FluentTask, TaskDefinition};
use std::cell::{Cell, OnceCell};
use std::collections::{HashMap, HashSet};

#[derive(Debug)]
struct TaskEntry {
    definition: TaskDefinition,
    /// Lazily computed transitive prerequisites
    resolved: OnceCell<Vec<String>>,
}

/// A task together with its resolved prerequisite list
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTask<'a> {
    pub definition: &'a TaskDefinition,
    /// All transitive prerequisites, first occurrence wins, excluding the task itself
    pub prerequisites: &'a [String],
}

impl<'a> ResolvedTask<'a> {
    pub fn name(&self) -> &'a str {
        &self.definition.name
    }
}

/// Registry of task definitions
#[derive(Debug, Default)]
pub struct Registry {
    tasks: Vec<TaskEntry>,
    index: HashMap<String, usize>,
    frozen: Cell<bool>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Whether a lookup has happened, closing registration
    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    /// Register `definition` under `name` (overriding any name it carries)
    pub fn register(
        &mut self,
        name: impl Into<String>,
        mut definition: TaskDefinition,
    ) -> RegistryResult<&TaskDefinition> {
        definition.name = name.into();
        self.insert(definition)
    }

    /// Register a definition under its own `name`
    pub fn register_definition(
        &mut self,
        definition: TaskDefinition,
    ) -> RegistryResult<&TaskDefinition> {
        self.insert(definition)
    }

    fn insert(&mut self, definition: TaskDefinition) -> RegistryResult<&TaskDefinition> {
        if self.frozen.get() {
            return Err(RegistryError::AlreadyFrozen);
        }

        validate_definition(&definition.name, &definition).map_err(|source| {
            RegistryError::Invalid {
                name: definition.name.clone(),
                source,
            }
        })?;

        if self.index.contains_key(&definition.name) {
            return Err(RegistryError::DuplicateTask(definition.name));
        }

        let position = self.tasks.len();
        self.index.insert(definition.name.clone(), position);
        self.tasks.push(TaskEntry {
            definition,
            resolved: OnceCell::new(),
        });

        Ok(&self.tasks[position].definition)
    }

    /// Start a fluent definition of task `name`
    pub fn create(&mut self, name: impl Into<String>) -> FluentTask<'_> {
        FluentTask::new(self, name)
    }

    /// Whether `name` is registered (does not freeze the registry)
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn entry(&self, name: &str) -> RegistryResult<&TaskEntry> {
        self.index
            .get(name)
            .map(|&position| &self.tasks[position])
            .ok_or_else(|| RegistryError::UnknownTask(name.to_string()))
    }

    /// Look up a task and its transitive prerequisites
    ///
    /// Freezes the registry, even when the lookup fails.
    pub fn resolve(&self, name: &str) -> RegistryResult<ResolvedTask<'_>> {
        self.frozen.set(true);

        let entry = self.entry(name)?;
        let prerequisites = match entry.resolved.get() {
            Some(list) => list,
            None => {
                let list = self.all_prerequisites(name)?;
                entry.resolved.get_or_init(|| list)
            }
        };

        Ok(ResolvedTask {
            definition: &entry.definition,
            prerequisites,
        })
    }

    /// Look up a task definition; same semantics as [`Registry::resolve`]
    pub fn definition(&self, name: &str) -> RegistryResult<&TaskDefinition> {
        Ok(self.resolve(name)?.definition)
    }

    /// Compute the transitive prerequisites of `name`
    ///
    /// Each direct prerequisite is listed, then expanded recursively, in
    /// declared order; duplicates are then dropped keeping the first
    /// occurrence. A task is expanded at most once: a later expansion could
    /// only repeat names already listed, and this keeps cyclic definitions
    /// from recursing forever.
    pub fn all_prerequisites(&self, name: &str) -> RegistryResult<Vec<String>> {
        let mut list = Vec::new();
        let mut expanded = HashSet::new();
        self.collect_prerequisites(name, &mut list, &mut expanded)?;

        let mut seen = HashSet::new();
        list.retain(|task| task != name && seen.insert(task.clone()));
        Ok(list)
    }

    fn collect_prerequisites<'a>(
        &'a self,
        name: &'a str,
        list: &mut Vec<String>,
        expanded: &mut HashSet<&'a str>,
    ) -> RegistryResult<()> {
        let entry = self.entry(name)?;
        if !expanded.insert(name) {
            return Ok(());
        }

        for prerequisite in &entry.definition.prerequisite_tasks {
            list.push(prerequisite.clone());
            self.collect_prerequisites(prerequisite, list, expanded)?;
        }

        Ok(())
    }

    /// `name` and its transitive prerequisites, dependencies first
    ///
    /// A post-order walk: every task comes after all of its own prerequisites
    /// and appears once. `name` is last. Freezes the registry.
    pub fn dependency_order(&self, name: &str) -> RegistryResult<Vec<&str>> {
        self.frozen.set(true);

        let root = self.entry(name)?.definition.name.as_str();
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        self.visit_dependencies(root, &mut order, &mut visited)?;
        Ok(order)
    }

    fn visit_dependencies<'a>(
        &'a self,
        name: &'a str,
        order: &mut Vec<&'a str>,
        visited: &mut HashSet<&'a str>,
    ) -> RegistryResult<()> {
        let entry = self.entry(name)?;
        if !visited.insert(name) {
            return Ok(());
        }

        for prerequisite in &entry.definition.prerequisite_tasks {
            self.visit_dependencies(prerequisite, order, visited)?;
        }
        order.push(entry.definition.name.as_str());

        Ok(())
    }

    /// Build the argument context for `name` over `tokens` (the task name and
    /// its flags)
    ///
    /// The context carries the command-match check, then the options and
    /// checks of the task, then those of each resolved prerequisite in order.
    /// Nothing is parsed yet.
    pub fn build_argument_context<I, T>(
        &self,
        name: &str,
        tokens: I,
    ) -> RegistryResult<ArgumentContext>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let resolved = self.resolve(name)?;

        let mut ctx = ArgumentContext::new(name, &resolved.definition.description, tokens);
        ctx.check(command_match_check(name));

        let contributors =
            std::iter::once(name).chain(resolved.prerequisites.iter().map(String::as_str));
        for task_name in contributors {
            let task = &self.entry(task_name)?.definition;
            for option in &task.options {
                ctx.option(option)?;
            }
            for check in &task.checks {
                ctx.check(check.clone());
            }
        }

        Ok(ctx)
    }

    /// Name of the task the invocation `argv` (program name first) asks for
    ///
    /// `None` when no task is named or the name is not registered.
    pub fn current_task_name<S: AsRef<str>>(&self, argv: &[S]) -> Option<String> {
        let token = argv.get(1)?.as_ref();
        if token.starts_with('-') || !self.contains(token) {
            return None;
        }
        Some(token.to_string())
    }

    /// Argument context for the task the invocation `argv` asks for
    pub fn current_task<S: AsRef<str>>(
        &self,
        argv: &[S],
    ) -> RegistryResult<Option<ArgumentContext>> {
        match self.current_task_name(argv) {
            Some(name) => {
                let tokens = argv[1..].iter().map(|s| s.as_ref().to_string());
                self.build_argument_context(&name, tokens).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Registered task names in registration order
    pub fn names(&self, include_hidden: bool) -> Vec<&str> {
        self.definitions(include_hidden)
            .map(|task| task.name.as_str())
            .collect()
    }

    /// Registered definitions in registration order (does not freeze the registry)
    pub fn definitions(&self, include_hidden: bool) -> impl Iterator<Item = &TaskDefinition> {
        self.tasks
            .iter()
            .map(|entry| &entry.definition)
            .filter(move |task| include_hidden || !task.hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArgumentError, CheckError, DefinitionError};
    use crate::task::{Check, OptionConfig, TaskOption};

    fn blank(prerequisites: &[&str]) -> TaskDefinition {
        TaskDefinition {
            prerequisite_tasks: prerequisites.iter().map(|s| s.to_string()).collect(),
            ..TaskDefinition::new("A blank task")
        }
    }

    fn family() -> Registry {
        let mut registry = Registry::new();
        registry.register("child", blank(&[])).unwrap();
        registry.register("sister", blank(&[])).unwrap();
        registry.register("father", blank(&["child", "sister"])).unwrap();
        registry.register("mother", blank(&["child", "sister"])).unwrap();
        registry
            .register("grandfather", blank(&["father", "mother"]))
            .unwrap();
        registry
    }

    #[test]
    fn test_register_simple() {
        let mut registry = Registry::new();
        let task = registry.register("blank", blank(&[])).unwrap();
        assert_eq!(task.name, "blank");
        assert!(!registry.is_frozen());
    }

    #[test]
    fn test_register_definition_uses_own_name() {
        let mut registry = Registry::new();
        let definition = TaskDefinition {
            name: "blank".to_string(),
            ..blank(&[])
        };
        registry.register_definition(definition).unwrap();
        assert!(registry.contains("blank"));
    }

    #[test]
    fn test_register_invalid_is_not_stored() {
        let mut registry = Registry::new();
        let result = registry.register("blank", TaskDefinition::default());
        assert_eq!(
            result.unwrap_err(),
            RegistryError::Invalid {
                name: "blank".to_string(),
                source: DefinitionError::MissingDescription,
            }
        );
        assert!(!registry.contains("blank"));
    }

    #[test]
    fn test_duplicate_name() {
        let mut registry = Registry::new();
        registry
            .register("blank", TaskDefinition::new("first"))
            .unwrap();
        assert_eq!(
            registry.register("blank", TaskDefinition::new("second")).unwrap_err(),
            RegistryError::DuplicateTask("blank".to_string())
        );
        assert_eq!(registry.definition("blank").unwrap().description, "first");
    }

    #[test]
    fn test_frozen_after_resolve() {
        let mut registry = Registry::new();
        registry.register("blank", blank(&[])).unwrap();
        registry.resolve("blank").unwrap();
        assert_eq!(
            registry.register("another", blank(&[])).unwrap_err(),
            RegistryError::AlreadyFrozen
        );
    }

    #[test]
    fn test_frozen_even_when_lookup_fails() {
        let mut registry = Registry::new();
        assert_eq!(
            registry.resolve("missing").unwrap_err(),
            RegistryError::UnknownTask("missing".to_string())
        );
        assert!(registry.is_frozen());
        assert_eq!(
            registry.register("blank", blank(&[])).unwrap_err(),
            RegistryError::AlreadyFrozen
        );
    }

    #[test]
    fn test_resolve_single() {
        let mut registry = Registry::new();
        registry.register("child", blank(&[])).unwrap();
        registry.register("father", blank(&["child"])).unwrap();
        assert_eq!(registry.resolve("father").unwrap().prerequisites, ["child"]);
    }

    #[test]
    fn test_resolve_multiple_levels() {
        let mut registry = Registry::new();
        registry.register("child", blank(&[])).unwrap();
        registry.register("father", blank(&["child"])).unwrap();
        registry.register("grandfather", blank(&["father"])).unwrap();
        assert_eq!(
            registry.resolve("grandfather").unwrap().prerequisites,
            ["father", "child"]
        );
        assert_eq!(registry.resolve("father").unwrap().prerequisites, ["child"]);
    }

    #[test]
    fn test_resolve_diamond() {
        let registry = family();
        assert_eq!(
            registry.resolve("grandfather").unwrap().prerequisites,
            ["father", "child", "sister", "mother"]
        );
        assert_eq!(
            registry.resolve("father").unwrap().prerequisites,
            ["child", "sister"]
        );
        assert!(registry.resolve("child").unwrap().prerequisites.is_empty());
    }

    #[test]
    fn test_resolution_is_cached() {
        let registry = family();
        let first = registry.resolve("grandfather").unwrap().prerequisites.as_ptr();
        let second = registry.resolve("grandfather").unwrap().prerequisites.as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dependency_order_linear() {
        let mut registry = Registry::new();
        registry.register("child", blank(&[])).unwrap();
        registry.register("father", blank(&["child"])).unwrap();
        registry.register("grandfather", blank(&["father"])).unwrap();
        assert_eq!(
            registry.dependency_order("grandfather").unwrap(),
            ["child", "father", "grandfather"]
        );
        assert!(registry.is_frozen());
    }

    #[test]
    fn test_dependency_order_diamond() {
        let registry = family();
        assert_eq!(
            registry.dependency_order("grandfather").unwrap(),
            ["child", "sister", "father", "mother", "grandfather"]
        );
        assert_eq!(registry.dependency_order("child").unwrap(), ["child"]);
    }

    #[test]
    fn test_dependency_order_cycle() {
        let mut registry = Registry::new();
        registry.register("a", blank(&["b"])).unwrap();
        registry.register("b", blank(&["a"])).unwrap();
        assert_eq!(registry.dependency_order("a").unwrap(), ["b", "a"]);
    }

    #[test]
    fn test_missing_prerequisite() {
        let mut registry = Registry::new();
        registry.register("father", blank(&["child"])).unwrap();
        registry.register("grandfather", blank(&["father"])).unwrap();
        assert_eq!(
            registry.resolve("grandfather").unwrap_err(),
            RegistryError::UnknownTask("child".to_string())
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let mut registry = Registry::new();
        registry.register("a", blank(&["b"])).unwrap();
        registry.register("b", blank(&["a"])).unwrap();
        assert_eq!(registry.resolve("a").unwrap().prerequisites, ["b"]);
    }

    #[test]
    fn test_names_filter_hidden() {
        let mut registry = Registry::new();
        registry.register("one", blank(&[])).unwrap();
        registry
            .register(
                "two",
                TaskDefinition {
                    hidden: true,
                    ..blank(&[])
                },
            )
            .unwrap();
        registry.register("three", blank(&[])).unwrap();
        assert_eq!(registry.names(false), ["one", "three"]);
        assert_eq!(registry.names(true), ["one", "two", "three"]);
        assert!(!registry.is_frozen());
    }

    #[test]
    fn test_current_task_name() {
        let mut registry = Registry::new();
        registry.register("blank", blank(&[])).unwrap();
        assert_eq!(
            registry.current_task_name(&["prog", "blank"]),
            Some("blank".to_string())
        );
        assert_eq!(
            registry.current_task_name(&["prog", "blank", "--foo", "bar"]),
            Some("blank".to_string())
        );
        assert_eq!(registry.current_task_name(&["prog", "wrongTask"]), None);
        assert_eq!(registry.current_task_name(&["prog", "--foo"]), None);
        assert_eq!(registry.current_task_name(&["prog"]), None);
    }

    #[test]
    fn test_current_task() {
        let mut registry = Registry::new();
        registry
            .register(
                "blank",
                TaskDefinition {
                    options: vec![TaskOption::new(
                        "foo",
                        OptionConfig::string().default_value("meh"),
                    )],
                    ..blank(&[])
                },
            )
            .unwrap();

        let ctx = registry.current_task(&["prog", "blank"]).unwrap().unwrap();
        assert_eq!(ctx.parsed().unwrap().get_str("foo"), Some("meh"));

        let ctx = registry
            .current_task(&["prog", "blank", "--foo", "bar"])
            .unwrap()
            .unwrap();
        assert_eq!(ctx.parsed().unwrap().get_str("foo"), Some("bar"));

        assert!(registry
            .current_task(&["prog", "wrongTask", "--foo", "bar"])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_build_aggregates_in_resolved_order() {
        let mut registry = Registry::new();
        let option = |key: &str| TaskOption::new(key, OptionConfig::string());
        let check = |name: &str| Check::new(name, |_| Ok(()));
        for (name, prerequisites) in [
            ("child", vec![]),
            ("sister", vec![]),
            ("father", vec!["child", "sister"]),
            ("mother", vec!["child", "sister"]),
            ("grandfather", vec!["father", "mother"]),
        ] {
            registry
                .register(
                    name,
                    TaskDefinition {
                        options: vec![option(&format!("{}-opt", name))],
                        checks: vec![check(&format!("{}-check", name))],
                        ..blank(&prerequisites)
                    },
                )
                .unwrap();
        }

        let ctx = registry
            .build_argument_context("grandfather", ["grandfather"])
            .unwrap();
        let keys: Vec<_> = ctx.options().iter().map(|o| o.key.as_str()).collect();
        assert_eq!(
            keys,
            ["grandfather-opt", "father-opt", "child-opt", "sister-opt", "mother-opt"]
        );
        let checks: Vec<_> = ctx.checks().iter().map(Check::name).collect();
        assert_eq!(
            checks,
            [
                "command matches task",
                "grandfather-check",
                "father-check",
                "child-check",
                "sister-check",
                "mother-check"
            ]
        );
    }

    #[test]
    fn test_inherits_prerequisite_option() {
        let mut registry = Registry::new();
        registry
            .register(
                "child",
                TaskDefinition {
                    options: vec![TaskOption::new(
                        "foo",
                        OptionConfig::string().alias("f").default_value("meh"),
                    )],
                    ..blank(&[])
                },
            )
            .unwrap();
        registry.register("father", blank(&["child"])).unwrap();

        let ctx = registry.build_argument_context("father", ["father"]).unwrap();
        assert_eq!(ctx.parsed().unwrap().get_str("foo"), Some("meh"));

        let ctx = registry
            .build_argument_context("father", ["father", "-f", "bar"])
            .unwrap();
        assert_eq!(ctx.parsed().unwrap().get_str("foo"), Some("bar"));
    }

    #[test]
    fn test_build_does_not_parse() {
        let mut registry = Registry::new();
        registry.register("blank", blank(&[])).unwrap();
        let ctx = registry
            .build_argument_context("blank", Vec::<String>::new())
            .unwrap();
        match ctx.parsed() {
            Err(ArgumentError::Check { source, .. }) => {
                assert_eq!(source, CheckError::NoTaskDefined)
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
