//! Task definition types
//!
//! A [`TaskDefinition`] is what callers register: a description, the names of
//! prerequisite tasks, the checks and options it contributes to the command
//! line, and optional lifecycle hooks.

use crate::args::{ArgumentContext, ParsedArgs};
use crate::error::CheckResult;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;

type HookFn = dyn Fn(&ArgumentContext) -> anyhow::Result<()> + Send + Sync;

type CheckFn = dyn Fn(&ParsedArgs) -> CheckResult + Send + Sync;

/// Lifecycle callback (`on_init` / `on_run`), invoked with the task's argument context
#[derive(Clone)]
pub struct Hook(Arc<HookFn>);

impl Hook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ArgumentContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Hook(Arc::new(f))
    }

    pub fn call(&self, ctx: &ArgumentContext) -> anyhow::Result<()> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// A named predicate evaluated against the parsed arguments
#[derive(Clone)]
pub struct Check {
    name: String,
    predicate: Arc<CheckFn>,
}

impl Check {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&ParsedArgs) -> CheckResult + Send + Sync + 'static,
    {
        Check {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, args: &ParsedArgs) -> CheckResult {
        (self.predicate)(args)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check").field("name", &self.name).finish()
    }
}

/// Value type an option is parsed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    #[serde(alias = "boolean")]
    Bool,
    #[serde(alias = "integer")]
    Int,
    Float,
}

impl ValueType {
    /// Whether `raw` is acceptable as a value of this type
    pub fn accepts(&self, raw: &str) -> bool {
        match self {
            ValueType::String => true,
            ValueType::Bool => matches!(raw, "true" | "false"),
            ValueType::Int => raw.parse::<i64>().is_ok(),
            ValueType::Float => raw.parse::<f64>().is_ok(),
        }
    }
}

/// Parser configuration of an option
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct OptionConfig {
    /// Help text
    #[serde(alias = "describe", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Alternative flag names; single characters become short flags
    #[serde(
        alias = "alias",
        deserialize_with = "deserialize_one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub aliases: Vec<String>,

    /// Default value, applied when the flag is absent
    #[serde(
        deserialize_with = "deserialize_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,

    /// Value type
    #[serde(rename = "type")]
    pub value_type: ValueType,

    /// Fail parsing when no value (and no default) is present
    pub required: bool,
}

impl OptionConfig {
    /// String-valued option
    pub fn string() -> Self {
        OptionConfig::default()
    }

    /// Boolean flag
    pub fn flag() -> Self {
        OptionConfig {
            value_type: ValueType::Bool,
            ..OptionConfig::default()
        }
    }

    /// Integer-valued option
    pub fn int() -> Self {
        OptionConfig {
            value_type: ValueType::Int,
            ..OptionConfig::default()
        }
    }

    /// Float-valued option
    pub fn float() -> Self {
        OptionConfig {
            value_type: ValueType::Float,
            ..OptionConfig::default()
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A command-line option contributed by a task
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaskOption {
    pub key: String,
    pub value: OptionConfig,
}

impl TaskOption {
    pub fn new(key: impl Into<String>, value: OptionConfig) -> Self {
        TaskOption {
            key: key.into(),
            value,
        }
    }
}

/// A task definition
#[derive(Debug, Clone, Default)]
pub struct TaskDefinition {
    /// Task name, the registry key
    pub name: String,

    /// Help text
    pub description: String,

    /// Direct prerequisites, in declared order
    pub prerequisite_tasks: Vec<String>,

    /// Checks contributed to the command line
    pub checks: Vec<Check>,

    /// Options contributed to the command line
    pub options: Vec<TaskOption>,

    /// Whether this task is hidden from default listings
    pub hidden: bool,

    /// Called for every task in the resolved chain before the run hook
    pub on_init: Option<Hook>,

    /// Called for the invoked task only
    pub on_run: Option<Hook>,
}

impl TaskDefinition {
    pub fn new(description: impl Into<String>) -> Self {
        TaskDefinition {
            description: description.into(),
            ..TaskDefinition::default()
        }
    }
}

/// Accept either a single string or a list of strings
fn deserialize_one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// Accept any YAML scalar as a string
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(D::Error::custom("default must be a scalar value")),
    }
}
