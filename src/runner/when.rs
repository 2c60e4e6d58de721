//! Declarative check evaluation
//!
//! Manifest checks are conditions over the parsed options, the environment
//! and the file system. Each becomes a named [`Check`] on its task.

use crate::args::{OptionValue, ParsedArgs};
use crate::config::ManifestCheck;
use crate::error::{CheckError, ExecutionError, ExecutionResult};
use crate::runner::{check_command, interpolate, Context};
use crate::task::Check;
use std::env;
use std::sync::Arc;

/// A single manifest condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhenCondition {
    Equal { left: String, right: String },
    NotEqual { left: String, right: String },
    Command(String),
    Exists(String),
    EnvSet(String),
    EnvNotSet(String),
    OptionSet(String),
    OptionNotSet(String),
}

impl WhenCondition {
    /// Extract the condition of a manifest check
    pub fn from_config(check: &ManifestCheck) -> Result<Self, String> {
        check.validate()?;

        let condition = if let Some(cmp) = &check.equal {
            WhenCondition::Equal {
                left: cmp.left.clone(),
                right: cmp.right.clone(),
            }
        } else if let Some(cmp) = &check.not_equal {
            WhenCondition::NotEqual {
                left: cmp.left.clone(),
                right: cmp.right.clone(),
            }
        } else if let Some(cmd) = &check.command {
            WhenCondition::Command(cmd.clone())
        } else if let Some(path) = &check.exists {
            WhenCondition::Exists(path.clone())
        } else if let Some(var) = &check.env_set {
            WhenCondition::EnvSet(var.clone())
        } else if let Some(var) = &check.env_not_set {
            WhenCondition::EnvNotSet(var.clone())
        } else if let Some(option) = &check.option_set {
            WhenCondition::OptionSet(option.clone())
        } else if let Some(option) = &check.option_not_set {
            WhenCondition::OptionNotSet(option.clone())
        } else {
            return Err("check must specify a condition".to_string());
        };

        Ok(condition)
    }

    /// Short human-readable form, used as the check name
    pub fn describe(&self) -> String {
        match self {
            WhenCondition::Equal { left, right } => format!("{} == {}", left, right),
            WhenCondition::NotEqual { left, right } => format!("{} != {}", left, right),
            WhenCondition::Command(cmd) => format!("command `{}`", cmd),
            WhenCondition::Exists(path) => format!("exists {}", path),
            WhenCondition::EnvSet(var) => format!("env-set {}", var),
            WhenCondition::EnvNotSet(var) => format!("env-not-set {}", var),
            WhenCondition::OptionSet(option) => format!("option-set {}", option),
            WhenCondition::OptionNotSet(option) => format!("option-not-set {}", option),
        }
    }
}

/// An option counts as set when it has a value; flags only when true
fn option_is_set(args: &ParsedArgs, name: &str) -> bool {
    match args.get(name) {
        Some(OptionValue::Bool(value)) => *value,
        Some(_) => true,
        None => false,
    }
}

/// Evaluate a single condition
pub fn evaluate_when(
    condition: &WhenCondition,
    args: &ParsedArgs,
    ctx: &Context,
) -> ExecutionResult<bool> {
    let vars = args.vars();

    match condition {
        WhenCondition::Equal { left, right } => {
            Ok(interpolate(left, &vars)? == interpolate(right, &vars)?)
        }

        WhenCondition::NotEqual { left, right } => {
            Ok(interpolate(left, &vars)? != interpolate(right, &vars)?)
        }

        WhenCondition::Command(cmd) => check_command(cmd, ctx, &vars),

        WhenCondition::Exists(path) => {
            let path = interpolate(path, &vars)?;
            let full_path = ctx.resolve_path(&path);
            let pattern = full_path.to_string_lossy();
            let mut matches = glob::glob(&pattern).map_err(|e| ExecutionError::InvalidPattern {
                pattern: path.clone(),
                error: e.to_string(),
            })?;
            Ok(matches.any(|entry| entry.is_ok()))
        }

        WhenCondition::EnvSet(var_name) => Ok(env::var(interpolate(var_name, &vars)?).is_ok()),

        WhenCondition::EnvNotSet(var_name) => {
            Ok(env::var(interpolate(var_name, &vars)?).is_err())
        }

        WhenCondition::OptionSet(option) => Ok(option_is_set(args, option)),

        WhenCondition::OptionNotSet(option) => Ok(!option_is_set(args, option)),
    }
}

/// Turn a manifest check into a named [`Check`]
pub fn manifest_check(check: &ManifestCheck, ctx: Arc<Context>) -> Result<Check, String> {
    let condition = WhenCondition::from_config(check)?;
    let name = condition.describe();
    let message = check
        .message
        .clone()
        .unwrap_or_else(|| format!("condition '{}' not met", name));

    Ok(Check::new(name, move |args: &ParsedArgs| {
        match evaluate_when(&condition, args, &ctx) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CheckError::failed(message.clone())),
            Err(e) => Err(CheckError::failed(e.to_string())),
        }
    }))
}
