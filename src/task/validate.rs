//! Task definition validation
//!
//! Two entry points share one error taxonomy: [`validate_definition`] for
//! definitions built through the Rust API, and [`validate_raw`] for
//! dynamically shaped input such as a YAML manifest. Both stop at the first
//! problem found and have no side effects.

use crate::args::{HELP_ID, POSITIONALS_ID};
use crate::config::ManifestCheck;
use crate::error::{DefinitionError, DefinitionResult};
use crate::task::{OptionConfig, TaskDefinition, TaskOption, ValueType};
use serde_yaml::{Mapping, Value};

/// Flag names the argument context claims for itself
const RESERVED_FLAGS: &[&str] = &[POSITIONALS_ID, HELP_ID, "h"];

/// Validate a typed task definition
pub fn validate_definition(name: &str, task: &TaskDefinition) -> DefinitionResult<()> {
    if name.is_empty() {
        return Err(DefinitionError::InvalidName);
    }
    if task.description.is_empty() {
        return Err(DefinitionError::MissingDescription);
    }

    for (index, prerequisite) in task.prerequisite_tasks.iter().enumerate() {
        if prerequisite.is_empty() {
            return Err(DefinitionError::InvalidPrerequisiteEntry(index));
        }
    }

    for (index, check) in task.checks.iter().enumerate() {
        if check.name().is_empty() {
            return Err(DefinitionError::InvalidCheckEntry {
                index,
                reason: "check has no name".to_string(),
            });
        }
    }

    for (index, option) in task.options.iter().enumerate() {
        validate_option(option)
            .map_err(|reason| DefinitionError::InvalidOptionEntry { index, reason })?;
    }

    Ok(())
}

/// Validate an option against what the argument parser can accept
fn validate_option(option: &TaskOption) -> Result<(), String> {
    validate_flag_name(&option.key).map_err(|e| format!("key {}", e))?;

    for alias in &option.value.aliases {
        validate_flag_name(alias).map_err(|e| format!("alias {}", e))?;
    }

    if let Some(default) = &option.value.default {
        if !option.value.value_type.accepts(default) {
            return Err(format!(
                "default '{}' is not a valid {:?} value",
                default, option.value.value_type
            ));
        }
        // A bool option is a switch: off unless given
        if option.value.value_type == ValueType::Bool && default != "false" {
            return Err(format!("bool default '{}' could never be turned off", default));
        }
    }

    Ok(())
}

fn validate_flag_name(flag: &str) -> Result<(), String> {
    if flag.is_empty() {
        return Err("must not be empty".to_string());
    }
    if flag.starts_with('-') {
        return Err(format!("'{}' must not start with '-'", flag));
    }
    if flag.chars().any(char::is_whitespace) {
        return Err(format!("'{}' must not contain whitespace", flag));
    }
    if flag.contains('=') {
        return Err(format!("'{}' must not contain '='", flag));
    }
    if RESERVED_FLAGS.contains(&flag) {
        return Err(format!("'{}' is reserved", flag));
    }
    Ok(())
}

/// Validate a dynamically shaped task definition
///
/// List-valued fields may be absent (meaning empty); when present they must
/// have the right shape. Hooks are shell commands: a string or a list of
/// strings.
pub fn validate_raw(name: &str, task: &Value) -> DefinitionResult<()> {
    if name.is_empty() {
        return Err(DefinitionError::InvalidName);
    }

    let task = task.as_mapping().ok_or(DefinitionError::InvalidDefinition)?;

    match field(task, "description") {
        Some(Value::String(s)) if !s.is_empty() => {}
        _ => return Err(DefinitionError::MissingDescription),
    }

    let prerequisites =
        list_field(task, "prerequisites", DefinitionError::InvalidPrerequisiteList)?;
    if let Some(list) = prerequisites {
        for (index, entry) in list.iter().enumerate() {
            match entry {
                Value::String(s) if !s.is_empty() => {}
                _ => return Err(DefinitionError::InvalidPrerequisiteEntry(index)),
            }
        }
    }

    if let Some(list) = list_field(task, "checks", DefinitionError::InvalidCheckList)? {
        for (index, entry) in list.iter().enumerate() {
            serde_yaml::from_value::<ManifestCheck>(entry.clone())
                .map_err(|e| e.to_string())
                .and_then(|check| check.validate())
                .map_err(|reason| DefinitionError::InvalidCheckEntry { index, reason })?;
        }
    }

    if let Some(list) = list_field(task, "options", DefinitionError::InvalidOptionList)? {
        for (index, entry) in list.iter().enumerate() {
            raw_option(entry)
                .and_then(|option| validate_option(&option))
                .map_err(|reason| DefinitionError::InvalidOptionEntry { index, reason })?;
        }
    }

    match field(task, "hidden") {
        None | Some(Value::Bool(_)) => {}
        Some(_) => return Err(DefinitionError::InvalidHiddenType),
    }

    if !is_command_list(field(task, "on-init")) {
        return Err(DefinitionError::InvalidOnInitType);
    }
    if !is_command_list(field(task, "on-run")) {
        return Err(DefinitionError::InvalidOnRunType);
    }

    Ok(())
}

fn field<'a>(task: &'a Mapping, key: &str) -> Option<&'a Value> {
    match task.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn list_field<'a>(
    task: &'a Mapping,
    key: &str,
    error: DefinitionError,
) -> DefinitionResult<Option<&'a Vec<Value>>> {
    match field(task, key) {
        None => Ok(None),
        Some(Value::Sequence(list)) => Ok(Some(list)),
        Some(_) => Err(error),
    }
}

fn raw_option(entry: &Value) -> Result<TaskOption, String> {
    let entry = entry.as_mapping().ok_or("option must be a mapping")?;
    let key = match entry.get("key") {
        Some(Value::String(key)) => key.clone(),
        _ => return Err("option must have a string 'key'".to_string()),
    };
    let value = match entry.get("value") {
        Some(value @ Value::Mapping(_)) => {
            serde_yaml::from_value::<OptionConfig>(value.clone()).map_err(|e| e.to_string())?
        }
        _ => return Err("option must have a mapping 'value'".to_string()),
    };
    if entry.len() != 2 {
        return Err("option only takes 'key' and 'value'".to_string());
    }
    Ok(TaskOption::new(key, value))
}

fn is_command_list(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::String(_)) => true,
        Some(Value::Sequence(list)) => list.iter().all(Value::is_string),
        Some(_) => false,
    }
}
