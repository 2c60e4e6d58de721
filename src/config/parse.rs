//! Manifest parsing, discovery and registration

use crate::config::types::{Manifest, ManifestTask};
use crate::error::{ConfigError, ConfigResult, RegistryError};
use crate::registry::Registry;
use crate::runner::{manifest_check, shell_hook, Context};
use crate::task::{validate_raw, Hook, TaskDefinition};
use crate::ui::Verbosity;
use serde_yaml::{Mapping, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default manifest file names to search for
pub const MANIFEST_FILE_NAMES: &[&str] = &["taskchain.yml", "taskchain.yaml"];

/// Find the manifest by searching current and parent directories
pub fn find_manifest_file() -> ConfigResult<PathBuf> {
    find_manifest_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the manifest starting from a specific directory
pub fn find_manifest_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in MANIFEST_FILE_NAMES {
            let manifest_path = current_dir.join(file_name);
            searched_paths.push(manifest_path.display().to_string());

            if manifest_path.is_file() {
                return Ok(manifest_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a manifest file from a path
pub fn parse_manifest_file(path: &Path) -> ConfigResult<Manifest> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_manifest(&contents)
}

/// Parse a manifest from a string
pub fn parse_manifest(yaml: &str) -> ConfigResult<Manifest> {
    let manifest: Manifest = serde_yaml::from_str(yaml)?;

    if matches!(&manifest.interpreter, Some(interpreter) if interpreter.is_empty()) {
        return Err(ConfigError::Invalid(
            "interpreter must name a program".to_string(),
        ));
    }

    Ok(manifest)
}

/// Shell context for the manifest's hooks, rooted at `base_dir`
pub fn manifest_context(manifest: &Manifest, base_dir: &Path, verbosity: Verbosity) -> Context {
    let mut ctx = Context::new()
        .with_working_dir(base_dir)
        .with_verbosity(verbosity);
    if let Some(interpreter) = &manifest.interpreter {
        ctx = ctx.with_interpreter(interpreter.clone());
    }
    ctx
}

/// Load the manifest's env-file, if any, into the process environment
///
/// Variables already set are kept.
pub fn load_env_file(manifest: &Manifest, base_dir: &Path) -> ConfigResult<()> {
    if let Some(env_file) = &manifest.env_file {
        let path = base_dir.join(env_file);
        dotenvy::from_path(&path).map_err(|e| ConfigError::EnvFile {
            path,
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Register every manifest task, in file order
pub fn register_manifest_tasks(
    registry: &mut Registry,
    manifest: &Manifest,
    ctx: Arc<Context>,
) -> ConfigResult<()> {
    for (name, raw) in &manifest.tasks {
        let name = match name {
            Value::String(name) => name.as_str(),
            other => {
                return Err(ConfigError::Invalid(format!(
                    "task names must be strings, found {:?}",
                    other
                )))
            }
        };

        let definition = task_definition(name, raw, &ctx)?;
        registry.register(name, definition)?;
    }
    Ok(())
}

/// Validate and convert one raw task entry
fn task_definition(name: &str, raw: &Value, ctx: &Arc<Context>) -> ConfigResult<TaskDefinition> {
    validate_raw(name, raw).map_err(|source| RegistryError::Invalid {
        name: name.to_string(),
        source,
    })?;

    let task: ManifestTask = serde_yaml::from_value(Value::Mapping(without_nulls(raw)))?;

    let checks = task
        .checks
        .iter()
        .map(|check| manifest_check(check, Arc::clone(ctx)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| ConfigError::Invalid(format!("task '{}': {}", name, reason)))?;

    let hook = |commands: Vec<String>| -> Option<Hook> {
        (!commands.is_empty()).then(|| shell_hook(commands, Arc::clone(ctx)))
    };

    Ok(TaskDefinition {
        name: name.to_string(),
        description: task.description,
        prerequisite_tasks: task.prerequisites,
        checks,
        options: task.options,
        hidden: task.hidden,
        on_init: hook(task.on_init),
        on_run: hook(task.on_run),
    })
}

/// Absent and null fields mean the same thing in a task entry
fn without_nulls(raw: &Value) -> Mapping {
    raw.as_mapping()
        .map(|task| {
            task.iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Build a registry from a manifest file
///
/// Loads the env-file and resolves relative paths against the manifest's
/// directory.
pub fn load_manifest(path: &Path, verbosity: Verbosity) -> ConfigResult<(Manifest, Registry)> {
    let manifest = parse_manifest_file(path)?;
    let base_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    load_env_file(&manifest, base_dir)?;

    let ctx = Arc::new(manifest_context(&manifest, base_dir, verbosity));
    let mut registry = Registry::new();
    register_manifest_tasks(&mut registry, &manifest, ctx)?;

    Ok((manifest, registry))
}
