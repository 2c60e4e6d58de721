//! Manifest types
//!
//! These structures represent a taskchain.yml file. Task entries are kept as
//! raw YAML until they pass validation, so each malformed field gets a
//! precise error instead of a generic deserialization failure.

use crate::task::TaskOption;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Mapping;
use std::path::PathBuf;

/// Top-level manifest structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Application name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Application usage description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Interpreter for shell hooks (e.g., ["bash", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Dotenv file loaded before any task runs, relative to the manifest
    #[serde(rename = "env-file", default, skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,

    /// Task name -> raw task definition, in file order
    #[serde(default)]
    pub tasks: Mapping,
}

/// A task entry, once validated
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ManifestTask {
    pub description: String,

    pub prerequisites: Vec<String>,

    pub hidden: bool,

    pub options: Vec<TaskOption>,

    pub checks: Vec<ManifestCheck>,

    #[serde(deserialize_with = "one_or_many")]
    pub on_init: Vec<String>,

    #[serde(deserialize_with = "one_or_many")]
    pub on_run: Vec<String>,
}

/// A declarative check; exactly one condition must be given
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ManifestCheck {
    /// Check if values are equal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<Comparison>,

    /// Check if values are not equal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_equal: Option<Comparison>,

    /// Check if a command succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Check if a path (or glob pattern) exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<String>,

    /// Check if environment variable is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_set: Option<String>,

    /// Check if environment variable is not set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_not_set: Option<String>,

    /// Check if option is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_set: Option<String>,

    /// Check if option is not set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_not_set: Option<String>,

    /// Failure message replacing the generated one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ManifestCheck {
    /// Ensure exactly one condition is present
    pub fn validate(&self) -> Result<(), String> {
        let conditions = [
            self.equal.is_some(),
            self.not_equal.is_some(),
            self.command.is_some(),
            self.exists.is_some(),
            self.env_set.is_some(),
            self.env_not_set.is_some(),
            self.option_set.is_some(),
            self.option_not_set.is_some(),
        ];
        match conditions.iter().filter(|&&set| set).count() {
            0 => Err("check must specify a condition".to_string()),
            1 => Ok(()),
            _ => Err("check must specify only one condition".to_string()),
        }
    }
}

/// A comparison for equal/not-equal checks
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Comparison {
    /// Left-hand side of comparison
    pub left: String,

    /// Right-hand side of comparison
    pub right: String,
}

/// Accept a single command or a list of commands
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(cmd)) => vec![cmd],
        Some(OneOrMany::Many(cmds)) => cmds,
    })
}
