//! Error types for taskchain

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for taskchain operations
pub type Result<T> = std::result::Result<T, TaskchainError>;

/// Main error type for taskchain
#[derive(Error, Debug)]
pub enum TaskchainError {
    /// Task definition shape errors
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Registration and lookup errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Argument parsing and check errors
    #[error("Argument error: {0}")]
    Arguments(#[from] ArgumentError),

    /// Init/run lifecycle errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Manifest errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while validating a task definition, before anything is stored
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Must specify a task name")]
    InvalidName,

    #[error("Must specify task object")]
    InvalidDefinition,

    #[error("Task must specify a description")]
    MissingDescription,

    #[error("Task must specify prerequisite tasks list")]
    InvalidPrerequisiteList,

    #[error("Prerequisite task #{0} is not a task name")]
    InvalidPrerequisiteEntry(usize),

    #[error("Task must specify checks list")]
    InvalidCheckList,

    #[error("Check #{index} is badly formed: {reason}")]
    InvalidCheckEntry { index: usize, reason: String },

    #[error("Task must specify options list")]
    InvalidOptionList,

    #[error("Option #{index} is badly formed: {reason}")]
    InvalidOptionEntry { index: usize, reason: String },

    #[error("Task hidden flag must be a boolean")]
    InvalidHiddenType,

    #[error("Task onInit must be a command or list of commands")]
    InvalidOnInitType,

    #[error("Task onRun must be a command or list of commands")]
    InvalidOnRunType,
}

/// Registry discipline and resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Not allowed to register new tasks after first task retrieval")]
    AlreadyFrozen,

    #[error("A task has already been registered with the name {0}")]
    DuplicateTask(String),

    #[error("No task registered with name {0}")]
    UnknownTask(String),

    #[error("Invalid task '{name}': {source}")]
    Invalid {
        name: String,
        #[source]
        source: DefinitionError,
    },

    #[error(
        "Flag '{alias}' of option '{option}' is already used by another option of task '{task}'"
    )]
    ConflictingAlias {
        task: String,
        option: String,
        alias: String,
    },
}

/// Failure reported by a check against the parsed arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("No task defined")]
    NoTaskDefined,

    #[error("More than one task defined")]
    MultipleTasksDefined,

    #[error("Wrong task invoked: {got} instead of {expected}")]
    WrongTaskInvoked { got: String, expected: String },

    #[error("{0}")]
    Failed(String),
}

impl CheckError {
    /// Free-form check failure
    pub fn failed(message: impl Into<String>) -> Self {
        CheckError::Failed(message.into())
    }
}

/// Errors surfaced when an argument context is parsed
#[derive(Error, Debug)]
pub enum ArgumentError {
    #[error("{0}")]
    Parse(#[from] clap::Error),

    #[error("Option '{0}' is required but not provided")]
    MissingOption(String),

    #[error("Check '{check}' failed: {source}")]
    Check {
        check: String,
        #[source]
        source: CheckError,
    },
}

/// Stage of the lifecycle a hook belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    Init,
    Run,
}

impl std::fmt::Display for HookStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookStage::Init => write!(f, "onInit"),
            HookStage::Run => write!(f, "onRun"),
        }
    }
}

/// Init/run lifecycle errors
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error(
        "Task definition for \"{0}\" does not define an onRun function, and no default was provided"
    )]
    NoRunnable(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Arguments(#[from] ArgumentError),

    #[error("{stage} hook of task '{task}' failed: {source:#}")]
    Hook {
        task: String,
        stage: HookStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to show help: {0}")]
    Help(#[from] io::Error),
}

/// Shell command errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command `{command}` failed with exit code {code:?}")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("No interpreter configured")]
    NoInterpreter,

    #[error("Invalid path pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// Variable interpolation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("Recursive interpolation detected in '{0}'")]
    RecursiveInterpolation(String),
}

/// Manifest discovery and parsing errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find manifest file (searched: {0})")]
    NotFound(String),

    #[error("Invalid manifest: {0}")]
    Invalid(String),

    #[error("Failed to read manifest '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to load env file '{path}': {error}")]
    EnvFile { path: PathBuf, error: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Specialized result type for definition validation
pub type DefinitionResult<T> = std::result::Result<T, DefinitionError>;

/// Specialized result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Specialized result type for argument parsing
pub type ArgumentResult<T> = std::result::Result<T, ArgumentError>;

/// Specialized result type for checks
pub type CheckResult = std::result::Result<(), CheckError>;

/// Specialized result type for lifecycle operations
pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

/// Specialized result type for shell commands
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

/// Specialized result type for manifest operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
