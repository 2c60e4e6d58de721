//! Argument context: a task's command line backed by clap
//!
//! The context collects the options and checks aggregated for a task, and
//! parses its tokens lazily. Parsing never exits the process; every failure
//! comes back as an [`ArgumentError`].

use crate::args::{OptionValue, ParsedArgs};
use crate::error::{ArgumentError, ArgumentResult, CheckError, RegistryError, RegistryResult};
use crate::task::{Check, TaskOption, ValueType};
use clap::{value_parser, Arg, ArgAction, Command};
use std::cell::OnceCell;
use std::collections::HashMap;
use std::io;

/// Id of the positional list
pub const POSITIONALS_ID: &str = "_";

/// Id of the help flag
pub const HELP_ID: &str = "help";

/// A task's command line: options, checks and the tokens to parse
#[derive(Debug)]
pub struct ArgumentContext {
    task: String,
    about: String,
    tokens: Vec<String>,
    options: Vec<TaskOption>,
    checks: Vec<Check>,
    /// Flag name (key or alias) -> option key
    flags: HashMap<String, String>,
    parsed: OnceCell<ParsedArgs>,
}

impl ArgumentContext {
    /// Create a context for `task` over `tokens` (the task name and its flags,
    /// without the program name)
    pub fn new<I, T>(task: impl Into<String>, about: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        ArgumentContext {
            task: task.into(),
            about: about.into(),
            tokens: tokens.into_iter().map(Into::into).collect(),
            options: Vec::new(),
            checks: Vec::new(),
            flags: HashMap::new(),
            parsed: OnceCell::new(),
        }
    }

    pub fn task_name(&self) -> &str {
        &self.task
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn options(&self) -> &[TaskOption] {
        &self.options
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Add an option
    ///
    /// A later option with the same key replaces the earlier one in place,
    /// aliases included. Returns `false` when that happened.
    pub fn option(&mut self, option: &TaskOption) -> RegistryResult<bool> {
        let names = std::iter::once(&option.key).chain(option.value.aliases.iter());
        for name in names.clone() {
            match self.flags.get(name) {
                Some(owner) if *owner != option.key => {
                    return Err(RegistryError::ConflictingAlias {
                        task: self.task.clone(),
                        option: option.key.clone(),
                        alias: name.clone(),
                    })
                }
                _ => {}
            }
        }

        self.flags.retain(|_, owner| *owner != option.key);
        for name in names {
            self.flags.insert(name.clone(), option.key.clone());
        }

        match self.options.iter_mut().find(|o| o.key == option.key) {
            Some(existing) => {
                *existing = option.clone();
                Ok(false)
            }
            None => {
                self.options.push(option.clone());
                Ok(true)
            }
        }
    }

    /// Add a check, evaluated after parsing in insertion order
    pub fn check(&mut self, check: Check) {
        self.checks.push(check);
    }

    /// Parse the tokens, once
    ///
    /// A failed parse is not memoized; calling again reports the same error.
    pub fn parsed(&self) -> ArgumentResult<&ParsedArgs> {
        if let Some(parsed) = self.parsed.get() {
            return Ok(parsed);
        }
        let parsed = self.parse()?;
        Ok(self.parsed.get_or_init(|| parsed))
    }

    fn parse(&self) -> ArgumentResult<ParsedArgs> {
        let matches = self.command().try_get_matches_from(&self.tokens)?;

        let help = matches.get_flag(HELP_ID);
        let positionals: Vec<String> = matches
            .get_many::<String>(POSITIONALS_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let mut parsed = ParsedArgs::new(positionals).with_help(help);
        for option in &self.options {
            let key = option.key.as_str();
            let value = match option.value.value_type {
                ValueType::Bool => Some(OptionValue::Bool(matches.get_flag(key))),
                ValueType::String => {
                    matches.get_one::<String>(key).cloned().map(OptionValue::String)
                }
                ValueType::Int => matches.get_one::<i64>(key).copied().map(OptionValue::Int),
                ValueType::Float => matches.get_one::<f64>(key).copied().map(OptionValue::Float),
            };
            match value {
                Some(value) => parsed = parsed.with_value(key, value),
                None if option.value.required && !help => {
                    return Err(ArgumentError::MissingOption(key.to_string()))
                }
                None => {}
            }
        }
        for (flag, key) in &self.flags {
            if flag != key {
                parsed = parsed.with_alias(flag, key);
            }
        }

        // Help short-circuits validation
        if !help {
            for check in &self.checks {
                check
                    .evaluate(&parsed)
                    .map_err(|source| ArgumentError::Check {
                        check: check.name().to_string(),
                        source,
                    })?;
            }
        }

        Ok(parsed)
    }

    /// Build the clap command for the current options
    fn command(&self) -> Command {
        Command::new(self.task.clone())
            .about(self.about.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(
                Arg::new(POSITIONALS_ID)
                    .value_name("TASK")
                    .num_args(1..)
                    .action(ArgAction::Append),
            )
            .arg(
                Arg::new(HELP_ID)
                    .short('h')
                    .long(HELP_ID)
                    .help("Print help")
                    .action(ArgAction::SetTrue),
            )
            .args(self.option_args())
    }

    /// The options as clap arguments, for embedding in another command
    pub fn option_args(&self) -> impl Iterator<Item = Arg> + '_ {
        self.options.iter().map(build_arg)
    }

    /// Rendered help text
    pub fn help_text(&self) -> String {
        self.command().render_help().to_string()
    }

    /// Print help to stdout
    pub fn show_help(&self) -> io::Result<()> {
        self.command().print_help()
    }
}

/// Translate an option into a clap argument
fn build_arg(option: &TaskOption) -> Arg {
    let config = &option.value;
    let mut arg = Arg::new(option.key.clone()).long(option.key.clone());

    if let Some(description) = &config.description {
        arg = arg.help(description.clone());
    }

    let mut has_short = false;
    for alias in &config.aliases {
        let mut chars = alias.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !has_short => {
                arg = arg.short(c);
                has_short = true;
            }
            (Some(c), None) => arg = arg.visible_short_alias(c),
            _ => arg = arg.visible_alias(alias.clone()),
        }
    }

    arg = match config.value_type {
        ValueType::Bool => arg.action(ArgAction::SetTrue),
        ValueType::String => arg.action(ArgAction::Set),
        ValueType::Int => arg.action(ArgAction::Set).value_parser(value_parser!(i64)),
        ValueType::Float => arg.action(ArgAction::Set).value_parser(value_parser!(f64)),
    };

    if config.value_type != ValueType::Bool {
        arg = arg.value_name(option.key.to_uppercase());
    }

    if let Some(default) = &config.default {
        if config.value_type != ValueType::Bool {
            arg = arg.default_value(default.clone());
        }
    }

    arg
}

/// Built-in check: exactly one positional, naming the task
pub fn command_match_check(task: &str) -> Check {
    let expected = task.to_string();
    Check::new("command matches task", move |args: &ParsedArgs| {
        match args.positionals() {
            [] => Err(CheckError::NoTaskDefined),
            [only] if *only == expected => Ok(()),
            [only] => Err(CheckError::WrongTaskInvoked {
                got: only.clone(),
                expected: expected.clone(),
            }),
            _ => Err(CheckError::MultipleTasksDefined),
        }
    })
}
