//! Main CLI application

use crate::config::{find_manifest_file, load_manifest, Manifest};
use crate::error::{ArgumentError, RegistryError, Result};
use crate::runner::{RunOutcome, TaskRunner};
use crate::ui::Verbosity;
use crate::VERSION;
use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

/// Binary name, used as the program name of task invocations
const BIN_NAME: &str = "taskchain";

/// CLI application
pub struct App {
    manifest: Manifest,
    runner: TaskRunner,
}

impl App {
    /// Load the manifest at `path`
    pub fn load(path: PathBuf, verbosity: Verbosity) -> Result<Self> {
        let (manifest, registry) = load_manifest(&path, verbosity)?;
        Ok(App {
            manifest,
            runner: TaskRunner::new(registry).with_verbosity(verbosity),
        })
    }

    /// Command describing every visible task, for help and completions
    pub fn overview(&self) -> Result<Command> {
        let registry = self.runner.registry();
        let name = self
            .manifest
            .name
            .clone()
            .unwrap_or_else(|| BIN_NAME.to_string());
        let mut cmd = Command::new(name)
            .version(VERSION)
            .about(
                self.manifest
                    .usage
                    .clone()
                    .unwrap_or_else(|| "Run tasks and their prerequisites".to_string()),
            )
            .disable_help_subcommand(true);

        for task in registry.definitions(false) {
            let ctx = registry.build_argument_context(&task.name, [task.name.as_str()])?;
            cmd = cmd.subcommand(
                Command::new(task.name.clone())
                    .about(task.description.clone())
                    .args(ctx.option_args()),
            );
        }

        Ok(cmd)
    }

    /// One line per task: name and description
    pub fn list(&self, include_hidden: bool) -> String {
        let tasks: Vec<_> = self.runner.registry().definitions(include_hidden).collect();
        let width = tasks.iter().map(|task| task.name.len()).max().unwrap_or(0);
        tasks
            .iter()
            .map(|task| format!("{:width$}  {}", task.name, task.description, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run the task named by `tokens` (the task name and its flags)
    pub fn run_task(&self, tokens: Vec<String>) -> Result<()> {
        let name = tokens.first().cloned().unwrap_or_default();
        let argv: Vec<String> = std::iter::once(BIN_NAME.to_string()).chain(tokens).collect();

        match self.runner.run_current(None, Some(&argv))? {
            RunOutcome::Skipped => Err(RegistryError::UnknownTask(name).into()),
            RunOutcome::HelpShown | RunOutcome::Ran => Ok(()),
        }
    }
}

/// Build the command for the global options
///
/// Everything from the task name on is left to the task's own parser.
fn global_command() -> Command {
    Command::new(BIN_NAME)
        .version(VERSION)
        .about("Run tasks and their prerequisites")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to taskchain.yml manifest"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List visible tasks")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-all")
                .long("list-all")
                .help("List all tasks, hidden ones included")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(value_parser!(Shell))
                .help("Print a shell completion script"),
        )
        .arg(
            Arg::new("task")
                .value_name("TASK")
                .help("Task to run, followed by its options")
                .num_args(1..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<()> {
    run_from(std::env::args_os())
}

/// Run the CLI application with provided arguments (program name first)
pub fn run_from<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match global_command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(());
        }
        Err(e) => return Err(ArgumentError::from(e).into()),
    };

    let verbosity = get_verbosity(&matches);
    let path = match matches.get_one::<PathBuf>("file") {
        Some(path) => path.clone(),
        None => find_manifest_file()?,
    };
    let app = App::load(path, verbosity)?;

    if let Some(shell) = matches.get_one::<Shell>("completions").copied() {
        let mut cmd = app.overview()?;
        clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut io::stdout());
        return Ok(());
    }

    if matches.get_flag("list") || matches.get_flag("list-all") {
        println!("{}", app.list(matches.get_flag("list-all")));
        return Ok(());
    }

    let tokens: Vec<String> = matches
        .get_many::<String>("task")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if tokens.is_empty() {
        println!("{}", app.overview()?.render_help());
        return Ok(());
    }

    app.run_task(tokens)
}
