//! Shell command execution
//!
//! Manifest hooks are lists of shell commands run through the configured
//! interpreter, with the task's parsed options available both as `${name}`
//! interpolation and as environment variables.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{interpolate, Context};
use crate::task::Hook;
use std::collections::HashMap;
use std::process::{Command as StdCommand, Stdio};
use std::sync::Arc;

fn shell(exec_str: &str, ctx: &Context) -> ExecutionResult<StdCommand> {
    let (program, args) = ctx
        .interpreter
        .split_first()
        .ok_or(ExecutionError::NoInterpreter)?;

    let mut command = StdCommand::new(program);
    command.args(args).arg(exec_str).current_dir(&ctx.working_dir);
    Ok(command)
}

/// Execute a command in the given context
pub fn execute_command(
    cmd: &str,
    ctx: &Context,
    vars: &HashMap<String, String>,
) -> ExecutionResult<()> {
    let exec_str = interpolate(cmd, vars)?;
    ctx.ui.print_command(&exec_str);

    let mut command = shell(&exec_str, ctx)?;
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .envs(vars);

    let status = command.status().map_err(|source| ExecutionError::Spawn {
        command: exec_str.clone(),
        source,
    })?;

    if !status.success() {
        return Err(ExecutionError::CommandFailed {
            command: exec_str,
            code: status.code(),
        });
    }

    Ok(())
}

/// Check if a command succeeds, with its output suppressed
pub fn check_command(
    cmd: &str,
    ctx: &Context,
    vars: &HashMap<String, String>,
) -> ExecutionResult<bool> {
    let exec_str = interpolate(cmd, vars)?;

    let mut command = shell(&exec_str, ctx)?;
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .envs(vars);

    let status = command.status().map_err(|source| ExecutionError::Spawn {
        command: exec_str,
        source,
    })?;

    Ok(status.success())
}

/// A lifecycle hook running `commands` in order, stopping at the first failure
pub fn shell_hook(commands: Vec<String>, ctx: Arc<Context>) -> Hook {
    Hook::new(move |args| {
        let vars = args.parsed()?.vars();
        for cmd in &commands {
            execute_command(cmd, &ctx, &vars)?;
        }
        Ok(())
    })
}
