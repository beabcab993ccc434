//! External command invocation.
//!
//! Every pipeline stage is described by [`Invocation`] records assembled
//! by pure planning functions, then executed strictly in order. The
//! runner prints each command line, inherits stdio so the external
//! tool's own output reaches the user unmodified, blocks until exit and
//! surfaces non-zero statuses as [`CommandError`].

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use colored::Colorize;

use crate::error::CommandError;

/// One planned external command: program, arguments, optional working
/// directory and environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: Vec::new(),
        }
    }

    /// Run the command from this directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Add one environment override for the child process.
    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.push((key.to_string(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn env_overrides(&self) -> &[(String, String)] {
        &self.env
    }

    /// The command line as shown to the user and carried in errors.
    pub fn rendered(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered())
    }
}

fn prepare(invocation: &Invocation) -> Command {
    let mut cmd = Command::new(invocation.program());
    cmd.args(invocation.args());
    if let Some(dir) = invocation.workdir() {
        cmd.current_dir(dir);
    }
    for (key, value) in invocation.env_overrides() {
        cmd.env(key, value);
    }
    cmd
}

/// Run one command to completion, failing fast on a non-zero status.
pub fn run(invocation: &Invocation) -> Result<(), CommandError> {
    println!("{} {}", "→".blue().bold(), invocation.rendered());
    if let Some(dir) = invocation.workdir() {
        log::debug!("running '{}' in {}", invocation.rendered(), dir.display());
    }

    let status = prepare(invocation)
        .status()
        .map_err(|source| CommandError::Spawn {
            command: invocation.rendered(),
            source,
        })?;

    if status.success() {
        return Ok(());
    }

    println!("{} {}", "✖ command failed:".red().bold(), invocation.rendered());
    match status.code() {
        Some(code) => Err(CommandError::Failed {
            command: invocation.rendered(),
            code,
        }),
        None => Err(CommandError::Terminated {
            command: invocation.rendered(),
        }),
    }
}

/// Run a sequence of commands strictly in order, stopping at the first
/// failure.
pub fn run_all(invocations: &[Invocation]) -> Result<(), CommandError> {
    for invocation in invocations {
        run(invocation)?;
    }
    Ok(())
}

/// Start a long-lived helper process in the background, with stdout and
/// stderr captured to `log_path`. Returns the child's pid; the child is
/// intentionally not waited on.
pub fn spawn_logged(invocation: &Invocation, log_path: &Path) -> Result<u32, CommandError> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).map_err(|source| CommandError::Spawn {
            command: invocation.rendered(),
            source,
        })?;
    }
    let log_file = File::create(log_path).map_err(|source| CommandError::Spawn {
        command: invocation.rendered(),
        source,
    })?;
    let log_clone = log_file.try_clone().map_err(|source| CommandError::Spawn {
        command: invocation.rendered(),
        source,
    })?;

    let child = prepare(invocation)
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(log_clone))
        .spawn()
        .map_err(|source| CommandError::Spawn {
            command: invocation.rendered(),
            source,
        })?;

    log::info!(
        "started '{}' in the background (pid {}, logs: {})",
        invocation.rendered(),
        child.id(),
        log_path.display()
    );
    Ok(child.id())
}
