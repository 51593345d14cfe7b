//! Invocation of the OS service manager (systemctl)

use std::process::Stdio;
use tokio::process::{Child, Command};

/// Default service manager program
pub const DEFAULT_PROGRAM: &str = "systemctl";

/// Arguments for listing every loaded service, one per line
const LIST_ARGS: &[&str] = &["--type=service", "--no-legend", "--quiet", "--no-pager"];

/// Mutating operations accepted by the service manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlVerb {
    Start,
    Stop,
    Restart,
}

impl ControlVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }
}

impl std::fmt::Display for ControlVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle on the external service manager command
///
/// The program may carry leading arguments, e.g. `sudo -n systemctl`.
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: String,
    prefix_args: Vec<String>,
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Systemctl {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// Build from a shell-style command line
    pub fn from_command_line(cmd: &str) -> Result<Self, CommandError> {
        let parts = shlex::split(cmd).ok_or_else(|| CommandError::InvalidCommand(cmd.to_string()))?;
        let Some((program, args)) = parts.split_first() else {
            return Err(CommandError::InvalidCommand(cmd.to_string()));
        };

        Ok(Self {
            program: program.clone(),
            prefix_args: args.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.prefix_args);
        cmd.stdin(Stdio::null());
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> CommandError {
        CommandError::Spawn {
            program: self.program.clone(),
            source,
        }
    }

    /// Run the list command to completion and return its stdout
    pub async fn list_units(&self) -> Result<String, CommandError> {
        let output = self
            .command()
            .args(LIST_ARGS)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(if stderr.is_empty() {
                CommandError::Exited(output.status.code())
            } else {
                CommandError::Diagnostic(stderr)
            });
        }

        // Diagnostics with no listing at all mean the query itself failed
        if stdout.trim().is_empty() && !stderr.is_empty() {
            return Err(CommandError::Diagnostic(stderr));
        }

        Ok(stdout)
    }

    /// Spawn `is-active <name>` with both output streams piped
    pub(crate) fn spawn_is_active(&self, name: &str) -> Result<Child, CommandError> {
        self.command()
            .arg("is-active")
            .arg(name)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))
    }

    /// Run a start/stop/restart command
    ///
    /// Any diagnostic output counts as failure, regardless of exit code.
    pub async fn control(&self, verb: ControlVerb, name: &str) -> Result<(), CommandError> {
        let output = self
            .command()
            .arg(verb.as_str())
            .arg(name)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            return Err(CommandError::Diagnostic(stderr));
        }

        Ok(())
    }
}

fn exit_message(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Diagnostic(String),

    #[error("{}", exit_message(.0))]
    Exited(Option<i32>),

    #[error("Unrecognized status: {0}")]
    UnrecognizedStatus(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
