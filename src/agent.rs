use crate::action::Action;
use crate::queue::MessageId;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// Where exim is looked for when nothing else is configured.
pub const DEFAULT_EXIM: &str = "/usr/sbin/exim";

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("cannot launch {}: {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Destination for a child's standard output.
#[derive(Debug)]
pub enum Sink {
    Terminal,
    File(File),
}

/// The administrative surface of the mail agent this tool drives.
pub trait MailAgent {
    /// Raw queue listing (`-bp`), standard output followed by standard error.
    fn queue_listing(&self) -> AgentResult<String>;

    /// Runs `action` against `id` and waits for the child to exit.
    fn message_action(
        &self,
        action: Action,
        id: &MessageId,
        sink: Sink,
    ) -> AgentResult<ExitStatus>;
}

/// An exim binary invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct Exim {
    program: PathBuf,
}

impl Exim {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, switch: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-v").arg(switch);
        cmd
    }

    fn launch_error(&self, source: io::Error) -> AgentError {
        AgentError::Launch {
            program: self.program.clone(),
            source,
        }
    }
}

impl MailAgent for Exim {
    fn queue_listing(&self) -> AgentResult<String> {
        tracing::debug!("running {} -v -bp", self.program.display());

        let output = self
            .command("-bp")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.launch_error(e))?;

        if !output.status.success() {
            tracing::warn!("queue listing exited with {}", output.status);
        }

        let mut listing = String::from_utf8_lossy(&output.stdout).into_owned();
        listing.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(listing)
    }

    fn message_action(
        &self,
        action: Action,
        id: &MessageId,
        sink: Sink,
    ) -> AgentResult<ExitStatus> {
        tracing::debug!(
            "running {} -v {} {}",
            self.program.display(),
            action.switch(),
            id
        );

        let stdout = match sink {
            Sink::Terminal => Stdio::inherit(),
            Sink::File(file) => Stdio::from(file),
        };

        let status = self
            .command(action.switch())
            .arg(id.as_str())
            .stdout(stdout)
            .status()
            .map_err(|e| self.launch_error(e))?;

        if !status.success() {
            tracing::warn!("{} {} exited with {}", action, id, status);
        }
        Ok(status)
    }
}
