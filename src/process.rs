//! Running external programs.

#[cfg(test)]
use std::{
    path::PathBuf,
    sync::{Mutex, PoisonError},
};
use std::{path::Path, process::Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use crate::trace;

/// Outcome of a finished program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    /// The last `lines` lines of stderr, or of stdout when stderr is empty.
    #[must_use]
    pub fn tail(&self, lines: usize) -> String {
        let text = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };

        let all: Vec<&str> = text.trim_end().lines().collect();
        all[all.len().saturating_sub(lines)..].join("\n")
    }

    #[must_use]
    pub fn describe_status(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs `program args...` inside a working directory and waits for it.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`Err`] only if the program could not be started. A program
    /// that runs and fails is reported through [`Output::success`].
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> std::io::Result<Output>;
}

/// Spawns real child processes. Output is collected in full.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> std::io::Result<Output> {
        trace!("Running `{program} {}` in {}", args.join(" "), cwd.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .await?;

        trace!("`{program}` finished with {}", output.status);

        Ok(Output {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A program invocation seen by a [`RecordingRunner`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

#[cfg(test)]
impl Invocation {
    /// `program args...` as one string.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
type Responder = Box<dyn Fn(&Invocation) -> std::io::Result<Output> + Send + Sync>;

/// Runner that never spawns anything. It records each invocation and answers
/// with whatever its responder returns (success by default).
#[cfg(test)]
pub struct RecordingRunner {
    invocations: Mutex<Vec<Invocation>>,
    responder: Responder,
}

#[cfg(test)]
impl RecordingRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::responding(|_| {
            Ok(Output {
                success: true,
                code: Some(0),
                ..Output::default()
            })
        })
    }

    #[must_use]
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&Invocation) -> std::io::Result<Output> + Send + Sync + 'static,
    {
        Self {
            invocations: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> std::io::Result<Output> {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            cwd: cwd.to_path_buf(),
        };

        let response = (self.responder)(&invocation);
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation);
        response
    }
}
