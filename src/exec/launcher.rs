// src/exec/launcher.rs

//! Pluggable process launcher abstraction.
//!
//! The runner talks to a `ProcessLauncher` instead of `tokio::process`
//! directly. Production code uses [`TokioLauncher`]; tests can provide a
//! launcher that replays scripted output without spawning anything.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::AsyncRead;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{AgentError, Result};

/// One readable output pipe of a launched process.
pub type OutputPipe = Box<dyn AsyncRead + Send + Unpin>;

/// Resolves to the exit code once the process has terminated.
///
/// Processes killed by a signal report `-1`.
pub type ExitFuture = Pin<Box<dyn Future<Output = Result<i32>> + Send>>;

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Replaces the child's whole environment when set.
    pub env: Option<HashMap<String, String>>,
}

impl CommandSpec {
    /// Split a full argv (`program` first) into a spec.
    pub fn from_argv(argv: &[String], env: Option<HashMap<String, String>>) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| AgentError::Launch("empty command line".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            env,
        })
    }
}

/// A started process: two independent output pipes and its exit code.
pub struct LaunchedProcess {
    pub stdout: OutputPipe,
    pub stderr: OutputPipe,
    pub exit: ExitFuture,
}

/// Trait abstracting how run commands are started.
///
/// Implementations must not block: `launch` returns as soon as the process
/// exists. A program that cannot be found or spawned is reported as
/// [`AgentError::Launch`].
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, spec: &CommandSpec) -> Result<LaunchedProcess>;
}

/// Real launcher backed by `tokio::process::Command`.
///
/// Must be called from within a Tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn launch(&self, spec: &CommandSpec) -> Result<LaunchedProcess> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(env) = &spec.env {
            cmd.env_clear().envs(env);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| AgentError::Launch(format!("{}: {}", spec.program, e)))?;

        debug!(program = %spec.program, pid = ?child.id(), "spawned process");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::Launch("stdout pipe unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AgentError::Launch("stderr pipe unavailable".to_string()))?;

        let exit: ExitFuture = Box::pin(async move {
            let status = child.wait().await?;
            Ok::<_, AgentError>(status.code().unwrap_or(-1))
        });

        Ok(LaunchedProcess {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            exit,
        })
    }
}
