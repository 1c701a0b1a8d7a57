// src/exec/runner.rs

//! Playbook run orchestration.
//!
//! [`PlaybookRunner::start_run`] validates a request, registers a pending
//! [`RunRecord`] and hands the actual execution to a background Tokio task.
//! That task drains stdout and stderr concurrently into the record (and so
//! into every subscriber), waits for the exit code and finalizes the record.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, trace, warn};

use crate::config::Settings;
use crate::errors::{AgentError, Result};
use crate::exec::launcher::{CommandSpec, LaunchedProcess, OutputPipe, ProcessLauncher, TokioLauncher};
use crate::exec::record::RunRecord;
use crate::exec::registry::RunRegistry;
use crate::exec::stream::LogSubscription;
use crate::types::{OutputSource, RunId};

/// A request to execute one playbook.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub playbook_path: PathBuf,
    /// Falls back to the configured inventory when `None`.
    pub inventory_path: Option<PathBuf>,
    /// Appended verbatim after the playbook path.
    pub extra_args: Vec<String>,
    /// Replaces the child's environment when set.
    pub env: Option<HashMap<String, String>>,
}

impl RunRequest {
    pub fn new(playbook_path: impl Into<PathBuf>) -> Self {
        Self {
            playbook_path: playbook_path.into(),
            ..Self::default()
        }
    }

    pub fn with_inventory(mut self, inventory_path: impl Into<PathBuf>) -> Self {
        self.inventory_path = Some(inventory_path.into());
        self
    }

    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }
}

/// Starts playbook runs and keeps track of them.
pub struct PlaybookRunner {
    binary: String,
    default_inventory: PathBuf,
    max_active_runs: usize,
    launcher: Arc<dyn ProcessLauncher>,
    registry: RunRegistry,
}

impl std::fmt::Debug for PlaybookRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybookRunner")
            .field("binary", &self.binary)
            .field("default_inventory", &self.default_inventory)
            .field("max_active_runs", &self.max_active_runs)
            .field("runs", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl PlaybookRunner {
    /// Runner that spawns real processes.
    pub fn new(settings: &Settings) -> Self {
        Self::with_launcher(settings, Arc::new(TokioLauncher))
    }

    pub fn with_launcher(settings: &Settings, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            binary: settings.ansible_playbook_binary.clone(),
            default_inventory: settings.inventory_path(),
            max_active_runs: settings.max_active_runs,
            launcher,
            registry: RunRegistry::new(),
        }
    }

    /// Validate and register a run, then execute it in the background.
    ///
    /// Returns as soon as the run is registered (still `pending`). Missing
    /// playbook or inventory files, and a full runner, are reported here and
    /// no run is created. Must be called from within a Tokio runtime.
    pub fn start_run(&self, request: RunRequest) -> Result<Arc<RunRecord>> {
        let RunRequest {
            playbook_path,
            inventory_path,
            extra_args,
            env,
        } = request;
        let inventory_path = inventory_path.unwrap_or_else(|| self.default_inventory.clone());

        if !playbook_path.exists() {
            return Err(AgentError::PlaybookNotFound(playbook_path));
        }
        if !inventory_path.exists() {
            return Err(AgentError::InventoryNotFound(inventory_path));
        }

        let command = build_command(&self.binary, &inventory_path, &playbook_path, extra_args);
        let spec = CommandSpec::from_argv(&command, env)?;

        let record = Arc::new(RunRecord::new(command, playbook_path, inventory_path));
        self.registry.insert(Arc::clone(&record), self.max_active_runs)?;

        info!(
            run_id = %record.id(),
            playbook = %record.playbook_path().display(),
            "registered playbook run"
        );

        let launcher = Arc::clone(&self.launcher);
        let task_record = Arc::clone(&record);
        tokio::spawn(async move {
            run_playbook(task_record, launcher, spec).await;
        });

        Ok(record)
    }

    pub fn get_run(&self, run_id: &RunId) -> Option<Arc<RunRecord>> {
        self.registry.get(run_id)
    }

    /// Every run, oldest first.
    pub fn list_runs(&self) -> Vec<Arc<RunRecord>> {
        self.registry.list()
    }

    /// Follow a run's log from its first line until it completes.
    pub fn stream_run(&self, run_id: &RunId) -> Result<LogSubscription> {
        let record = self
            .registry
            .get(run_id)
            .ok_or_else(|| AgentError::RunNotFound(run_id.to_string()))?;
        Ok(record.subscribe())
    }

    pub fn run_count(&self) -> usize {
        self.registry.len()
    }

    pub fn active_run_count(&self) -> usize {
        self.registry.active_count()
    }
}

/// `<binary> -i <inventory> <playbook> <extra args...>`
pub fn build_command(
    binary: &str,
    inventory_path: &Path,
    playbook_path: &Path,
    extra_args: Vec<String>,
) -> Vec<String> {
    let mut command = vec![
        binary.to_string(),
        "-i".to_string(),
        inventory_path.display().to_string(),
        playbook_path.display().to_string(),
    ];
    command.extend(extra_args);
    command
}

/// Render a command line the way a POSIX shell would accept it.
pub fn display_command(command: &[String]) -> String {
    command
        .iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    let safe = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r#"'"'"'"#))
    }
}

/// Drive one run to completion.
///
/// Every failure ends up on the record (`failed`, exit code `-1`, error
/// text) and the subscribers are always released.
async fn run_playbook(record: Arc<RunRecord>, launcher: Arc<dyn ProcessLauncher>, spec: CommandSpec) {
    let run_id = record.id();

    if !record.mark_running() {
        return;
    }

    let return_code = match run_playbook_inner(&record, launcher.as_ref(), &spec).await {
        Ok(code) => code,
        Err(err) => {
            error!(run_id = %run_id, error = %err, "playbook execution error");
            record.set_error(err.to_string());
            -1
        }
    };

    record.finish(return_code);
    info!(
        run_id = %run_id,
        exit_code = return_code,
        status = %record.status(),
        "playbook run finished"
    );
    record.complete_streams();
}

async fn run_playbook_inner(
    record: &RunRecord,
    launcher: &dyn ProcessLauncher,
    spec: &CommandSpec,
) -> Result<i32> {
    let command_line = display_command(record.command());
    record.add_log(format!("$ {command_line}"));
    info!(run_id = %record.id(), cmd = %command_line, "starting playbook process");

    let LaunchedProcess {
        stdout,
        stderr,
        exit,
    } = launcher.launch(spec)?;

    // Both pipes must be drained at once; a child blocked on a full stderr
    // buffer would otherwise never close stdout.
    tokio::join!(
        drain_output(stdout, record, OutputSource::Stdout),
        drain_output(stderr, record, OutputSource::Stderr),
    );

    exit.await
}

/// Copy one pipe into the record line by line until EOF.
///
/// Invalid UTF-8 is replaced rather than rejected. Every stderr line also
/// becomes the record's error text, trimmed (last one wins, blank included).
async fn drain_output(pipe: OutputPipe, record: &RunRecord, source: OutputSource) {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let decoded = String::from_utf8_lossy(&buf);
                let line = decoded.trim_end_matches(['\n', '\r']);
                trace!(run_id = %record.id(), ?source, "{}", line);

                record.add_log(line);
                if source == OutputSource::Stderr {
                    record.set_error(line.trim());
                }
            }
            Err(err) => {
                warn!(run_id = %record.id(), ?source, error = %err, "error reading process output");
                break;
            }
        }
    }

    debug!(run_id = %record.id(), ?source, "output stream closed");
}
