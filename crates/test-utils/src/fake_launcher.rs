use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::io::AsyncWriteExt;
use tokio::sync::watch;

use playbook_agent::errors::{AgentError, Result};
use playbook_agent::exec::launcher::{ExitFuture, OutputPipe};
use playbook_agent::exec::{CommandSpec, LaunchedProcess, ProcessLauncher};

/// Holds a scripted process back until opened.
#[derive(Clone)]
pub struct Gate {
    tx: Arc<watch::Sender<bool>>,
}

impl Gate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    async fn wait(mut rx: watch::Receiver<bool>) {
        let _ = rx.wait_for(|open| *open).await;
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

/// What a fake process prints and how it exits.
#[derive(Clone, Default)]
pub struct ScriptedProcess {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub exit_code: i32,
    /// Refuse to start, as if the binary were missing.
    pub fail_launch: bool,
    /// Output and exit are withheld until the gate opens.
    pub gate: Option<Gate>,
}

impl ScriptedProcess {
    pub fn new(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    pub fn stdout(mut self, line: &str) -> Self {
        self.stdout.push(line.to_string());
        self
    }

    pub fn stderr(mut self, line: &str) -> Self {
        self.stderr.push(line.to_string());
        self
    }

    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    pub fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }
}

/// A fake launcher that:
/// - records every command it was asked to start
/// - plays back scripted processes in order (the last one repeats).
///
/// Must be used from within a Tokio runtime.
pub struct FakeLauncher {
    scripts: Mutex<VecDeque<ScriptedProcess>>,
    fallback: ScriptedProcess,
    launched: Arc<Mutex<Vec<CommandSpec>>>,
}

impl FakeLauncher {
    pub fn new(script: ScriptedProcess) -> Self {
        Self::with_scripts(vec![script])
    }

    pub fn with_scripts(scripts: Vec<ScriptedProcess>) -> Self {
        let fallback = scripts.last().cloned().unwrap_or_default();
        Self {
            scripts: Mutex::new(scripts.into()),
            fallback,
            launched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Commands launched so far.
    pub fn launched(&self) -> Vec<CommandSpec> {
        self.launched.lock().unwrap().clone()
    }

    fn next_script(&self) -> ScriptedProcess {
        self.scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, spec: &CommandSpec) -> Result<LaunchedProcess> {
        self.launched.lock().unwrap().push(spec.clone());

        let script = self.next_script();
        if script.fail_launch {
            return Err(AgentError::Launch(format!(
                "{}: No such file or directory",
                spec.program
            )));
        }

        let gate_rx = script.gate.as_ref().map(|g| g.tx.subscribe());

        let stdout = scripted_pipe(script.stdout, gate_rx.clone());
        let stderr = scripted_pipe(script.stderr, gate_rx.clone());

        let exit_code = script.exit_code;
        let exit: ExitFuture = Box::pin(async move {
            if let Some(rx) = gate_rx {
                Gate::wait(rx).await;
            }
            Ok(exit_code)
        });

        Ok(LaunchedProcess {
            stdout,
            stderr,
            exit,
        })
    }
}

fn scripted_pipe(lines: Vec<String>, gate: Option<watch::Receiver<bool>>) -> OutputPipe {
    let (mut writer, reader) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        if let Some(rx) = gate {
            Gate::wait(rx).await;
        }
        for line in lines {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
            {
                return;
            }
        }
        let _ = writer.shutdown().await;
    });
    Box::new(reader)
}
