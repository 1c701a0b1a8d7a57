// src/exec/record.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

use crate::exec::stream::{LogEvent, LogSubscription};
use crate::exec::summary::build_summary;
use crate::types::{RunId, RunStatus};

/// State of one playbook execution.
///
/// Identity and the command line are fixed at creation; everything else
/// lives behind a single lock so that log appends, subscriber registration
/// and status transitions are observed in one order.
#[derive(Debug)]
pub struct RunRecord {
    id: RunId,
    command: Vec<String>,
    playbook_path: PathBuf,
    inventory_path: PathBuf,
    created_at: DateTime<Utc>,
    state: Mutex<RunState>,
}

#[derive(Debug, Default)]
struct RunState {
    status: RunStatus,
    return_code: Option<i32>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    summary: Option<String>,
    error: Option<String>,
    logs: Vec<String>,
    subscribers: Vec<Subscriber>,
    next_subscriber_id: u64,
    streams_completed: bool,
}

#[derive(Debug)]
struct Subscriber {
    id: u64,
    tx: mpsc::UnboundedSender<LogEvent>,
}

/// Point-in-time copy of a record, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub run_id: RunId,
    pub status: RunStatus,
    pub command: Vec<String>,
    pub playbook_path: PathBuf,
    pub inventory_path: PathBuf,
    pub return_code: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub error: Option<String>,
    pub log_lines: usize,
}

impl RunRecord {
    pub fn new(command: Vec<String>, playbook_path: PathBuf, inventory_path: PathBuf) -> Self {
        Self {
            id: RunId::new(),
            command,
            playbook_path,
            inventory_path,
            created_at: Utc::now(),
            state: Mutex::new(RunState::default()),
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn playbook_path(&self) -> &Path {
        &self.playbook_path
    }

    pub fn inventory_path(&self) -> &Path {
        &self.inventory_path
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> RunStatus {
        self.state.lock().status
    }

    pub fn return_code(&self) -> Option<i32> {
        self.state.lock().return_code
    }

    pub fn summary(&self) -> Option<String> {
        self.state.lock().summary.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Copy of the log so far.
    pub fn logs(&self) -> Vec<String> {
        self.state.lock().logs.clone()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        let state = self.state.lock();
        RunSnapshot {
            run_id: self.id,
            status: state.status,
            command: self.command.clone(),
            playbook_path: self.playbook_path.clone(),
            inventory_path: self.inventory_path.clone(),
            return_code: state.return_code,
            created_at: self.created_at,
            started_at: state.started_at,
            finished_at: state.finished_at,
            summary: state.summary.clone(),
            error: state.error.clone(),
            log_lines: state.logs.len(),
        }
    }

    /// `pending -> running`. Returns `false` if the record was not pending.
    pub fn mark_running(&self) -> bool {
        let mut state = self.state.lock();
        if state.status != RunStatus::Pending {
            warn!(run_id = %self.id, status = %state.status, "ignoring transition to running");
            return false;
        }
        state.status = RunStatus::Running;
        state.started_at = Some(Utc::now());
        true
    }

    /// Append a line and hand a copy to every live subscriber.
    ///
    /// Never waits on a subscriber; ones whose receiving side is gone are
    /// dropped from the set.
    pub fn add_log(&self, line: impl Into<String>) {
        let line = line.into();
        let mut state = self.state.lock();
        state
            .subscribers
            .retain(|sub| sub.tx.send(LogEvent::Line(line.clone())).is_ok());
        state.logs.push(line);
    }

    /// Overwrite the error text. Ignored once the record is terminal.
    pub fn set_error(&self, error: impl Into<String>) {
        let mut state = self.state.lock();
        if state.status.is_terminal() {
            return;
        }
        state.error = Some(error.into());
    }

    /// Move to `succeeded`/`failed` according to `return_code`, stamp the
    /// finish time and compute the summary.
    ///
    /// A failed run without any recorded error gets a generic one. Returns
    /// `false` if the record was already terminal.
    pub fn finish(&self, return_code: i32) -> bool {
        let mut state = self.state.lock();
        if state.status.is_terminal() {
            warn!(run_id = %self.id, status = %state.status, "run already finished");
            return false;
        }

        state.return_code = Some(return_code);
        state.finished_at = Some(Utc::now());
        state.status = if return_code == 0 {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        };
        let summary = build_summary(&state.logs, return_code, state.error.as_deref());
        state.summary = Some(summary);
        if return_code != 0 && state.error.as_deref().is_none_or(str::is_empty) {
            state.error = Some(format!("Process exited with code {return_code}"));
        }
        true
    }

    /// Send the end-of-stream sentinel to every subscriber.
    ///
    /// Only effective once, and only after the record is terminal.
    pub fn complete_streams(&self) {
        let mut state = self.state.lock();
        if !state.status.is_terminal() || state.streams_completed {
            return;
        }
        state.streams_completed = true;
        for sub in state.subscribers.drain(..) {
            let _ = sub.tx.send(LogEvent::End);
        }
    }

    /// Attach a new observer.
    ///
    /// The current log is replayed into the subscriber's queue and the
    /// subscriber is registered under the same lock that `add_log` takes, so
    /// it sees every line exactly once. If the streams have already been
    /// completed the sentinel follows the replay and nothing is registered.
    pub fn subscribe(self: &Arc<Self>) -> LogSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();

        for line in &state.logs {
            let _ = tx.send(LogEvent::Line(line.clone()));
        }

        if state.streams_completed {
            let _ = tx.send(LogEvent::End);
            return LogSubscription::new(Arc::clone(self), None, rx);
        }

        let id = state.next_subscriber_id;
        state.next_subscriber_id += 1;
        state.subscribers.push(Subscriber { id, tx });
        LogSubscription::new(Arc::clone(self), Some(id), rx)
    }

    pub(crate) fn unsubscribe(&self, subscriber_id: u64) {
        self.state
            .lock()
            .subscribers
            .retain(|sub| sub.id != subscriber_id);
    }
}
