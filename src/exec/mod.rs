// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs the playbook command using `tokio::process::Command`,
//! records its lifecycle and output, and fans the output out to any number of
//! observers.
//!
//! - [`launcher`] provides the `ProcessLauncher` trait and the real
//!   `TokioLauncher`; tests can replace it with a scripted implementation.
//! - [`record`] holds the per-run state machine and log.
//! - [`stream`] is the subscriber side of a run's log.
//! - [`registry`] maps run ids to records.
//! - [`runner`] validates requests and drives runs to completion.
//! - [`summary`] derives the outcome text from the log.

pub mod launcher;
pub mod record;
pub mod registry;
pub mod runner;
pub mod stream;
pub mod summary;

pub use launcher::{CommandSpec, LaunchedProcess, ProcessLauncher, TokioLauncher};
pub use record::{RunRecord, RunSnapshot};
pub use registry::RunRegistry;
pub use runner::{PlaybookRunner, RunRequest};
pub use stream::LogSubscription;
pub use summary::build_summary;
