// src/api/routes/runs.rs

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{ApiError, AppState};
use crate::errors::AgentError;
use crate::exec::{RunRecord, RunRequest};
use crate::types::{RunId, RunStatus};

#[derive(Debug, Deserialize)]
pub struct RunPlaybookReq {
    /// Path relative to the playbooks directory.
    pub relative_playbook_path: String,
    #[serde(default)]
    pub extra_args: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct RunResp {
    pub run_id: RunId,
    pub status: RunStatus,
}

#[derive(Debug, Serialize)]
pub struct RunStatusResp {
    pub run_id: RunId,
    pub status: RunStatus,
    pub return_code: Option<i32>,
    pub summary: Option<String>,
    pub error: Option<String>,
}

impl RunStatusResp {
    fn from_run(run: &RunRecord) -> Self {
        let snapshot = run.snapshot();
        Self {
            run_id: snapshot.run_id,
            status: snapshot.status,
            return_code: snapshot.return_code,
            summary: snapshot.summary,
            error: snapshot.error,
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/playbooks/run", post(run_playbook))
        .route("/runs", get(list_runs))
        .route("/runs/:run_id", get(get_run))
        .route("/stream/:run_id", get(stream_logs))
}

async fn run_playbook(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunPlaybookReq>,
) -> Result<(StatusCode, Json<RunResp>), ApiError> {
    let playbook_path = state.storage.resolve_path(&req.relative_playbook_path)?;
    let request = RunRequest::new(playbook_path).with_extra_args(req.extra_args.unwrap_or_default());
    let run = state.runner.start_run(request)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(RunResp {
            run_id: run.id(),
            status: run.status(),
        }),
    ))
}

async fn list_runs(State(state): State<Arc<AppState>>) -> Json<Vec<RunStatusResp>> {
    let runs = state.runner.list_runs();
    Json(runs.iter().map(|run| RunStatusResp::from_run(run)).collect())
}

async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<Json<RunStatusResp>, ApiError> {
    let run = parse_run_id(&run_id)
        .and_then(|id| state.runner.get_run(&id))
        .ok_or(AgentError::RunNotFound(run_id))?;
    Ok(Json(RunStatusResp::from_run(&run)))
}

async fn stream_logs(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let id = parse_run_id(&run_id).ok_or(AgentError::RunNotFound(run_id))?;
    let subscription = state.runner.stream_run(&id)?;
    debug!(run_id = %id, "client attached to run log");

    // SSE fields cannot carry carriage returns.
    let events = subscription.map(|line| Ok(Event::default().data(line.replace('\r', ""))));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn parse_run_id(raw: &str) -> Option<RunId> {
    raw.parse().ok()
}
