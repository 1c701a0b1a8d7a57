// src/api/mod.rs

//! HTTP surface: inventory CRUD, sandboxed file writes, playbook runs and
//! live run logs over server-sent events.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

pub use error::ApiError;
pub use state::AppState;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    runs: usize,
    active_runs: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        runs: state.runner.run_count(),
        active_runs: state.runner.active_run_count(),
    })
}

/// Build the full Axum router.
/// Used by `lib::run` and the integration tests.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .merge(routes::inventory::router())
        .merge(routes::files::router())
        .merge(routes::runs::router())
        .with_state(state)
}
