// src/api/routes/files.rs

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::api::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct WriteFileReq {
    /// Path relative to the playbooks directory.
    pub relative_path: String,
    pub content: String,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/files/write", post(write_file))
}

async fn write_file(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WriteFileReq>,
) -> Result<Json<HashMap<&'static str, String>>, ApiError> {
    let path = state.storage.write_text(&req.relative_path, &req.content)?;
    Ok(Json(HashMap::from([("path", path.display().to_string())])))
}
