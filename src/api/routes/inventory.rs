// src/api/routes/inventory.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::{ApiError, AppState};
use crate::errors::AgentError;
use crate::inventory::HostRecord;

/// Host as returned by the API; the password never leaves the server.
#[derive(Debug, Serialize)]
pub struct InventoryHostResp {
    pub name: String,
    pub hostname: String,
    pub username: Option<String>,
    pub port: Option<u16>,
    pub groups: Vec<String>,
    pub variables: BTreeMap<String, serde_yaml::Value>,
}

impl From<HostRecord> for InventoryHostResp {
    fn from(record: HostRecord) -> Self {
        Self {
            name: record.name,
            hostname: record.hostname,
            username: record.username,
            port: record.port,
            groups: record.groups,
            variables: record.variables,
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/inventory/hosts", get(list_hosts).post(upsert_host))
        .route("/inventory/hosts/:name", get(get_host).delete(delete_host))
}

async fn list_hosts(State(state): State<Arc<AppState>>) -> Json<Vec<InventoryHostResp>> {
    let hosts = state.inventory.list_hosts();
    Json(hosts.into_iter().map(InventoryHostResp::from).collect())
}

async fn get_host(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<InventoryHostResp>, ApiError> {
    let host = state
        .inventory
        .get_host(&name)
        .ok_or(AgentError::HostNotFound(name))?;
    Ok(Json(host.into()))
}

async fn upsert_host(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HostRecord>,
) -> Result<(StatusCode, Json<InventoryHostResp>), ApiError> {
    let record = state.inventory.upsert_host(payload)?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

async fn delete_host(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.inventory.delete_host(&name)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AgentError::HostNotFound(name).into())
    }
}
