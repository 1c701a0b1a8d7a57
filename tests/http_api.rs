// tests/http_api.rs
//
// Spins up the real Axum router on a random port with a scripted process
// launcher and drives it over HTTP.

mod common;
use crate::common::builders::SettingsBuilder;
use crate::common::fake_launcher::{FakeLauncher, ScriptedProcess};
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

use playbook_agent::api::{build_router, AppState};
use playbook_agent::exec::ProcessLauncher;

struct TestServer {
    base: String,
    state: Arc<AppState>,
    _dir: TempDir,
}

/// Start the agent on a random port, return its base URL and shared state.
async fn start_server(launcher: Arc<dyn ProcessLauncher>) -> TestServer {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let settings = SettingsBuilder::new(dir.path()).build();
    let state = AppState::with_launcher(settings, launcher).unwrap();
    let app = build_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://127.0.0.1:{port}"),
        state,
        _dir: dir,
    }
}

fn recap_script() -> ScriptedProcess {
    ScriptedProcess::new(0)
        .stdout("PLAY [all] ***")
        .stdout("PLAY RECAP ***")
        .stdout("web01 : ok=1 changed=0")
}

async fn write_site_playbook(client: &reqwest::Client, base: &str) {
    let resp = client
        .post(format!("{base}/files/write"))
        .json(&json!({"relative_path": "site.yml", "content": "- hosts: all\n"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_reports_run_counts() {
    let server = start_server(Arc::new(FakeLauncher::new(recap_script()))).await;

    let resp = reqwest::get(format!("{}/healthz", server.base)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok", "runs": 0, "active_runs": 0}));
}

#[tokio::test]
async fn inventory_crud_round_trip() {
    let server = start_server(Arc::new(FakeLauncher::new(recap_script()))).await;
    let base = &server.base;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/inventory/hosts"))
        .json(&json!({
            "name": "web 01",
            "hostname": "10.0.0.5",
            "username": "deploy",
            "password": "s3cret",
            "port": 22,
            "groups": ["web"],
            "variables": {"ansible_become": true}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["name"], "web-01");
    assert!(created.get("password").is_none());

    let hosts: Value = reqwest::get(format!("{base}/inventory/hosts"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hosts.as_array().unwrap().len(), 1);
    assert_eq!(hosts[0]["hostname"], "10.0.0.5");
    assert_eq!(hosts[0]["groups"], json!(["web"]));
    assert_eq!(hosts[0]["variables"]["ansible_become"], true);

    let resp = reqwest::get(format!("{base}/inventory/hosts/web-01")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Stored with credentials, even though the API never returns them.
    let stored = server.state.inventory.get_host("web-01").unwrap();
    assert_eq!(stored.password.as_deref(), Some("s3cret"));

    let resp = client
        .delete(format!("{base}/inventory/hosts/web-01"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .delete(format!("{base}/inventory/hosts/web-01"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("web-01"));

    let resp = reqwest::get(format!("{base}/inventory/hosts/web-01")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn file_write_rejects_escapes() {
    let server = start_server(Arc::new(FakeLauncher::new(recap_script()))).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/files/write", server.base))
        .json(&json!({"relative_path": "roles/site.yml", "content": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let path = body["path"].as_str().unwrap();
    assert!(path.ends_with("roles/site.yml"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "x");

    let resp = client
        .post(format!("{}/files/write", server.base))
        .json(&json!({"relative_path": "../../escape.yml", "content": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("storage directory"));
}

#[tokio::test]
async fn run_status_and_stream() {
    let launcher = Arc::new(FakeLauncher::new(recap_script()));
    let server = start_server(launcher.clone()).await;
    let base = &server.base;
    let client = reqwest::Client::new();
    write_site_playbook(&client, base).await;

    let resp = client
        .post(format!("{base}/playbooks/run"))
        .json(&json!({"relative_playbook_path": "site.yml", "extra_args": ["--check"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let started: Value = resp.json().await.unwrap();
    let run_id = started["run_id"].as_str().unwrap().to_string();
    assert!(["pending", "running", "succeeded"].contains(&started["status"].as_str().unwrap()));

    // The stream ends once the run completes.
    let body = with_timeout(async {
        reqwest::get(format!("{base}/stream/{run_id}"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    })
    .await;
    let lines: Vec<&str> = body
        .lines()
        .filter_map(|l| l.strip_prefix("data: "))
        .collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("$ ansible-playbook -i "));
    assert!(lines[0].ends_with("--check"));
    assert_eq!(&lines[1..], &["PLAY [all] ***", "PLAY RECAP ***", "web01 : ok=1 changed=0"]);

    let status: Value = reqwest::get(format!("{base}/runs/{run_id}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        status,
        json!({
            "run_id": run_id,
            "status": "succeeded",
            "return_code": 0,
            "summary": "Playbook succeeded, recap: web01 : ok=1 changed=0",
            "error": null
        })
    );

    let runs: Value = reqwest::get(format!("{base}/runs")).await.unwrap().json().await.unwrap();
    assert_eq!(runs.as_array().unwrap().len(), 1);
    assert_eq!(runs[0]["run_id"], run_id.as_str());
    assert_eq!(launcher.launched().len(), 1);
}

#[tokio::test]
async fn run_errors_map_to_status_codes() {
    let server = start_server(Arc::new(FakeLauncher::new(recap_script()))).await;
    let base = &server.base;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/playbooks/run"))
        .json(&json!({"relative_playbook_path": "missing.yml"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .post(format!("{base}/playbooks/run"))
        .json(&json!({"relative_playbook_path": "../outside.yml"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.state.runner.run_count(), 0);

    for path in ["runs/not-a-uuid", "stream/not-a-uuid"] {
        let resp = reqwest::get(format!("{base}/{path}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let unknown = playbook_agent::types::RunId::new();
    let resp = reqwest::get(format!("{base}/runs/{unknown}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], format!("Unknown run_id: {unknown}"));
}

#[tokio::test]
async fn capacity_limit_returns_service_unavailable() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let settings = SettingsBuilder::new(dir.path()).max_active_runs(1).build();
    let gate = crate::common::fake_launcher::Gate::new();
    let launcher = Arc::new(FakeLauncher::new(ScriptedProcess::new(0).gated(&gate)));
    let state = AppState::with_launcher(settings, launcher).unwrap();
    let app = build_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    write_site_playbook(&client, &base).await;
    let run = || {
        client
            .post(format!("{base}/playbooks/run"))
            .json(&json!({"relative_playbook_path": "site.yml"}))
            .send()
    };

    assert_eq!(run().await.unwrap().status(), StatusCode::ACCEPTED);
    assert_eq!(run().await.unwrap().status(), StatusCode::SERVICE_UNAVAILABLE);

    gate.open();
    with_timeout(async {
        while state.runner.active_run_count() > 0 {
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert_eq!(run().await.unwrap().status(), StatusCode::ACCEPTED);
}
