// src/lib.rs

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod inventory;
pub mod logging;
pub mod storage;
pub mod types;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::api::{build_router, AppState};
use crate::cli::CliArgs;
use crate::config::{load_settings, Settings};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - data directories, inventory, file storage and the playbook runner
/// - the HTTP server
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.as_ref().map(PathBuf::from);
    let mut settings = load_settings(config_path.as_deref())?;

    settings.apply_server_overrides(args.host, args.port)?;

    if args.check_config {
        print_settings(&settings);
        return Ok(());
    }

    let bind_addr = settings.bind_addr();
    let state = AppState::new(settings)?;
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "playbook-agent listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// `--check-config` output: the resolved settings, nothing started.
fn print_settings(settings: &Settings) {
    println!("playbook-agent config");
    println!("  server.bind = {}", settings.bind_addr());
    println!("  paths.project_root = {}", settings.project_root.display());
    println!("  paths.data_dir = {}", settings.data_dir.display());
    println!("  paths.inventory = {}", settings.inventory_path().display());
    println!("  paths.documents = {}", settings.documents_path().display());
    println!("  paths.playbooks = {}", settings.playbooks_path().display());
    println!("  paths.executions = {}", settings.executions_path().display());
    println!(
        "  execution.ansible_playbook_binary = {}",
        settings.ansible_playbook_binary
    );
    if settings.max_active_runs == 0 {
        println!("  execution.max_active_runs = unlimited");
    } else {
        println!("  execution.max_active_runs = {}", settings.max_active_runs);
    }

    debug!("config check complete (server not started)");
}
