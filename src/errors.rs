// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Playbook not found: {}", .0.display())]
    PlaybookNotFound(PathBuf),

    #[error("Inventory not found: {}", .0.display())]
    InventoryNotFound(PathBuf),

    #[error("Invalid path; must reside under storage directory: {0}")]
    PathEscape(String),

    #[error("Unknown run_id: {0}")]
    RunNotFound(String),

    #[error("Host not found: {0}")]
    HostNotFound(String),

    #[error("Host already exists: {0}")]
    HostConflict(String),

    #[error("Failed to launch process: {0}")]
    Launch(String),

    #[error("Too many active runs (limit {0})")]
    CapacityExceeded(usize),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AgentError>;
