// src/config/validate.rs

use std::path::{Path, PathBuf};

use crate::config::model::{RawConfigFile, Settings};
use crate::errors::{AgentError, Result};

impl TryFrom<RawConfigFile> for Settings {
    type Error = crate::errors::AgentError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let project_root = match raw.paths.project_root.clone() {
            Some(root) => root,
            None => std::env::current_dir()?,
        };
        let data_dir = normalise_data_dir(&project_root, &raw.paths.data_dir);

        Ok(Settings::new_unchecked(
            raw.server.host.trim().to_string(),
            raw.server.port,
            project_root,
            data_dir,
            &raw.paths,
            &raw.execution,
        ))
    }
}

impl Settings {
    /// Replace the bind host and/or port (CLI flags), with the same checks the
    /// config file values go through. On error nothing is changed.
    pub fn apply_server_overrides(&mut self, host: Option<String>, port: Option<u16>) -> Result<()> {
        let host = host.map_or_else(|| self.host.clone(), |h| h.trim().to_string());
        let port = port.unwrap_or(self.port);
        check_server(&host, port)?;

        self.host = host;
        self.port = port;
        Ok(())
    }
}

/// Public entry point for validating a raw config without building `Settings`.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_raw_config(cfg)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_server(cfg)?;
    validate_paths(cfg)?;
    validate_execution(cfg)?;
    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    check_server(&cfg.server.host, cfg.server.port)
}

fn check_server(host: &str, port: u16) -> Result<()> {
    if host.trim().is_empty() {
        return Err(AgentError::ConfigError(
            "[server].host must not be empty".to_string(),
        ));
    }
    if port == 0 {
        return Err(AgentError::ConfigError(
            "[server].port must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    let filename = cfg.paths.inventory_filename.trim();
    if filename.is_empty() {
        return Err(AgentError::ConfigError(
            "[paths].inventory_filename must not be empty".to_string(),
        ));
    }
    if filename.contains('/') || filename.contains('\\') {
        return Err(AgentError::ConfigError(format!(
            "[paths].inventory_filename must be a bare file name (got '{}')",
            filename
        )));
    }
    Ok(())
}

fn validate_execution(cfg: &RawConfigFile) -> Result<()> {
    if cfg.execution.ansible_playbook_binary.trim().is_empty() {
        return Err(AgentError::ConfigError(
            "[execution].ansible_playbook_binary must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn normalise_data_dir(project_root: &Path, data_dir: &Path) -> PathBuf {
    if data_dir.is_absolute() {
        data_dir.to_path_buf()
    } else {
        project_root.join(data_dir)
    }
}
