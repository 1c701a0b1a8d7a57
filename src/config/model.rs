// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration exactly as read from a TOML file.
///
/// ```toml
/// [server]
/// host = "0.0.0.0"
/// port = 8000
///
/// [paths]
/// project_root = "."
/// data_dir = "data"
/// inventory_filename = "inventory.yml"
///
/// [execution]
/// ansible_playbook_binary = "ansible-playbook"
/// max_active_runs = 0
/// ```
///
/// All sections are optional. Paths are not normalized here; use
/// `Settings::try_from` (see `validate.rs`) for that.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub execution: ExecutionSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[paths]` section.
///
/// `data_dir` is resolved against `project_root` when relative; the
/// per-artefact directories are resolved against `data_dir`.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    /// Defaults to the current working directory.
    #[serde(default)]
    pub project_root: Option<PathBuf>,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_inventory_dir")]
    pub inventory_dir: PathBuf,

    #[serde(default = "default_inventory_filename")]
    pub inventory_filename: String,

    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    #[serde(default = "default_playbooks_dir")]
    pub playbooks_dir: PathBuf,

    #[serde(default = "default_executions_dir")]
    pub executions_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_inventory_dir() -> PathBuf {
    PathBuf::from("inventory")
}

fn default_inventory_filename() -> String {
    "inventory.yml".to_string()
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("documents")
}

fn default_playbooks_dir() -> PathBuf {
    PathBuf::from("playbooks")
}

fn default_executions_dir() -> PathBuf {
    PathBuf::from("executions")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            project_root: None,
            data_dir: default_data_dir(),
            inventory_dir: default_inventory_dir(),
            inventory_filename: default_inventory_filename(),
            documents_dir: default_documents_dir(),
            playbooks_dir: default_playbooks_dir(),
            executions_dir: default_executions_dir(),
        }
    }
}

/// `[execution]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionSection {
    /// Program invoked for every run; looked up on `PATH` when not a path.
    #[serde(default = "default_binary")]
    pub ansible_playbook_binary: String,

    /// Upper bound on simultaneously active (non-terminal) runs.
    ///
    /// `0` means unlimited.
    #[serde(default)]
    pub max_active_runs: usize,
}

fn default_binary() -> String {
    "ansible-playbook".to_string()
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            ansible_playbook_binary: default_binary(),
            max_active_runs: 0,
        }
    }
}

/// Validated, normalized runtime settings.
///
/// Only constructible through `TryFrom<RawConfigFile>` (or the explicit
/// [`Settings::new_unchecked`]), so every path in here is absolute-or-rooted
/// the same way.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    inventory_dir: PathBuf,
    inventory_filename: String,
    documents_dir: PathBuf,
    playbooks_dir: PathBuf,
    executions_dir: PathBuf,
    pub ansible_playbook_binary: String,
    pub max_active_runs: usize,
}

impl Settings {
    /// Build settings from already-normalized parts.
    ///
    /// `inventory_dir`, `documents_dir`, `playbooks_dir` and
    /// `executions_dir` are joined onto `data_dir` (a no-op if absolute).
    /// The inventory file name and the binary are stored trimmed.
    pub fn new_unchecked(
        host: String,
        port: u16,
        project_root: PathBuf,
        data_dir: PathBuf,
        paths: &PathsSection,
        execution: &ExecutionSection,
    ) -> Self {
        Self {
            host,
            port,
            project_root,
            data_dir,
            inventory_dir: paths.inventory_dir.clone(),
            inventory_filename: paths.inventory_filename.trim().to_string(),
            documents_dir: paths.documents_dir.clone(),
            playbooks_dir: paths.playbooks_dir.clone(),
            executions_dir: paths.executions_dir.clone(),
            ansible_playbook_binary: execution.ansible_playbook_binary.trim().to_string(),
            max_active_runs: execution.max_active_runs,
        }
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.data_dir
            .join(&self.inventory_dir)
            .join(&self.inventory_filename)
    }

    pub fn documents_path(&self) -> PathBuf {
        self.data_dir.join(&self.documents_dir)
    }

    pub fn playbooks_path(&self) -> PathBuf {
        self.data_dir.join(&self.playbooks_dir)
    }

    pub fn executions_path(&self) -> PathBuf {
        self.data_dir.join(&self.executions_dir)
    }

    /// Create every data directory the agent writes into.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        let inventory_path = self.inventory_path();
        let inventory_parent = inventory_path.parent().unwrap_or(Path::new("."));
        let documents = self.documents_path();
        let playbooks = self.playbooks_path();
        let executions = self.executions_path();

        for dir in [
            self.data_dir.as_path(),
            inventory_parent,
            documents.as_path(),
            playbooks.as_path(),
            executions.as_path(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// `host:port` string suitable for binding a listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
