// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawConfigFile, Settings};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** validate or
/// normalize paths. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, validate it and resolve every path.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks basic sanity (port, binary, inventory file name).
/// - Resolves `data_dir` against `project_root`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let raw_config = load_from_path(&path)?;
    Settings::try_from(raw_config)
}

/// Resolve settings for startup.
///
/// - An explicit path must exist and parse.
/// - Without one, [`default_config_path`] is used if present, otherwise the
///   built-in defaults apply.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let fallback = default_config_path();
    if fallback.is_file() {
        debug!(path = %fallback.display(), "using config file from working directory");
        load_and_validate(&fallback)
    } else {
        debug!("no config file found; using built-in defaults");
        Settings::try_from(RawConfigFile::default())
    }
}

/// Default config location: `playbook-agent.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("playbook-agent.toml")
}
