// src/config/mod.rs

//! Configuration loading and validation for the agent.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and the normalized `Settings` (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate and normalize it (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_settings};
pub use model::{ExecutionSection, PathsSection, RawConfigFile, ServerSection, Settings};
pub use validate::validate_config;
