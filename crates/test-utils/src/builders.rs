#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use playbook_agent::config::{RawConfigFile, Settings};
use playbook_agent::inventory::HostRecord;

/// Builder for `Settings` rooted in a (usually temporary) project directory.
pub struct SettingsBuilder {
    config: RawConfigFile,
}

impl SettingsBuilder {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        let mut config = RawConfigFile::default();
        config.paths.project_root = Some(project_root.as_ref().to_path_buf());
        config.server.host = "127.0.0.1".to_string();
        Self { config }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn binary(mut self, binary: &str) -> Self {
        self.config.execution.ansible_playbook_binary = binary.to_string();
        self
    }

    pub fn max_active_runs(mut self, limit: usize) -> Self {
        self.config.execution.max_active_runs = limit;
        self
    }

    pub fn inventory_filename(mut self, name: &str) -> Self {
        self.config.paths.inventory_filename = name.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> Settings {
        Settings::try_from(self.config).expect("Failed to build valid settings from builder")
    }
}

/// Builder for `HostRecord`.
pub struct HostRecordBuilder {
    host: HostRecord,
}

impl HostRecordBuilder {
    pub fn new(name: &str, hostname: &str) -> Self {
        Self {
            host: HostRecord::new(name, hostname),
        }
    }

    pub fn username(mut self, username: &str) -> Self {
        self.host.username = Some(username.to_string());
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.host.password = Some(password.to_string());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.host.port = Some(port);
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.host.groups.push(group.to_string());
        self
    }

    pub fn variable(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.host.variables.insert(key.to_string(), value.into());
        self
    }

    pub fn variables(mut self, vars: BTreeMap<String, serde_yaml::Value>) -> Self {
        self.host.variables.extend(vars);
        self
    }

    pub fn build(self) -> HostRecord {
        self.host
    }
}
