// src/inventory/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Host variables that map onto [`HostRecord`] fields rather than free-form
/// variables.
pub const ANSIBLE_HOST: &str = "ansible_host";
pub const ANSIBLE_USER: &str = "ansible_user";
pub const ANSIBLE_PASSWORD: &str = "ansible_password";
pub const ANSIBLE_PORT: &str = "ansible_port";

const CONNECTION_KEYS: [&str; 4] = [ANSIBLE_HOST, ANSIBLE_USER, ANSIBLE_PASSWORD, ANSIBLE_PORT];

/// A single inventory host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Logical inventory name, unique across the inventory.
    pub name: String,
    /// Reachable address (IP or DNS).
    pub hostname: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub groups: Vec<String>,
    /// Additional host variables (e.g. `ansible_become`).
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
}

impl HostRecord {
    pub fn new(name: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            name: normalise_name(&name.into()),
            hostname: hostname.into(),
            username: None,
            password: None,
            port: None,
            groups: Vec::new(),
            variables: BTreeMap::new(),
        }
    }

    /// Apply the naming rules Ansible expects (no surrounding or inner spaces).
    pub fn normalised(mut self) -> Self {
        self.name = normalise_name(&self.name);
        self
    }

    /// Host vars mapping as written under `all.hosts.<name>`.
    pub fn to_ansible_mapping(&self) -> BTreeMap<String, Value> {
        let mut mapping = BTreeMap::new();
        mapping.insert(ANSIBLE_HOST.to_string(), Value::from(self.hostname.clone()));
        if let Some(user) = self.username.as_deref().filter(|u| !u.is_empty()) {
            mapping.insert(ANSIBLE_USER.to_string(), Value::from(user));
        }
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            mapping.insert(ANSIBLE_PASSWORD.to_string(), Value::from(password));
        }
        if let Some(port) = self.port {
            mapping.insert(ANSIBLE_PORT.to_string(), Value::from(port));
        }
        for (key, value) in &self.variables {
            mapping.insert(key.clone(), value.clone());
        }
        mapping
    }

    /// Rebuild a host from its `all.hosts.<name>` mapping. Groups are filled
    /// in separately from `all.children`.
    pub fn from_ansible_mapping(name: &str, vars: BTreeMap<String, Value>) -> Self {
        let hostname = vars
            .get(ANSIBLE_HOST)
            .and_then(scalar_to_string)
            .unwrap_or_else(|| name.to_string());
        let username = vars.get(ANSIBLE_USER).and_then(scalar_to_string);
        let password = vars.get(ANSIBLE_PASSWORD).and_then(scalar_to_string);
        let port = vars
            .get(ANSIBLE_PORT)
            .and_then(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .and_then(|p| u16::try_from(p).ok());

        let variables = vars
            .into_iter()
            .filter(|(key, _)| !CONNECTION_KEYS.contains(&key.as_str()))
            .collect();

        Self {
            name: name.to_string(),
            hostname,
            username,
            password,
            port,
            groups: Vec::new(),
            variables,
        }
    }
}

pub fn normalise_name(name: &str) -> String {
    name.trim().replace(' ', "-")
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Full in-memory inventory: hosts by name plus group membership.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventorySnapshot {
    pub hosts: BTreeMap<String, HostRecord>,
    pub groups: BTreeMap<String, Vec<String>>,
}

impl InventorySnapshot {
    /// Render into the on-disk Ansible document.
    pub fn to_document(&self) -> InventoryDocument {
        let hosts = self
            .hosts
            .iter()
            .map(|(name, host)| (name.clone(), Some(host.to_ansible_mapping())))
            .collect();

        let children = self
            .groups
            .iter()
            .map(|(group, members)| {
                let section = GroupSection {
                    hosts: members
                        .iter()
                        .map(|member| (member.clone(), Some(BTreeMap::new())))
                        .collect(),
                };
                (group.clone(), Some(section))
            })
            .collect();

        InventoryDocument {
            all: AllSection { hosts, children },
        }
    }

    /// Rebuild from the on-disk document.
    ///
    /// Group memberships naming unknown hosts are kept in `groups` but do not
    /// create hosts.
    pub fn from_document(doc: InventoryDocument) -> Self {
        let mut hosts: BTreeMap<String, HostRecord> = doc
            .all
            .hosts
            .into_iter()
            .map(|(name, vars)| {
                let host = HostRecord::from_ansible_mapping(&name, vars.unwrap_or_default());
                (name, host)
            })
            .collect();

        let mut groups = BTreeMap::new();
        for (group, section) in doc.all.children {
            let members: Vec<String> = section
                .map(|s| s.hosts.into_keys().collect())
                .unwrap_or_default();
            for member in &members {
                if let Some(host) = hosts.get_mut(member) {
                    host.groups.push(group.clone());
                }
            }
            groups.insert(group, members);
        }

        Self { hosts, groups }
    }
}

/// Top level of an Ansible YAML inventory (`all:`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryDocument {
    #[serde(default)]
    pub all: AllSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllSection {
    #[serde(default)]
    pub hosts: BTreeMap<String, Option<BTreeMap<String, Value>>>,
    #[serde(default)]
    pub children: BTreeMap<String, Option<GroupSection>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupSection {
    #[serde(default)]
    pub hosts: BTreeMap<String, Option<BTreeMap<String, Value>>>,
}
