// src/inventory/service.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::errors::{AgentError, Result};
use crate::fs::{FileSystem, RealFileSystem};

use super::model::{normalise_name, HostRecord, InventoryDocument, InventorySnapshot};

/// Inventory CRUD backed by an Ansible YAML file.
///
/// Every mutation rewrites the whole file while holding the lock, so the file
/// always reflects the latest in-memory snapshot.
#[derive(Debug)]
pub struct InventoryService {
    inventory_path: PathBuf,
    fs: Arc<dyn FileSystem>,
    snapshot: Mutex<InventorySnapshot>,
}

impl InventoryService {
    /// Open (or create) the inventory at `inventory_path` on the real filesystem.
    pub fn open(inventory_path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_fs(inventory_path, Arc::new(RealFileSystem))
    }

    pub fn open_with_fs(inventory_path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let inventory_path = inventory_path.into();
        if let Some(parent) = inventory_path.parent() {
            fs.create_dir_all(parent)?;
        }

        let service = Self {
            inventory_path,
            fs,
            snapshot: Mutex::new(InventorySnapshot::default()),
        };
        service.load()?;
        Ok(service)
    }

    pub fn inventory_path(&self) -> &Path {
        &self.inventory_path
    }

    fn load(&self) -> Result<()> {
        let mut snapshot = self.snapshot.lock();

        if !self.fs.exists(&self.inventory_path) {
            info!(path = %self.inventory_path.display(), "creating empty inventory");
            return self.persist(&snapshot);
        }

        let contents = self.fs.read_to_string(&self.inventory_path)?;
        let doc: InventoryDocument = if contents.trim().is_empty() {
            InventoryDocument::default()
        } else {
            serde_yaml::from_str::<Option<InventoryDocument>>(&contents)?.unwrap_or_default()
        };

        *snapshot = InventorySnapshot::from_document(doc);
        debug!(
            path = %self.inventory_path.display(),
            hosts = snapshot.hosts.len(),
            groups = snapshot.groups.len(),
            "loaded inventory"
        );
        Ok(())
    }

    fn persist(&self, snapshot: &InventorySnapshot) -> Result<()> {
        let rendered = serde_yaml::to_string(&snapshot.to_document())?;
        self.fs.write(&self.inventory_path, rendered.as_bytes())?;
        Ok(())
    }

    pub fn list_hosts(&self) -> Vec<HostRecord> {
        self.snapshot.lock().hosts.values().cloned().collect()
    }

    pub fn get_host(&self, name: &str) -> Option<HostRecord> {
        self.snapshot.lock().hosts.get(name).cloned()
    }

    /// Group name → member host names.
    pub fn groups(&self) -> Vec<(String, Vec<String>)> {
        self.snapshot
            .lock()
            .groups
            .iter()
            .map(|(g, m)| (g.clone(), m.clone()))
            .collect()
    }

    /// Insert or replace a host (keyed by its normalized name).
    pub fn upsert_host(&self, record: HostRecord) -> Result<HostRecord> {
        let record = record.normalised();
        if record.name.is_empty() {
            return Err(AgentError::ConfigError("host name must not be empty".to_string()));
        }

        let mut snapshot = self.snapshot.lock();
        snapshot.hosts.insert(record.name.clone(), record.clone());
        update_group_membership(&mut snapshot, &record);
        self.persist(&snapshot)?;

        info!(host = %record.name, groups = ?record.groups, "upserted host");
        Ok(record)
    }

    /// Remove a host. Returns `false` (and leaves the file untouched) when no
    /// such host exists.
    pub fn delete_host(&self, name: &str) -> Result<bool> {
        let mut snapshot = self.snapshot.lock();
        if snapshot.hosts.remove(name).is_none() {
            return Ok(false);
        }
        for members in snapshot.groups.values_mut() {
            members.retain(|m| m != name);
        }
        self.persist(&snapshot)?;

        info!(host = %name, "deleted host");
        Ok(true)
    }

    pub fn rename_host(&self, old_name: &str, new_name: &str) -> Result<HostRecord> {
        let new_name = normalise_name(new_name);
        let mut snapshot = self.snapshot.lock();

        if old_name != new_name && snapshot.hosts.contains_key(&new_name) {
            return Err(AgentError::HostConflict(new_name));
        }
        let mut record = snapshot
            .hosts
            .remove(old_name)
            .ok_or_else(|| AgentError::HostNotFound(old_name.to_string()))?;

        record.name = new_name.clone();
        snapshot.hosts.insert(new_name.clone(), record.clone());
        for members in snapshot.groups.values_mut() {
            for member in members.iter_mut() {
                if member == old_name {
                    *member = new_name.clone();
                }
            }
        }
        self.persist(&snapshot)?;

        info!(from = %old_name, to = %new_name, "renamed host");
        Ok(record)
    }

    pub fn set_groups(&self, name: &str, groups: Vec<String>) -> Result<HostRecord> {
        let mut snapshot = self.snapshot.lock();
        let record = {
            let host = snapshot
                .hosts
                .get_mut(name)
                .ok_or_else(|| AgentError::HostNotFound(name.to_string()))?;
            host.groups = groups;
            host.clone()
        };
        update_group_membership(&mut snapshot, &record);
        self.persist(&snapshot)?;
        Ok(record)
    }

    /// Drop every host and group.
    pub fn reset(&self) -> Result<()> {
        let mut snapshot = self.snapshot.lock();
        *snapshot = InventorySnapshot::default();
        self.persist(&snapshot)
    }
}

/// Make `groups` agree with `host.groups`: leave groups the host no longer
/// lists, join the ones it does.
fn update_group_membership(snapshot: &mut InventorySnapshot, host: &HostRecord) {
    for (group, members) in snapshot.groups.iter_mut() {
        if !host.groups.contains(group) {
            members.retain(|m| m != &host.name);
        }
    }
    for group in &host.groups {
        let members = snapshot.groups.entry(group.clone()).or_default();
        if !members.contains(&host.name) {
            members.push(host.name.clone());
        }
    }
}
