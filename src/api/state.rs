// src/api/state.rs

use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::errors::Result;
use crate::exec::{PlaybookRunner, ProcessLauncher, TokioLauncher};
use crate::inventory::InventoryService;
use crate::storage::FileStorage;

/// Services shared by every request handler.
///
/// Built once at startup and handed to the router; nothing here is global.
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub inventory: InventoryService,
    pub storage: FileStorage,
    pub runner: PlaybookRunner,
}

impl AppState {
    /// Create data directories and open every service with real process
    /// execution.
    pub fn new(settings: Settings) -> Result<Arc<Self>> {
        Self::with_launcher(settings, Arc::new(TokioLauncher))
    }

    pub fn with_launcher(settings: Settings, launcher: Arc<dyn ProcessLauncher>) -> Result<Arc<Self>> {
        settings.ensure_dirs()?;

        let inventory = InventoryService::open(settings.inventory_path())?;
        let storage = FileStorage::new(settings.playbooks_path())?;
        let runner = PlaybookRunner::with_launcher(&settings, launcher);

        info!(
            data_dir = %settings.data_dir.display(),
            inventory = %inventory.inventory_path().display(),
            playbooks = %storage.base_dir().display(),
            "application state ready"
        );

        Ok(Arc::new(Self {
            settings,
            inventory,
            storage,
            runner,
        }))
    }
}
