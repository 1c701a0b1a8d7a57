#![allow(dead_code)]

pub use playbook_agent_test_utils::builders;
pub use playbook_agent_test_utils::fake_launcher;
pub use playbook_agent_test_utils::{init_tracing, wait_for_run, with_timeout};

use std::path::Path;
use std::sync::Arc;

use playbook_agent::config::Settings;
use playbook_agent::exec::{PlaybookRunner, ProcessLauncher};
use playbook_agent::inventory::InventoryService;

use self::builders::SettingsBuilder;

/// Settings rooted at `root` with every data directory created and an empty
/// inventory file in place.
pub fn prepared_settings(root: &Path) -> Settings {
    let settings = SettingsBuilder::new(root).build();
    settings.ensure_dirs().expect("create data dirs");
    InventoryService::open(settings.inventory_path()).expect("create inventory");
    settings
}

/// Write a playbook file under the playbooks directory and return its path.
pub fn write_playbook(settings: &Settings, name: &str) -> std::path::PathBuf {
    let path = settings.playbooks_path().join(name);
    std::fs::write(&path, "- hosts: all\n  tasks: []\n").expect("write playbook");
    path
}

pub fn runner_with(settings: &Settings, launcher: Arc<dyn ProcessLauncher>) -> PlaybookRunner {
    PlaybookRunner::with_launcher(settings, launcher)
}
