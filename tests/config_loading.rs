// tests/config_loading.rs

use std::io::Write;

use tempfile::{NamedTempFile, TempDir};

use playbook_agent::config::{load_and_validate, load_from_path, validate_config, RawConfigFile};
use playbook_agent::errors::AgentError;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn empty_file_uses_defaults() {
    let file = write_config("");
    let raw = load_from_path(file.path()).unwrap();

    assert_eq!(raw.server.host, "0.0.0.0");
    assert_eq!(raw.server.port, 8000);
    assert_eq!(raw.paths.inventory_filename, "inventory.yml");
    assert_eq!(raw.execution.ansible_playbook_binary, "ansible-playbook");
    assert_eq!(raw.execution.max_active_runs, 0);
}

#[test]
fn relative_data_dir_is_resolved_against_project_root() {
    let root = TempDir::new().unwrap();
    let file = write_config(&format!(
        r#"
[server]
host = "127.0.0.1"
port = 9100

[paths]
project_root = "{}"
data_dir = "state"
inventory_filename = "hosts.yml"

[execution]
ansible_playbook_binary = "/usr/local/bin/ansible-playbook"
max_active_runs = 4
"#,
        root.path().display()
    ));

    let settings = load_and_validate(file.path()).unwrap();

    assert_eq!(settings.bind_addr(), "127.0.0.1:9100");
    assert_eq!(settings.data_dir, root.path().join("state"));
    assert_eq!(
        settings.inventory_path(),
        root.path().join("state").join("inventory").join("hosts.yml")
    );
    assert_eq!(settings.playbooks_path(), root.path().join("state").join("playbooks"));
    assert_eq!(settings.documents_path(), root.path().join("state").join("documents"));
    assert_eq!(settings.executions_path(), root.path().join("state").join("executions"));
    assert_eq!(settings.ansible_playbook_binary, "/usr/local/bin/ansible-playbook");
    assert_eq!(settings.max_active_runs, 4);
}

#[test]
fn absolute_data_dir_is_kept() {
    let root = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    let file = write_config(&format!(
        "[paths]\nproject_root = \"{}\"\ndata_dir = \"{}\"\n",
        root.path().display(),
        data.path().display()
    ));

    let settings = load_and_validate(file.path()).unwrap();
    assert_eq!(settings.data_dir, data.path());
}

#[test]
fn ensure_dirs_creates_every_directory() {
    let root = TempDir::new().unwrap();
    let file = write_config(&format!("[paths]\nproject_root = \"{}\"\n", root.path().display()));
    let settings = load_and_validate(file.path()).unwrap();

    settings.ensure_dirs().unwrap();

    assert!(settings.inventory_path().parent().unwrap().is_dir());
    assert!(settings.playbooks_path().is_dir());
    assert!(settings.documents_path().is_dir());
    assert!(settings.executions_path().is_dir());
}

#[test]
fn port_zero_is_rejected() {
    let file = write_config("[server]\nport = 0\n");
    match load_and_validate(file.path()) {
        Err(AgentError::ConfigError(msg)) => assert!(msg.contains("port")),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn inventory_filename_with_separator_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.paths.inventory_filename = "../inventory.yml".to_string();

    match validate_config(&raw) {
        Err(AgentError::ConfigError(msg)) => assert!(msg.contains("inventory_filename")),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn empty_binary_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.execution.ansible_playbook_binary = "   ".to_string();

    assert!(matches!(validate_config(&raw), Err(AgentError::ConfigError(_))));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = write_config("[server\nport = 1");
    assert!(matches!(load_and_validate(file.path()), Err(AgentError::TomlError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let result = load_and_validate(dir.path().join("nope.toml"));
    assert!(matches!(result, Err(AgentError::IoError(_))));
}

#[test]
fn server_overrides_are_validated() {
    let dir = TempDir::new().unwrap();
    let file = write_config(&format!("[paths]\nproject_root = \"{}\"\n", dir.path().display()));
    let mut settings = load_and_validate(file.path()).unwrap();

    settings
        .apply_server_overrides(Some(" 127.0.0.1 ".to_string()), Some(9001))
        .unwrap();
    assert_eq!(settings.bind_addr(), "127.0.0.1:9001");

    assert!(matches!(
        settings.apply_server_overrides(None, Some(0)),
        Err(AgentError::ConfigError(_))
    ));
    assert!(matches!(
        settings.apply_server_overrides(Some("   ".to_string()), None),
        Err(AgentError::ConfigError(_))
    ));
    assert_eq!(settings.bind_addr(), "127.0.0.1:9001");

    settings.apply_server_overrides(None, None).unwrap();
    assert_eq!(settings.bind_addr(), "127.0.0.1:9001");
}

#[test]
fn binary_and_inventory_filename_are_stored_trimmed() {
    let dir = TempDir::new().unwrap();
    let file = write_config(&format!(
        r#"
[paths]
project_root = "{}"
inventory_filename = "  hosts.yml "

[execution]
ansible_playbook_binary = " ansible-playbook  "
"#,
        dir.path().display()
    ));

    let settings = load_and_validate(file.path()).unwrap();

    assert_eq!(settings.ansible_playbook_binary, "ansible-playbook");
    assert_eq!(
        settings.inventory_path().file_name().and_then(|n| n.to_str()),
        Some("hosts.yml")
    );
}
