// src/inventory/mod.rs

//! Host inventory persisted as an Ansible YAML file.
//!
//! - [`model`] holds the host record and the on-disk document layout.
//! - [`service`] provides thread-safe CRUD that rewrites the file on every
//!   mutation.

pub mod model;
pub mod service;

pub use model::{HostRecord, InventoryDocument, InventorySnapshot};
pub use service::InventoryService;
