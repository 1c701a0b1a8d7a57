// src/storage.rs

//! Sandbox-rooted file access.
//!
//! Every caller-supplied path is resolved against a fixed root and rejected
//! if it would land outside of it. Resolution is lexical (`..` is folded
//! without touching the disk) and then re-checked against the canonical form
//! of its deepest existing ancestor, so no symlink along the way can lead
//! out of the root.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{AgentError, Result};
use crate::fs::{FileSystem, RealFileSystem};

#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FileStorage {
    /// Storage rooted at `base_dir` on the real filesystem.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_fs(base_dir, Arc::new(RealFileSystem))
    }

    /// Storage rooted at `base_dir` on an arbitrary filesystem.
    ///
    /// The root is created if missing and then canonicalized.
    pub fn with_fs(base_dir: impl AsRef<Path>, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs.create_dir_all(base_dir)?;
        let base_dir = fs.canonicalize(base_dir)?;
        Ok(Self { base_dir, fs })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a user-provided path under the storage root.
    pub fn resolve_path(&self, relative_path: &str) -> Result<PathBuf> {
        let candidate = normalize_lexically(&self.base_dir.join(relative_path));
        if candidate == self.base_dir || !candidate.starts_with(&self.base_dir) {
            return Err(AgentError::PathEscape(relative_path.to_string()));
        }

        let real = self.canonical_target(&candidate)?;
        if !real.starts_with(&self.base_dir) {
            return Err(AgentError::PathEscape(relative_path.to_string()));
        }

        Ok(candidate)
    }

    /// Canonicalize the deepest existing ancestor of `candidate` and re-append
    /// the components that do not exist yet.
    ///
    /// `candidate` is already lexically under the root, which exists, so the
    /// walk always stops at or below it.
    fn canonical_target(&self, candidate: &Path) -> Result<PathBuf> {
        let mut existing = candidate;
        let mut missing = Vec::new();
        while !self.fs.exists(existing) {
            match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name);
                    existing = parent;
                }
                _ => break,
            }
        }

        let mut real = self.fs.canonicalize(existing)?;
        for name in missing.into_iter().rev() {
            real.push(name);
        }
        Ok(real)
    }

    /// Write `content` to `relative_path`, creating parent directories.
    pub fn write_text(&self, relative_path: &str, content: &str) -> Result<PathBuf> {
        let target = self.resolve_path(relative_path)?;
        self.fs.write(&target, content.as_bytes())?;
        debug!(path = %target.display(), bytes = content.len(), "wrote file");
        Ok(target)
    }

    pub fn read_text(&self, relative_path: &str) -> Result<String> {
        let target = self.resolve_path(relative_path)?;
        Ok(self.fs.read_to_string(&target)?)
    }
}

/// Fold `.` and `..` components without consulting the filesystem.
///
/// `..` at the root stays at the root, as the OS does.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
