// src/exec/registry.rs

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::errors::{AgentError, Result};
use crate::exec::record::RunRecord;
use crate::types::RunId;

/// All runs known to this process, in creation order.
///
/// Records are never evicted. Lock order is registry first, then record;
/// nothing here is called with a record lock held.
#[derive(Debug, Default)]
pub struct RunRegistry {
    runs: Mutex<IndexMap<RunId, Arc<RunRecord>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record.
    ///
    /// With `max_active > 0`, refuses when that many registered runs are not
    /// yet terminal. The check and the insert happen under one lock.
    pub fn insert(&self, record: Arc<RunRecord>, max_active: usize) -> Result<()> {
        let mut runs = self.runs.lock();
        if max_active > 0 {
            let active = runs
                .values()
                .filter(|run| !run.status().is_terminal())
                .count();
            if active >= max_active {
                return Err(AgentError::CapacityExceeded(max_active));
            }
        }
        runs.insert(record.id(), record);
        Ok(())
    }

    pub fn get(&self, id: &RunId) -> Option<Arc<RunRecord>> {
        self.runs.lock().get(id).cloned()
    }

    pub fn list(&self) -> Vec<Arc<RunRecord>> {
        self.runs.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.runs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs not yet in a terminal state.
    pub fn active_count(&self) -> usize {
        self.list()
            .iter()
            .filter(|run| !run.status().is_terminal())
            .count()
    }
}
