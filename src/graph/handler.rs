//! State handlers for the in-memory backend
//!
//! A handler owns the backend's state and runs each operation's
//! read-modify-write synchronously while holding its lock. Operations on a
//! `MemoryGraph` are not otherwise serialized, so this is what prevents lost
//! updates between concurrent callers in the same process.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use super::error::GraphResult;
use super::node::Node;
use super::relationship::Relationship;

/// Everything a `MemoryGraph` stores, keyed by string id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryState {
    #[serde(default)]
    pub nodes: IndexMap<String, Node>,
    #[serde(default)]
    pub relationships: IndexMap<String, Relationship>,
}

/// Synchronous owner of a `MemoryState`
pub trait StateHandler: Send + Sync + 'static {
    /// Run a read-only closure against the current state
    fn read<R>(&self, f: impl FnOnce(&MemoryState) -> GraphResult<R>) -> GraphResult<R>;

    /// Run a mutating closure. Closures must do any fallible checks before
    /// they mutate: `SharedState` applies changes in place, while
    /// `SnapshotFile` persists only on `Ok`.
    fn update<R>(&self, f: impl FnOnce(&mut MemoryState) -> GraphResult<R>) -> GraphResult<R>;
}

/// Process-local state behind a mutex
#[derive(Debug, Default)]
pub struct SharedState {
    state: Mutex<MemoryState>,
}

impl SharedState {
    pub fn new(state: MemoryState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl StateHandler for SharedState {
    fn read<R>(&self, f: impl FnOnce(&MemoryState) -> GraphResult<R>) -> GraphResult<R> {
        let guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn update<R>(&self, f: impl FnOnce(&mut MemoryState) -> GraphResult<R>) -> GraphResult<R> {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut *guard)
    }
}

/// State persisted as a single JSON snapshot file, re-read on every call
#[derive(Debug)]
pub struct SnapshotFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SnapshotFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        info!("Using memory snapshot file at: {:?}", path);
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> GraphResult<MemoryState> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(MemoryState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &MemoryState) -> GraphResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!("Saved snapshot with {} nodes, {} relationships", state.nodes.len(), state.relationships.len());
        Ok(())
    }
}

impl StateHandler for SnapshotFile {
    fn read<R>(&self, f: impl FnOnce(&MemoryState) -> GraphResult<R>) -> GraphResult<R> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let state = self.load()?;
        f(&state)
    }

    fn update<R>(&self, f: impl FnOnce(&mut MemoryState) -> GraphResult<R>) -> GraphResult<R> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut state = self.load()?;
        let result = f(&mut state)?;
        self.save(&state)?;
        Ok(result)
    }
}
