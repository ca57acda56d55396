//! State store implementations.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::state::{AlertState, LoadOutcome};

/// Durable storage for the single alert record.
///
/// One writer (the orchestrator) and any number of readers.
pub trait StateStore: Send + Sync + fmt::Debug {
    /// Reads the current record.
    fn load(&self) -> LoadOutcome;

    /// Replaces the current record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the record cannot be written.
    fn save(&self, state: &AlertState) -> StoreResult<()>;
}

/// A pretty-printed JSON file replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Creates a store backed by `path`. Nothing is touched until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the record path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_failed(&self, err: impl fmt::Display) -> StoreError {
        StoreError::WriteFailed {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> LoadOutcome {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return LoadOutcome::Empty,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "state record unreadable");
                return LoadOutcome::Corrupt(err.to_string());
            }
        };

        match serde_json::from_str::<AlertState>(&contents) {
            Ok(state) => LoadOutcome::Loaded(state),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "state record corrupt");
                LoadOutcome::Corrupt(err.to_string())
            }
        }
    }

    fn save(&self, state: &AlertState) -> StoreResult<()> {
        let mut json = serde_json::to_vec_pretty(state)?;
        json.push(b'\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.write_failed(e))?;

        // The temp file must share a filesystem with the record for rename to be atomic.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.write_failed(e))?;
        tmp.write_all(&json).map_err(|e| self.write_failed(e))?;
        tmp.as_file().sync_all().map_err(|e| self.write_failed(e))?;
        tmp.persist(&self.path).map_err(|e| self.write_failed(e.error))?;

        debug!(path = %self.path.display(), severity = %state.severity, "state record saved");
        Ok(())
    }
}

/// An in-process store, for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slot: RwLock<Option<MemorySlot>>,
}

#[derive(Debug, Clone)]
enum MemorySlot {
    State(AlertState),
    Corrupt(String),
}

impl MemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `state`.
    #[must_use]
    pub fn with_state(state: AlertState) -> Self {
        Self {
            slot: RwLock::new(Some(MemorySlot::State(state))),
        }
    }

    /// Creates a store whose record reads back as corrupt until overwritten.
    #[must_use]
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(MemorySlot::Corrupt(reason.into()))),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> LoadOutcome {
        match self.slot.read().clone() {
            None => LoadOutcome::Empty,
            Some(MemorySlot::Corrupt(reason)) => LoadOutcome::Corrupt(reason),
            Some(MemorySlot::State(state)) => LoadOutcome::Loaded(state),
        }
    }

    fn save(&self, state: &AlertState) -> StoreResult<()> {
        *self.slot.write() = Some(MemorySlot::State(state.clone()));
        Ok(())
    }
}
