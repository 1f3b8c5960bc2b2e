use async_trait::async_trait;
use form_core::model::{FormId, ResponseSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for restartable response snapshots, one per form.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Persist or replace the snapshot for `snapshot.form_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(&self, snapshot: &ResponseSnapshot) -> Result<(), StorageError>;

    /// Fetch the snapshot for a form, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for connection or decoding failures.
    async fn load_snapshot(&self, form_id: &FormId)
    -> Result<Option<ResponseSnapshot>, StorageError>;

    /// Remove the snapshot for a form. Missing snapshots are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear_snapshot(&self, form_id: &FormId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshots: Arc<Mutex<HashMap<FormId, ResponseSnapshot>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn save_snapshot(&self, snapshot: &ResponseSnapshot) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(snapshot.form_id.clone(), snapshot.clone());
        Ok(())
    }

    async fn load_snapshot(
        &self,
        form_id: &FormId,
    ) -> Result<Option<ResponseSnapshot>, StorageError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(form_id).cloned())
    }

    async fn clear_snapshot(&self, form_id: &FormId) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(form_id);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(InMemoryRepository::new());
        Self { snapshots }
    }
}
