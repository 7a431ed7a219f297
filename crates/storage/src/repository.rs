use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prep_core::model::{ProgressDraft, ProgressRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for per-user progress records.
///
/// The key is (user, problem): `upsert_progress` creates a record on first
/// write and updates it in place thereafter, so a key never yields more than
/// one record.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// All of a user's records, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be read.
    async fn list_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StorageError>;

    /// A user's records for one company, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be read.
    async fn list_company_progress(
        &self,
        user_id: &str,
        company: &str,
    ) -> Result<Vec<ProgressRecord>, StorageError>;

    /// Create-or-update keyed by (user, problem).
    ///
    /// On update, only `status`, `completed_at` and `updated_at` change;
    /// `completed_at` is set to `now` iff the status becomes completed and
    /// cleared otherwise. Returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; the stored state is then
    /// unchanged.
    async fn upsert_progress(
        &self,
        user_id: &str,
        draft: ProgressDraft,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError>;
}

/// Key-value contract for small pieces of persisted UI state
/// (selected company, selected timeframe).
#[async_trait]
pub trait UiStateRepository: Send + Sync {
    /// Fetch a value; `Ok(None)` when the key was never set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set or replace a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<Vec<(String, ProgressRecord)>>>,
    ui_state: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn list_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut records: Vec<ProgressRecord> = guard
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, record)| record.clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn list_company_progress(
        &self,
        user_id: &str,
        company: &str,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let records = self.list_progress(user_id).await?;
        Ok(records
            .into_iter()
            .filter(|record| record.company == company)
            .collect())
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        draft: ProgressDraft,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let existing = guard
            .iter_mut()
            .find(|(user, record)| user == user_id && record.problem_id == draft.problem_id);

        let record = match existing {
            Some((_, record)) => {
                record.apply_status(draft.status, now);
                record.clone()
            }
            None => {
                let record = ProgressRecord::create(draft, now);
                guard.push((user_id.to_string(), record.clone()));
                record
            }
        };

        Ok(record)
    }
}

#[async_trait]
impl UiStateRepository for InMemoryRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .ui_state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .ui_state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub ui_state: Arc<dyn UiStateRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let ui_state: Arc<dyn UiStateRepository> = Arc::new(repo);
        Self { progress, ui_state }
    }
}
