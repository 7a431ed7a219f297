//! Local fallback progress store.
//!
//! When no backing service is available, progress lives in a flat JSON list
//! in a single file. Upsert semantics match the repository contract but the
//! key is (company, problem); there is no user in the local form. Writes
//! are read-modify-write over the whole list; a single writer is assumed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prep_core::model::{ProgressDraft, ProgressRecord};

use crate::repository::{ProgressRepository, StorageError};

#[derive(Debug)]
pub struct LocalProgressStore {
    path: PathBuf,
    records: Mutex<Vec<ProgressRecord>>,
}

impl LocalProgressStore {
    /// Opens the store, loading existing records.
    ///
    /// A missing file starts an empty store; it is created on first write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when the file exists but does
    /// not parse, and `StorageError::Connection` for other I/O failures.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(StorageError::Connection(err.to_string())),
        };
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in the store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn all(&self) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    /// Records for one company.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn for_company(&self, company: &str) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|record| record.company == company)
            .cloned()
            .collect())
    }

    /// Create-or-update keyed by (company, problem), then persist the list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be written; the in-memory
    /// state is rolled back so a failed write leaves prior state unchanged.
    pub fn upsert(
        &self,
        draft: ProgressDraft,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let previous = guard.clone();
        let existing = guard
            .iter_mut()
            .find(|record| record.company == draft.company && record.problem_id == draft.problem_id);

        let record = match existing {
            Some(record) => {
                record.apply_status(draft.status, now);
                record.clone()
            }
            None => {
                let record = ProgressRecord::create(draft, now);
                guard.push(record.clone());
                record
            }
        };

        if let Err(err) = self.save(&guard) {
            *guard = previous;
            return Err(err);
        }
        Ok(record)
    }

    fn save(&self, records: &[ProgressRecord]) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Connection(e.to_string()))?;
        }
        fs::write(&self.path, raw).map_err(|e| StorageError::Connection(e.to_string()))
    }
}

/// The local form has no user: the `user_id` parameter is ignored and the
/// upsert key is (company, problem), so it can stand in for the
/// service-backed repository when no backing service is available.
#[async_trait]
impl ProgressRepository for LocalProgressStore {
    async fn list_progress(&self, _user_id: &str) -> Result<Vec<ProgressRecord>, StorageError> {
        let mut records = self.all()?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn list_company_progress(
        &self,
        _user_id: &str,
        company: &str,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let mut records = self.for_company(company)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn upsert_progress(
        &self,
        _user_id: &str,
        draft: ProgressDraft,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError> {
        self.upsert(draft, now)
    }
}
