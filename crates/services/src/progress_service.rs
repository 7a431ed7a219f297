use std::collections::HashMap;
use std::sync::Arc;

use prep_core::Clock;
use prep_core::model::{ProblemStatus, ProgressDraft, ProgressRecord, StatusCounts};
use storage::repository::ProgressRepository;

use crate::error::ProgressServiceError;
use crate::events::ProgressEvents;

/// Orchestrates progress reads and writes for a single user session.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    events: ProgressEvents,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>, events: ProgressEvents) -> Self {
        Self {
            clock,
            progress,
            events,
        }
    }

    /// Upserts a status change and, on success, publishes a progress-changed
    /// event. A failed write publishes nothing, leaving subscribers on the
    /// prior state.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the write fails.
    pub async fn set_status(
        &self,
        user_id: &str,
        draft: ProgressDraft,
    ) -> Result<ProgressRecord, ProgressServiceError> {
        let record = self
            .progress
            .upsert_progress(user_id, draft, self.clock.now())
            .await?;
        self.events.notify();
        Ok(record)
    }

    /// All of a user's records, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the read fails.
    pub async fn list(&self, user_id: &str) -> Result<Vec<ProgressRecord>, ProgressServiceError> {
        Ok(self.progress.list_progress(user_id).await?)
    }

    /// A user's records for one company, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the read fails.
    pub async fn for_company(
        &self,
        user_id: &str,
        company: &str,
    ) -> Result<Vec<ProgressRecord>, ProgressServiceError> {
        Ok(self.progress.list_company_progress(user_id, company).await?)
    }

    /// Title → status lookup for the filter pipeline. Problems without a
    /// record are simply absent; callers default them to `NotStarted`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the read fails.
    pub async fn status_index(
        &self,
        user_id: &str,
        company: &str,
    ) -> Result<HashMap<String, ProblemStatus>, ProgressServiceError> {
        let records = self.for_company(user_id, company).await?;
        Ok(records
            .into_iter()
            .map(|record| (record.problem_id, record.status))
            .collect())
    }

    /// Aggregate status counts over a company's tracked records.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the read fails.
    pub async fn company_stats(
        &self,
        user_id: &str,
        company: &str,
    ) -> Result<StatusCounts, ProgressServiceError> {
        let records = self.for_company(user_id, company).await?;
        let mut counts = StatusCounts::default();
        for record in &records {
            counts.record(record.status);
        }
        Ok(counts)
    }
}
