use std::sync::Arc;

use prep_core::model::Timeframe;
use storage::repository::UiStateRepository;

use crate::error::UiStateServiceError;

const SELECTED_COMPANY_KEY: &str = "selected_company";
const SELECTED_TIMEFRAME_KEY: &str = "selected_timeframe";

/// Persists the dashboard's selection state across sessions.
///
/// An explicit key-value interface injected into the components that need
/// it; nothing reads these keys ambiently.
#[derive(Clone)]
pub struct UiStateService {
    repo: Arc<dyn UiStateRepository>,
}

impl UiStateService {
    #[must_use]
    pub fn new(repo: Arc<dyn UiStateRepository>) -> Self {
        Self { repo }
    }

    /// Last selected company, if one was ever stored.
    ///
    /// # Errors
    ///
    /// Returns `UiStateServiceError::Storage` if the read fails.
    pub async fn selected_company(&self) -> Result<Option<String>, UiStateServiceError> {
        Ok(self.repo.get_value(SELECTED_COMPANY_KEY).await?)
    }

    /// Stores the selected company.
    ///
    /// # Errors
    ///
    /// Returns `UiStateServiceError::Storage` if the write fails.
    pub async fn set_selected_company(&self, company: &str) -> Result<(), UiStateServiceError> {
        Ok(self.repo.set_value(SELECTED_COMPANY_KEY, company).await?)
    }

    /// Last selected timeframe. A persisted label that no longer resolves
    /// reads as `None`, so stale values degrade to the default selection.
    ///
    /// # Errors
    ///
    /// Returns `UiStateServiceError::Storage` if the read fails.
    pub async fn selected_timeframe(&self) -> Result<Option<Timeframe>, UiStateServiceError> {
        let raw = self.repo.get_value(SELECTED_TIMEFRAME_KEY).await?;
        Ok(raw.as_deref().and_then(Timeframe::from_label))
    }

    /// Stores the selected timeframe by its display label.
    ///
    /// # Errors
    ///
    /// Returns `UiStateServiceError::Storage` if the write fails.
    pub async fn set_selected_timeframe(
        &self,
        timeframe: Timeframe,
    ) -> Result<(), UiStateServiceError> {
        Ok(self
            .repo
            .set_value(SELECTED_TIMEFRAME_KEY, timeframe.label())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::{InMemoryRepository, UiStateRepository as _};

    fn service() -> (UiStateService, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        (UiStateService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn selections_round_trip() {
        let (svc, _) = service();
        assert_eq!(svc.selected_company().await.unwrap(), None);
        assert_eq!(svc.selected_timeframe().await.unwrap(), None);

        svc.set_selected_company("Google").await.unwrap();
        svc.set_selected_timeframe(Timeframe::ThirtyDays).await.unwrap();

        assert_eq!(
            svc.selected_company().await.unwrap(),
            Some("Google".to_string())
        );
        assert_eq!(
            svc.selected_timeframe().await.unwrap(),
            Some(Timeframe::ThirtyDays)
        );
    }

    #[tokio::test]
    async fn unknown_persisted_timeframe_reads_as_none() {
        let (svc, repo) = service();
        repo.set_value("selected_timeframe", "Last Week").await.unwrap();

        assert_eq!(svc.selected_timeframe().await.unwrap(), None);
    }
}
