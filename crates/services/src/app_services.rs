use std::path::PathBuf;
use std::sync::Arc;

use prep_core::Clock;
use storage::repository::Storage;

use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::events::ProgressEvents;
use crate::problem_service::ProblemService;
use crate::progress_service::ProgressService;
use crate::ui_state_service::UiStateService;

/// Assembles app-facing services over one storage backend and data directory.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    problems: Arc<ProblemService>,
    progress: Arc<ProgressService>,
    ui_state: Arc<UiStateService>,
    events: ProgressEvents,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        data_dir: PathBuf,
        snapshot_path: PathBuf,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, data_dir, snapshot_path, clock))
    }

    /// Build services over an already-constructed storage backend.
    #[must_use]
    pub fn with_storage(
        storage: Storage,
        data_dir: PathBuf,
        snapshot_path: PathBuf,
        clock: Clock,
    ) -> Self {
        let events = ProgressEvents::new();
        let catalog = Arc::new(CatalogService::new(
            data_dir.clone(),
            snapshot_path,
            clock,
        ));
        let problems = Arc::new(ProblemService::new(data_dir));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.progress),
            events.clone(),
        ));
        let ui_state = Arc::new(UiStateService::new(Arc::clone(&storage.ui_state)));

        Self {
            catalog,
            problems,
            progress,
            ui_state,
            events,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn problems(&self) -> Arc<ProblemService> {
        Arc::clone(&self.problems)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn ui_state(&self) -> Arc<UiStateService> {
        Arc::clone(&self.ui_state)
    }

    #[must_use]
    pub fn events(&self) -> ProgressEvents {
        self.events.clone()
    }
}
