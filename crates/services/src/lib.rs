#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod events;
pub mod problem_service;
pub mod progress_service;
pub mod sync;
pub mod ui_state_service;
pub mod validate;

pub use prep_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CatalogService, CompanyEntry, CompanySnapshot};
pub use error::{
    AppServicesError, ChangeDetectError, ProgressServiceError, SnapshotError,
    UiStateServiceError, ValidationRunError,
};
pub use events::{ProgressChanged, ProgressEvents};
pub use problem_service::{CompanyLoad, LoadTicket, ProblemService};
pub use progress_service::ProgressService;
pub use sync::ChangeReport;
pub use ui_state_service::UiStateService;
pub use validate::{ValidationReport, ValidationStats};
