use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use prep_core::csv::parse_problems;
use prep_core::model::{CompanyProblems, Problem, Timeframe};

/// Identifies one load against the service's monotonically increasing
/// sequence, so callers can discard results superseded while in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Result of loading one company: the problem lists plus the ticket that
/// decides whether they are still current.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyLoad {
    pub ticket: LoadTicket,
    pub problems: CompanyProblems,
}

/// Loads per-timeframe problem files for a company.
///
/// The five timeframe files are fetched concurrently and joined before
/// returning. A missing or unreadable file degrades to an empty list for
/// that timeframe only; there are no retries.
#[derive(Clone)]
pub struct ProblemService {
    data_dir: PathBuf,
    seq: Arc<AtomicU64>,
}

impl ProblemService {
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Loads all five timeframe lists for `company`.
    ///
    /// Rapid successive calls race on the outside: a load that finishes
    /// after a newer one started must be dropped by the caller, checked via
    /// [`ProblemService::is_latest`].
    pub async fn load_company(&self, company: &str) -> CompanyLoad {
        let ticket = LoadTicket(self.seq.fetch_add(1, Ordering::SeqCst) + 1);

        let (thirty, three, six, beyond, all) = tokio::join!(
            self.load_timeframe(company, Timeframe::ThirtyDays),
            self.load_timeframe(company, Timeframe::ThreeMonths),
            self.load_timeframe(company, Timeframe::SixMonths),
            self.load_timeframe(company, Timeframe::MoreThanSixMonths),
            self.load_timeframe(company, Timeframe::All),
        );

        CompanyLoad {
            ticket,
            problems: CompanyProblems::new(company, [thirty, three, six, beyond, all]),
        }
    }

    /// Whether no newer load has been issued since this ticket was taken.
    #[must_use]
    pub fn is_latest(&self, ticket: LoadTicket) -> bool {
        self.seq.load(Ordering::SeqCst) == ticket.0
    }

    async fn load_timeframe(&self, company: &str, timeframe: Timeframe) -> Vec<Problem> {
        let path = self.data_dir.join(company).join(timeframe.file_name());
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => parse_problems(&text),
            Err(err) => {
                warn!(
                    company,
                    timeframe = %timeframe,
                    path = %path.display(),
                    error = %err,
                    "problem file unavailable, serving empty list"
                );
                Vec::new()
            }
        }
    }
}
