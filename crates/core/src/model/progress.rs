use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur when parsing progress values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseStatusError {
    #[error("invalid status value: {0}")]
    Invalid(String),
}

/// A user's progress marker for a single problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProblemStatus {
    /// Wire representation, matching the persisted form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Parses the wire representation.
    ///
    /// # Errors
    ///
    /// Returns `ParseStatusError::Invalid` for anything else.
    pub fn parse(raw: &str) -> Result<Self, ParseStatusError> {
        match raw {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(ParseStatusError::Invalid(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── PROGRESS RECORD ──────────────────────────────────────────────────────────
//

/// Fields supplied by the caller when marking a problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressDraft {
    pub problem_id: String,
    pub company: String,
    pub difficulty: String,
    pub title: String,
    pub status: ProblemStatus,
}

/// A persisted progress record.
///
/// The store keeps at most one record per key, enforced by upsert-on-write:
/// (user, problem) in the service-backed form, (company, problem) in the
/// local fallback. Records are never deleted by the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: Uuid,
    pub problem_id: String,
    pub company: String,
    pub difficulty: String,
    pub title: String,
    pub status: ProblemStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Creates a fresh record from a draft.
    ///
    /// `completed_at` is set iff the initial status is `Completed`.
    #[must_use]
    pub fn create(draft: ProgressDraft, now: DateTime<Utc>) -> Self {
        let completed_at = (draft.status == ProblemStatus::Completed).then_some(now);
        Self {
            id: Uuid::new_v4(),
            problem_id: draft.problem_id,
            company: draft.company,
            difficulty: draft.difficulty,
            title: draft.title,
            status: draft.status,
            completed_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a status change in place, preserving identity and `created_at`.
    ///
    /// `completed_at` is set to `now` iff the new status is `Completed` and
    /// cleared otherwise.
    pub fn apply_status(&mut self, status: ProblemStatus, now: DateTime<Utc>) {
        self.status = status;
        self.completed_at = (status == ProblemStatus::Completed).then_some(now);
        self.updated_at = now;
    }
}

//
// ─── STATUS COUNTS ────────────────────────────────────────────────────────────
//

/// Aggregate status counts for a company's progress records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub not_started: u32,
    pub in_progress: u32,
    pub completed: u32,
}

impl StatusCounts {
    /// Tallies one record's status.
    pub fn record(&mut self, status: ProblemStatus) {
        match status {
            ProblemStatus::NotStarted => self.not_started += 1,
            ProblemStatus::InProgress => self.in_progress += 1,
            ProblemStatus::Completed => self.completed += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.not_started + self.in_progress + self.completed
    }

    /// Completion percentage over all tracked records; 0 when empty.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            f64::from(self.completed) / f64::from(total) * 100.0
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
