use chrono::{DateTime, Utc};
use prep_core::model::{ProblemStatus, ProgressRecord};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let id = Uuid::parse_str(&id).map_err(ser)?;

    let status: String = row.try_get("status").map_err(ser)?;
    let status = ProblemStatus::parse(&status).map_err(ser)?;

    let completed_at: Option<DateTime<Utc>> = row.try_get("completed_at").map_err(ser)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(ser)?;

    Ok(ProgressRecord {
        id,
        problem_id: row.try_get("problem_id").map_err(ser)?,
        company: row.try_get("company").map_err(ser)?,
        difficulty: row.try_get("difficulty").map_err(ser)?,
        title: row.try_get("title").map_err(ser)?,
        status,
        completed_at,
        created_at,
        updated_at,
    })
}
