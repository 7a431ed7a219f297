use chrono::{DateTime, Utc};
use prep_core::model::{ProgressDraft, ProgressRecord};

use super::{SqliteRepository, mapping::map_progress_row};
use crate::repository::{ProgressRepository, StorageError};

const SELECT_COLUMNS: &str = r"
    id, user_id, problem_id, company, difficulty, title,
    status, completed_at, created_at, updated_at
";

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn list_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StorageError> {
        let sql = format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM progress
            WHERE user_id = ?1
            ORDER BY created_at DESC
            "
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(map_progress_row(&row)?);
        }
        Ok(records)
    }

    async fn list_company_progress(
        &self,
        user_id: &str,
        company: &str,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let sql = format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM progress
            WHERE user_id = ?1 AND company = ?2
            ORDER BY created_at DESC
            "
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(company)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(map_progress_row(&row)?);
        }
        Ok(records)
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        draft: ProgressDraft,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError> {
        // Fresh identity for the insert path; the conflict clause keeps the
        // original id and created_at on update.
        let fresh = ProgressRecord::create(draft, now);

        sqlx::query(
            r"
            INSERT INTO progress (
                id, user_id, problem_id, company, difficulty, title,
                status, completed_at, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(user_id, problem_id) DO UPDATE SET
                status = excluded.status,
                completed_at = excluded.completed_at,
                updated_at = excluded.updated_at
            ",
        )
        .bind(fresh.id.to_string())
        .bind(user_id)
        .bind(&fresh.problem_id)
        .bind(&fresh.company)
        .bind(&fresh.difficulty)
        .bind(&fresh.title)
        .bind(fresh.status.as_str())
        .bind(fresh.completed_at)
        .bind(fresh.created_at)
        .bind(fresh.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let sql = format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM progress
            WHERE user_id = ?1 AND problem_id = ?2
            "
        );
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(&fresh.problem_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;

        map_progress_row(&row)
    }
}
