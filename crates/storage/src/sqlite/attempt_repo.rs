use chrono::{DateTime, Utc};
use ensayo_core::model::{Attempt, AttemptId, AttemptResult, AttemptStatus, ExamId, UserId};

use super::SqliteRepository;
use super::mapping::map_attempt_row;
use crate::repository::{AttemptRepository, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn create_attempt(
        &self,
        user_id: UserId,
        exam_id: ExamId,
        started_at: DateTime<Utc>,
    ) -> Result<Attempt, StorageError> {
        let attempt = Attempt::new(AttemptId::generate(), user_id, exam_id, started_at);

        sqlx::query(
            r"
            INSERT INTO exam_attempts (id, user_id, exam_id, status, started_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(attempt.id().value().to_string())
        .bind(attempt.user_id().value().to_string())
        .bind(attempt.exam_id().value().to_string())
        .bind(attempt.status().as_str())
        .bind(attempt.started_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(attempt)
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Attempt, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, exam_id, status, started_at, finished_at,
                   score_total, correct_count, incorrect_count, omitted_count
            FROM exam_attempts WHERE id = ?1
            ",
        )
        .bind(id.value().to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_attempt_row(&row)
    }

    async fn complete_attempt(
        &self,
        id: AttemptId,
        result: &AttemptResult,
        finished_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE exam_attempts
            SET status = ?1,
                finished_at = ?2,
                score_total = ?3,
                correct_count = ?4,
                incorrect_count = ?5,
                omitted_count = ?6
            WHERE id = ?7 AND status = ?8
            ",
        )
        .bind(AttemptStatus::Completed.as_str())
        .bind(finished_at)
        .bind(i64::from(result.score))
        .bind(i64::from(result.correct))
        .bind(i64::from(result.incorrect))
        .bind(i64::from(result.omitted))
        .bind(id.value().to_string())
        .bind(AttemptStatus::InProgress.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            // Distinguish a missing attempt from a repeated transition.
            let existing = sqlx::query("SELECT status FROM exam_attempts WHERE id = ?1")
                .bind(id.value().to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            return match existing {
                Some(_) => Err(StorageError::Conflict),
                None => Err(StorageError::NotFound),
            };
        }

        Ok(())
    }
}
