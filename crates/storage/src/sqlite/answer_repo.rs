use ensayo_core::model::{Answer, AttemptId};

use super::SqliteRepository;
use super::mapping::map_answer_row;
use crate::repository::{AnswerRepository, StorageError};

#[async_trait::async_trait]
impl AnswerRepository for SqliteRepository {
    async fn insert_answer(
        &self,
        attempt_id: AttemptId,
        answer: &Answer,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_answers (attempt_id, question_id, selected_option, is_correct)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(attempt_id.value().to_string())
        .bind(answer.question_id().value().to_string())
        .bind(answer.selected())
        .bind(i64::from(answer.is_correct()))
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            _ => StorageError::Connection(e.to_string()),
        })?;

        Ok(())
    }

    async fn list_answers(&self, attempt_id: AttemptId) -> Result<Vec<Answer>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT question_id, selected_option, is_correct
            FROM user_answers
            WHERE attempt_id = ?1
            ORDER BY rowid ASC
            ",
        )
        .bind(attempt_id.value().to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut answers = Vec::with_capacity(rows.len());
        for row in rows {
            answers.push(map_answer_row(&row)?);
        }
        Ok(answers)
    }
}
