use ensayo_core::model::{Exam, ExamId, Question, QuestionId};

use super::SqliteRepository;
use super::mapping::{distractors_to_json, map_exam_row, map_question_row, question_id_from_text, ser};
use crate::repository::{ExamCatalog, StorageError};
use sqlx::Row;

#[async_trait::async_trait]
impl ExamCatalog for SqliteRepository {
    async fn upsert_exam(&self, exam: &Exam) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO exams (id, title, duration_minutes, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                duration_minutes = excluded.duration_minutes
            ",
        )
        .bind(exam.id().value().to_string())
        .bind(exam.title())
        .bind(i64::from(exam.duration_minutes()))
        .bind(exam.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let distractors = distractors_to_json(question.distractors())?;

        sqlx::query(
            r"
            INSERT INTO questions (id, content, image_url, difficulty, correct_answer, distractors, explanation)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                content = excluded.content,
                image_url = excluded.image_url,
                difficulty = excluded.difficulty,
                correct_answer = excluded.correct_answer,
                distractors = excluded.distractors,
                explanation = excluded.explanation
            ",
        )
        .bind(question.id().value().to_string())
        .bind(question.content())
        .bind(question.image_url())
        .bind(question.difficulty().as_str())
        .bind(question.correct_answer())
        .bind(distractors)
        .bind(question.explanation())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn set_exam_questions(
        &self,
        exam_id: ExamId,
        question_ids: &[QuestionId],
    ) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM exam_questions WHERE exam_id = ?1")
            .bind(exam_id.value().to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for (position, question_id) in question_ids.iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?;
            sqlx::query(
                r"
                INSERT INTO exam_questions (exam_id, question_id, position)
                VALUES (?1, ?2, ?3)
                ",
            )
            .bind(exam_id.value().to_string())
            .bind(question_id.value().to_string())
            .bind(position)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_exam(&self, id: ExamId) -> Result<Exam, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, duration_minutes, created_at
            FROM exams WHERE id = ?1
            ",
        )
        .bind(id.value().to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_exam_row(&row)
    }

    async fn get_question_ids(&self, exam_id: ExamId) -> Result<Vec<QuestionId>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT question_id
            FROM exam_questions
            WHERE exam_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(exam_id.value().to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(question_id_from_text(
                &row.try_get::<String, _>("question_id").map_err(ser)?,
            )?);
        }
        Ok(ids)
    }

    async fn get_questions(&self, ids: &[QuestionId]) -> Result<Vec<Question>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r"
            SELECT id, content, image_url, difficulty, correct_answer, distractors, explanation
            FROM questions
            WHERE id IN (
            ",
        );
        for i in 0..ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 1).to_string());
        }
        sql.push(')');

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id.value().to_string());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }
}
