use ensayo_core::model::{
    Answer, Attempt, AttemptId, AttemptResult, AttemptStatus, Difficulty, Exam, ExamId, Question,
    QuestionId, UserId,
};
use sqlx::Row;
use uuid::Uuid;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn uuid_from_text(field: &'static str, raw: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(raw).map_err(|_| StorageError::Serialization(format!("invalid {field}: {raw}")))
}

pub(crate) fn exam_id_from_text(raw: &str) -> Result<ExamId, StorageError> {
    Ok(ExamId::new(uuid_from_text("exam_id", raw)?))
}

pub(crate) fn question_id_from_text(raw: &str) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(uuid_from_text("question_id", raw)?))
}

pub(crate) fn attempt_id_from_text(raw: &str) -> Result<AttemptId, StorageError> {
    Ok(AttemptId::new(uuid_from_text("attempt_id", raw)?))
}

pub(crate) fn user_id_from_text(raw: &str) -> Result<UserId, StorageError> {
    Ok(UserId::new(uuid_from_text("user_id", raw)?))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_exam_row(row: &sqlx::sqlite::SqliteRow) -> Result<Exam, StorageError> {
    let id = exam_id_from_text(&row.try_get::<String, _>("id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let duration_minutes = u32_from_i64(
        "duration_minutes",
        row.try_get::<i64, _>("duration_minutes").map_err(ser)?,
    )?;
    let created_at = row.try_get("created_at").map_err(ser)?;

    Exam::from_persisted(id, title, duration_minutes, created_at).map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = question_id_from_text(&row.try_get::<String, _>("id").map_err(ser)?)?;

    let difficulty_raw: String = row.try_get("difficulty").map_err(ser)?;
    let difficulty: Difficulty = difficulty_raw.parse().map_err(ser)?;

    let distractors_raw: String = row.try_get("distractors").map_err(ser)?;
    let distractors: Vec<String> = serde_json::from_str(&distractors_raw).map_err(ser)?;

    Question::from_persisted(
        id,
        row.try_get("content").map_err(ser)?,
        row.try_get("image_url").map_err(ser)?,
        difficulty,
        row.try_get("correct_answer").map_err(ser)?,
        distractors,
        row.try_get("explanation").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn distractors_to_json(distractors: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(distractors).map_err(ser)
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<Attempt, StorageError> {
    let id = attempt_id_from_text(&row.try_get::<String, _>("id").map_err(ser)?)?;
    let user_id = user_id_from_text(&row.try_get::<String, _>("user_id").map_err(ser)?)?;
    let exam_id = exam_id_from_text(&row.try_get::<String, _>("exam_id").map_err(ser)?)?;

    let status_raw: String = row.try_get("status").map_err(ser)?;
    let status: AttemptStatus = status_raw.parse().map_err(ser)?;

    let score_total: Option<i64> = row.try_get("score_total").map_err(ser)?;
    let correct_count: Option<i64> = row.try_get("correct_count").map_err(ser)?;
    let incorrect_count: Option<i64> = row.try_get("incorrect_count").map_err(ser)?;
    let omitted_count: Option<i64> = row.try_get("omitted_count").map_err(ser)?;

    let result = match (score_total, correct_count, incorrect_count, omitted_count) {
        (None, None, None, None) => None,
        (Some(score), Some(correct), Some(incorrect), Some(omitted)) => Some(AttemptResult {
            score: u32_from_i64("score_total", score)?,
            correct: u32_from_i64("correct_count", correct)?,
            incorrect: u32_from_i64("incorrect_count", incorrect)?,
            omitted: u32_from_i64("omitted_count", omitted)?,
        }),
        _ => {
            return Err(StorageError::Serialization(
                "attempt row has partial score columns".into(),
            ));
        }
    };

    Attempt::from_persisted(
        id,
        user_id,
        exam_id,
        status,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("finished_at").map_err(ser)?,
        result,
    )
    .map_err(ser)
}

pub(crate) fn map_answer_row(row: &sqlx::sqlite::SqliteRow) -> Result<Answer, StorageError> {
    let question_id = question_id_from_text(&row.try_get::<String, _>("question_id").map_err(ser)?)?;
    let selected: Option<String> = row.try_get("selected_option").map_err(ser)?;
    let is_correct: i64 = row.try_get("is_correct").map_err(ser)?;

    Ok(Answer::from_persisted(question_id, selected, is_correct != 0))
}
