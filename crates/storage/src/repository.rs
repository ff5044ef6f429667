use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ensayo_core::model::{
    Answer, Attempt, AttemptId, AttemptResult, Exam, ExamId, Question, QuestionId, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read access to the exam catalog, plus the primitives used to load it.
///
/// The session engine only reads; the upserts exist for seeding and tests.
#[async_trait]
pub trait ExamCatalog: Send + Sync {
    /// Persist or update an exam.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the exam cannot be stored.
    async fn upsert_exam(&self, exam: &Exam) -> Result<(), StorageError>;

    /// Persist or update a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Replace the ordered question list linked to an exam.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the link rows cannot be written.
    async fn set_exam_questions(
        &self,
        exam_id: ExamId,
        question_ids: &[QuestionId],
    ) -> Result<(), StorageError>;

    /// Fetch an exam by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_exam(&self, id: ExamId) -> Result<Exam, StorageError>;

    /// The exam's question identifiers in their fixed presentation order.
    ///
    /// An exam with no linked questions yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the link rows cannot be read.
    async fn get_question_ids(&self, exam_id: ExamId) -> Result<Vec<QuestionId>, StorageError>;

    /// Fetch full question records for the given identifiers.
    ///
    /// Identifiers the catalog cannot resolve are silently absent from the
    /// result; callers compare lengths to detect a shortfall.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for storage-level failures.
    async fn get_questions(&self, ids: &[QuestionId]) -> Result<Vec<Question>, StorageError>;
}

/// Durable record of attempts.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Mint and persist a fresh `InProgress` attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; the caller treats this as
    /// fatal since no session can be tracked without an attempt id.
    async fn create_attempt(
        &self,
        user_id: UserId,
        exam_id: ExamId,
        started_at: DateTime<Utc>,
    ) -> Result<Attempt, StorageError>;

    /// Fetch an attempt by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_attempt(&self, id: AttemptId) -> Result<Attempt, StorageError>;

    /// Record the single `InProgress` -> `Completed` transition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown attempt and
    /// `StorageError::Conflict` when the attempt is already completed.
    async fn complete_attempt(
        &self,
        id: AttemptId,
        result: &AttemptResult,
        finished_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// Immutable per-question answer trail for finished attempts.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Insert one graded answer record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` when the attempt already has a record
    /// for the same question.
    async fn insert_answer(
        &self,
        attempt_id: AttemptId,
        answer: &Answer,
    ) -> Result<(), StorageError>;

    /// All answer records for an attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the rows cannot be read.
    async fn list_answers(&self, attempt_id: AttemptId) -> Result<Vec<Answer>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    exams: Arc<Mutex<HashMap<ExamId, Exam>>>,
    questions: Arc<Mutex<HashMap<QuestionId, Question>>>,
    exam_questions: Arc<Mutex<HashMap<ExamId, Vec<QuestionId>>>>,
    attempts: Arc<Mutex<HashMap<AttemptId, Attempt>>>,
    answers: Arc<Mutex<HashMap<AttemptId, Vec<Answer>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExamCatalog for InMemoryRepository {
    async fn upsert_exam(&self, exam: &Exam) -> Result<(), StorageError> {
        let mut guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(exam.id(), exam.clone());
        Ok(())
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(question.id(), question.clone());
        Ok(())
    }

    async fn set_exam_questions(
        &self,
        exam_id: ExamId,
        question_ids: &[QuestionId],
    ) -> Result<(), StorageError> {
        let mut guard = self
            .exam_questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(exam_id, question_ids.to_vec());
        Ok(())
    }

    async fn get_exam(&self, id: ExamId) -> Result<Exam, StorageError> {
        let guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn get_question_ids(&self, exam_id: ExamId) -> Result<Vec<QuestionId>, StorageError> {
        let guard = self
            .exam_questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&exam_id).cloned().unwrap_or_default())
    }

    async fn get_questions(&self, ids: &[QuestionId]) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn create_attempt(
        &self,
        user_id: UserId,
        exam_id: ExamId,
        started_at: DateTime<Utc>,
    ) -> Result<Attempt, StorageError> {
        let attempt = Attempt::new(AttemptId::generate(), user_id, exam_id, started_at);
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(attempt.id(), attempt.clone());
        Ok(attempt)
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Attempt, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn complete_attempt(
        &self,
        id: AttemptId,
        result: &AttemptResult,
        finished_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let attempt = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        attempt
            .complete(*result, finished_at)
            .map_err(|_| StorageError::Conflict)
    }
}

#[async_trait]
impl AnswerRepository for InMemoryRepository {
    async fn insert_answer(
        &self,
        attempt_id: AttemptId,
        answer: &Answer,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .answers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let trail = guard.entry(attempt_id).or_default();
        if trail
            .iter()
            .any(|a| a.question_id() == answer.question_id())
        {
            return Err(StorageError::Conflict);
        }
        trail.push(answer.clone());
        Ok(())
    }

    async fn list_answers(&self, attempt_id: AttemptId) -> Result<Vec<Answer>, StorageError> {
        let guard = self
            .answers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&attempt_id).cloned().unwrap_or_default())
    }
}

/// Aggregates the collaborator handles behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn ExamCatalog>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub answers: Arc<dyn AnswerRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let catalog: Arc<dyn ExamCatalog> = Arc::new(repo.clone());
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo.clone());
        let answers: Arc<dyn AnswerRepository> = Arc::new(repo);
        Self {
            catalog,
            attempts,
            answers,
        }
    }
}
