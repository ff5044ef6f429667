use std::collections::HashMap;
use std::sync::Arc;

use ensayo_core::model::{Answer, AttemptResult, ExamId, Question, QuestionId, UserId};
use storage::repository::{AnswerRepository, AttemptRepository, ExamCatalog, StorageError};

use super::session::ExamSession;
use crate::Clock;
use crate::error::SessionError;

/// Orchestrates one attempt from start to graded, persisted finish.
///
/// Owns the clock and the storage collaborators; the session itself stays a
/// pure state machine. The one-second timer lives with the caller; it calls
/// `tick` once per elapsed second, and this service turns the zero crossing
/// into the automatic finalize.
#[derive(Clone)]
pub struct ExamFlowService {
    clock: Clock,
    catalog: Arc<dyn ExamCatalog>,
    attempts: Arc<dyn AttemptRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl ExamFlowService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<dyn ExamCatalog>,
        attempts: Arc<dyn AttemptRepository>,
        answers: Arc<dyn AnswerRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            attempts,
            answers,
        }
    }

    /// Open a new attempt against the catalog.
    ///
    /// Creates the durable attempt record, loads the exam's ordered question
    /// set, and returns an initialized session with a full countdown. A
    /// session abandoned after this point leaves the attempt `InProgress` in
    /// storage; reconciliation is an external concern.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ExamNotFound` for an unknown exam,
    /// `SessionError::EmptyExam` when no questions are linked,
    /// `SessionError::DataIntegrity` when the catalog resolves fewer
    /// questions than it listed, and `SessionError::Storage` when the attempt
    /// record cannot be created.
    pub async fn start(
        &self,
        exam_id: ExamId,
        user_id: UserId,
    ) -> Result<ExamSession, SessionError> {
        let now = self.clock.now();

        let exam = match self.catalog.get_exam(exam_id).await {
            Ok(exam) => exam,
            Err(StorageError::NotFound) => return Err(SessionError::ExamNotFound),
            Err(e) => return Err(e.into()),
        };

        // Without this record no session can be tracked, so failure is fatal
        // and not retried here.
        let attempt = self.attempts.create_attempt(user_id, exam_id, now).await?;

        let question_ids = self.catalog.get_question_ids(exam_id).await?;
        if question_ids.is_empty() {
            return Err(SessionError::EmptyExam);
        }

        let loaded = self.catalog.get_questions(&question_ids).await?;
        let mut by_id: HashMap<QuestionId, Question> =
            loaded.into_iter().map(|q| (q.id(), q)).collect();

        let mut questions = Vec::with_capacity(question_ids.len());
        for id in &question_ids {
            if let Some(question) = by_id.remove(id) {
                questions.push(question);
            }
        }
        if questions.len() != question_ids.len() {
            return Err(SessionError::DataIntegrity {
                expected: question_ids.len(),
                loaded: questions.len(),
            });
        }

        ExamSession::new(attempt.id(), exam, questions, now)
    }

    /// Deliver one elapsed second to the session.
    ///
    /// When this tick consumes the final second, `finish` runs and its
    /// outcome is returned. Terminal sessions ignore ticks.
    ///
    /// # Errors
    ///
    /// Propagates `finish` errors; see there.
    pub async fn tick(
        &self,
        session: &mut ExamSession,
    ) -> Result<Option<AttemptResult>, SessionError> {
        if session.tick() {
            return self.finish(session).await.map(Some);
        }
        Ok(None)
    }

    /// Grade the session and persist the result.
    ///
    /// Idempotent: a terminal session returns its recorded outcome without
    /// touching storage again. Otherwise, in order: one graded answer record
    /// per question is written (failures are logged and skipped; the answer
    /// trail is best-effort), the score is computed in memory, the attempt
    /// row transitions to completed, and the session goes terminal.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the attempt-record update fails.
    /// The session is terminal and its outcome readable even then; callers
    /// should warn that the result may not have been saved.
    pub async fn finish(&self, session: &mut ExamSession) -> Result<AttemptResult, SessionError> {
        if let Some(result) = session.outcome() {
            return Ok(*result);
        }

        let finished_at = self.clock.now();

        for question in session.questions() {
            let selected = session.selection(question.id()).map(ToString::to_string);
            let answer = Answer::graded(question, selected);
            if let Err(err) = self.answers.insert_answer(session.attempt_id(), &answer).await {
                tracing::warn!(
                    attempt_id = %session.attempt_id(),
                    question_id = %question.id(),
                    error = %err,
                    "failed to persist answer record"
                );
            }
        }

        let result = session.grade();
        let update = self
            .attempts
            .complete_attempt(session.attempt_id(), &result, finished_at)
            .await;
        session.complete(result, finished_at);
        update?;

        Ok(result)
    }
}
