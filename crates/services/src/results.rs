//! Scored-result review for a completed attempt.

use std::collections::HashMap;
use std::sync::Arc;

use ensayo_core::model::{Answer, Attempt, AttemptId, AttemptResult, Question, QuestionId};
use storage::repository::{AnswerRepository, AttemptRepository, ExamCatalog, StorageError};

use crate::error::SessionError;

/// One reviewed question: the persisted answer record joined with its catalog
/// question, when the catalog still has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub answer: Answer,
    pub question: Option<Question>,
}

/// Everything the results screen needs for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReview {
    pub attempt: Attempt,
    pub entries: Vec<ReviewEntry>,
}

impl AttemptReview {
    /// The graded counts and score, present once the attempt completed.
    #[must_use]
    pub fn result(&self) -> Option<&AttemptResult> {
        self.attempt.result()
    }
}

/// Loads a persisted attempt with its answer trail for display.
#[derive(Clone)]
pub struct ResultsService {
    catalog: Arc<dyn ExamCatalog>,
    attempts: Arc<dyn AttemptRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl ResultsService {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn ExamCatalog>,
        attempts: Arc<dyn AttemptRepository>,
        answers: Arc<dyn AnswerRepository>,
    ) -> Self {
        Self {
            catalog,
            attempts,
            answers,
        }
    }

    /// Load the review for an attempt.
    ///
    /// Answer records whose question has since left the catalog keep their
    /// stored selection and correctness flag, with no question attached.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AttemptNotFound` for an unknown attempt and
    /// `SessionError::Storage` for storage failures.
    pub async fn load(&self, attempt_id: AttemptId) -> Result<AttemptReview, SessionError> {
        let attempt = match self.attempts.get_attempt(attempt_id).await {
            Ok(attempt) => attempt,
            Err(StorageError::NotFound) => return Err(SessionError::AttemptNotFound),
            Err(e) => return Err(e.into()),
        };

        let answers = self.answers.list_answers(attempt_id).await?;

        let ids: Vec<QuestionId> = answers.iter().map(Answer::question_id).collect();
        let questions = self.catalog.get_questions(&ids).await?;
        let mut by_id: HashMap<QuestionId, Question> =
            questions.into_iter().map(|q| (q.id(), q)).collect();

        let entries = answers
            .into_iter()
            .map(|answer| {
                let question = by_id.remove(&answer.question_id());
                ReviewEntry { answer, question }
            })
            .collect();

        Ok(AttemptReview { attempt, entries })
    }
}
