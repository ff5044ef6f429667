use std::fmt;

use chrono::{DateTime, Utc};
use ensayo_core::model::{
    AnswerLedger, AttemptId, AttemptResult, Exam, Question, QuestionId,
};
use ensayo_core::scoring::Tally;

use super::progress::SessionProgress;
use crate::error::SessionError;

/// In-memory state machine for one attempt at one exam.
///
/// Holds the ordered question set fixed at start, the current position, the
/// one-second countdown, and the answer ledger. Nothing here touches storage;
/// `ExamFlowService` owns the durable side and is the only finalizer.
///
/// Once the outcome is recorded the session is terminal: answer capture,
/// navigation, and ticks become no-ops, and the outcome never changes.
pub struct ExamSession {
    attempt_id: AttemptId,
    exam: Exam,
    questions: Vec<Question>,
    position: usize,
    remaining_seconds: u32,
    ledger: AnswerLedger,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    outcome: Option<AttemptResult>,
}

impl ExamSession {
    /// Create a session over an already-loaded question set.
    ///
    /// The countdown starts at the exam's full duration and the position at
    /// the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyExam` if no questions are provided.
    pub fn new(
        attempt_id: AttemptId,
        exam: Exam,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyExam);
        }

        let remaining_seconds = exam.duration_seconds();
        Ok(Self {
            attempt_id,
            exam,
            questions,
            position: 0,
            remaining_seconds,
            ledger: AnswerLedger::new(),
            started_at,
            finished_at: None,
            outcome: None,
        })
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    /// The fixed question sequence, in presentation order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The question at the current position.
    ///
    /// Always valid: the question set is non-empty and the position clamped.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.position]
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// The graded outcome, once finalize has run.
    #[must_use]
    pub fn outcome(&self) -> Option<&AttemptResult> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.ledger.is_answered(question_id)
    }

    /// The ledger's current selection for a question, if any.
    #[must_use]
    pub fn selection(&self, question_id: QuestionId) -> Option<&str> {
        self.ledger.selection(question_id)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.ledger.answered_count()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_questions(),
            answered: self.answered_count(),
            position: self.position,
            remaining_seconds: self.remaining_seconds,
            is_complete: self.is_complete(),
        }
    }

    /// Record (or replace) the learner's selection for a question.
    ///
    /// Selections are buffered in the ledger until finalize; nothing is
    /// persisted here. A no-op once the session is terminal.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidQuestion` for an identifier outside the
    /// session's question set.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        option: impl Into<String>,
    ) -> Result<(), SessionError> {
        if self.is_complete() {
            return Ok(());
        }
        if !self.questions.iter().any(|q| q.id() == question_id) {
            return Err(SessionError::InvalidQuestion(question_id));
        }

        self.ledger.select(question_id, option);
        Ok(())
    }

    /// Move to the next question; a no-op on the last one.
    pub fn next(&mut self) {
        if self.is_complete() {
            return;
        }
        self.position = (self.position + 1).min(self.questions.len() - 1);
    }

    /// Move to the previous question; a no-op on the first one.
    pub fn previous(&mut self) {
        if self.is_complete() {
            return;
        }
        self.position = self.position.saturating_sub(1);
    }

    /// Jump directly to a question index, clamped into range.
    pub fn jump_to(&mut self, index: usize) {
        if self.is_complete() {
            return;
        }
        self.position = index.min(self.questions.len() - 1);
    }

    /// Consume one second of the countdown.
    ///
    /// Returns true exactly once, on the tick that reaches zero; the caller
    /// must finalize then. Ticks while terminal or already at zero do
    /// nothing, so the countdown never goes negative and finalize cannot
    /// re-trigger.
    pub fn tick(&mut self) -> bool {
        if self.is_complete() || self.remaining_seconds == 0 {
            return false;
        }
        self.remaining_seconds -= 1;
        self.remaining_seconds == 0
    }

    /// Grade the current ledger state in memory.
    pub(crate) fn grade(&self) -> AttemptResult {
        Tally::count(&self.questions, &self.ledger).into_result()
    }

    /// Transition to the terminal state, recording the graded outcome.
    pub(crate) fn complete(&mut self, result: AttemptResult, finished_at: DateTime<Utc>) {
        self.outcome = Some(result);
        self.finished_at = Some(finished_at);
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("attempt_id", &self.attempt_id)
            .field("exam_id", &self.exam.id())
            .field("questions_len", &self.questions.len())
            .field("position", &self.position)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("answered", &self.ledger.answered_count())
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
