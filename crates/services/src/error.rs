//! Shared error types for the services crate.

use thiserror::Error;

use ensayo_core::model::QuestionId;
use storage::repository::StorageError;

/// Errors emitted by the exam session services.
///
/// Start-time failures abort session creation and are surfaced verbatim.
/// During finalize only the attempt-record write propagates (as `Storage`);
/// the computed result is recorded on the session first, so the learner keeps
/// their score even when that write fails.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("exam not found")]
    ExamNotFound,

    #[error("attempt not found")]
    AttemptNotFound,

    #[error("exam has no questions")]
    EmptyExam,

    #[error("catalog returned {loaded} of {expected} questions")]
    DataIntegrity { expected: usize, loaded: usize },

    #[error("question {0} is not part of this exam")]
    InvalidQuestion(QuestionId),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
