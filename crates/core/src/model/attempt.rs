use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{AttemptId, ExamId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("attempt is already completed")]
    AlreadyCompleted,

    #[error("finished_at is before started_at")]
    InvalidTimeRange,

    #[error("inconsistent persisted attempt: {0}")]
    InvalidPersistedState(String),
}

/// Error type for parsing an `AttemptStatus` from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    raw: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown attempt status: {}", self.raw)
    }
}

impl std::error::Error for ParseStatusError {}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle status of an attempt.
///
/// `InProgress` is the only entry state and `Completed` the only terminal one;
/// there is no path back. Abandoned attempts simply stay `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptStatus {
    InProgress,
    Completed,
}

impl AttemptStatus {
    /// Storage representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in_progress",
            AttemptStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttemptStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(AttemptStatus::InProgress),
            "completed" => Ok(AttemptStatus::Completed),
            other => Err(ParseStatusError {
                raw: other.to_string(),
            }),
        }
    }
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Graded outcome of a finished attempt.
///
/// The three counts partition the exam's question set, so they always sum to
/// the total question count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptResult {
    pub score: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub omitted: u32,
}

impl AttemptResult {
    /// Total number of questions the counts partition.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.correct + self.incorrect + self.omitted
    }

    /// Correct answers as a whole percentage, rounded half away from zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentage(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (f64::from(self.correct) / f64::from(total) * 100.0).round() as u32
    }
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One learner's run through one exam.
///
/// Created `InProgress` at session start; mutated exactly once, at finalize,
/// when the graded result and completion timestamp are recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    id: AttemptId,
    user_id: UserId,
    exam_id: ExamId,
    status: AttemptStatus,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    result: Option<AttemptResult>,
}

impl Attempt {
    /// Creates a fresh `InProgress` attempt.
    #[must_use]
    pub fn new(id: AttemptId, user_id: UserId, exam_id: ExamId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            exam_id,
            status: AttemptStatus::InProgress,
            started_at,
            finished_at: None,
            result: None,
        }
    }

    /// Rehydrate an attempt from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidPersistedState` when the status and the
    /// score columns disagree, and `AttemptError::InvalidTimeRange` when the
    /// completion timestamp precedes the start.
    pub fn from_persisted(
        id: AttemptId,
        user_id: UserId,
        exam_id: ExamId,
        status: AttemptStatus,
        started_at: DateTime<Utc>,
        finished_at: Option<DateTime<Utc>>,
        result: Option<AttemptResult>,
    ) -> Result<Self, AttemptError> {
        match status {
            AttemptStatus::InProgress => {
                if finished_at.is_some() || result.is_some() {
                    return Err(AttemptError::InvalidPersistedState(
                        "in-progress attempt carries completion data".into(),
                    ));
                }
            }
            AttemptStatus::Completed => {
                if finished_at.is_none() || result.is_none() {
                    return Err(AttemptError::InvalidPersistedState(
                        "completed attempt is missing completion data".into(),
                    ));
                }
            }
        }
        if let Some(finished) = finished_at {
            if finished < started_at {
                return Err(AttemptError::InvalidTimeRange);
            }
        }

        Ok(Self {
            id,
            user_id,
            exam_id,
            status,
            started_at,
            finished_at,
            result,
        })
    }

    /// Transition to `Completed`, recording the graded result.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::AlreadyCompleted` on a second transition and
    /// `AttemptError::InvalidTimeRange` if `finished_at` precedes the start.
    pub fn complete(
        &mut self,
        result: AttemptResult,
        finished_at: DateTime<Utc>,
    ) -> Result<(), AttemptError> {
        if self.status == AttemptStatus::Completed {
            return Err(AttemptError::AlreadyCompleted);
        }
        if finished_at < self.started_at {
            return Err(AttemptError::InvalidTimeRange);
        }

        self.status = AttemptStatus::Completed;
        self.finished_at = Some(finished_at);
        self.result = Some(result);
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn exam_id(&self) -> ExamId {
        self.exam_id
    }

    #[must_use]
    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn result(&self) -> Option<&AttemptResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == AttemptStatus::Completed
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
