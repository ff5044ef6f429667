use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::ExamId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("exam title cannot be empty")]
    EmptyTitle,

    #[error("exam duration must be > 0 minutes")]
    InvalidDuration,
}

//
// ─── EXAM ──────────────────────────────────────────────────────────────────────
//

/// Read-only catalog metadata for one practice exam.
///
/// The ordered question set is stored separately; an `Exam` only carries what
/// the session controller needs to open an attempt and size the countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exam {
    id: ExamId,
    title: String,
    duration_minutes: u32,
    created_at: DateTime<Utc>,
}

impl Exam {
    /// Creates a new exam.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::EmptyTitle` if the title is blank and
    /// `ExamError::InvalidDuration` if the duration is zero.
    pub fn new(
        id: ExamId,
        title: impl Into<String>,
        duration_minutes: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ExamError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ExamError::EmptyTitle);
        }
        if duration_minutes == 0 {
            return Err(ExamError::InvalidDuration);
        }

        Ok(Self {
            id,
            title,
            duration_minutes,
            created_at,
        })
    }

    /// Rehydrate an exam from persisted storage.
    ///
    /// # Errors
    ///
    /// Re-runs the same validation as `new`; a row that fails it indicates
    /// catalog corruption.
    pub fn from_persisted(
        id: ExamId,
        title: String,
        duration_minutes: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ExamError> {
        Self::new(id, title, duration_minutes, created_at)
    }

    #[must_use]
    pub fn id(&self) -> ExamId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Countdown budget for a fresh attempt.
    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_minutes * 60
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
