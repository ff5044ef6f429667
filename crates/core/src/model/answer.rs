use crate::model::ids::QuestionId;
use crate::model::question::Question;

/// Immutable graded answer record for one question of one attempt.
///
/// Produced at finalize from the ledger entry (or its absence) and persisted
/// as the attempt's answer trail. `None` means the learner omitted the
/// question, which is never correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    question_id: QuestionId,
    selected: Option<String>,
    is_correct: bool,
}

impl Answer {
    /// Grade a selection against the question's correct answer.
    #[must_use]
    pub fn graded(question: &Question, selected: Option<String>) -> Self {
        let is_correct = selected
            .as_deref()
            .is_some_and(|choice| question.is_correct_choice(choice));
        Self {
            question_id: question.id(),
            selected,
            is_correct,
        }
    }

    /// Rehydrate an answer record from persisted storage.
    ///
    /// The correctness flag was derived at finalize time; it is trusted as-is
    /// so reviews do not depend on the catalog still holding the question.
    #[must_use]
    pub fn from_persisted(
        question_id: QuestionId,
        selected: Option<String>,
        is_correct: bool,
    ) -> Self {
        Self {
            question_id,
            selected,
            is_correct,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    /// Whether the learner left this question unanswered.
    #[must_use]
    pub fn is_omitted(&self) -> bool {
        self.selected.is_none()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
