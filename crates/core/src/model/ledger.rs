use std::collections::HashMap;

use crate::model::ids::QuestionId;

/// In-memory buffer of the learner's current selections for one attempt.
///
/// At most one entry per question; re-selecting overwrites. Nothing here is
/// persisted; the ledger is drained into graded answer records at finalize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerLedger {
    selections: HashMap<QuestionId, String>,
}

impl AnswerLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the selection for a question.
    pub fn select(&mut self, question_id: QuestionId, option: impl Into<String>) {
        self.selections.insert(question_id, option.into());
    }

    /// The current selection for a question, if any.
    #[must_use]
    pub fn selection(&self, question_id: QuestionId) -> Option<&str> {
        self.selections.get(&question_id).map(String::as_str)
    }

    #[must_use]
    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.selections.contains_key(&question_id)
    }

    /// Number of questions with a recorded selection.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reselect_overwrites_prior_entry() {
        let mut ledger = AnswerLedger::new();
        let q = QuestionId::generate();

        ledger.select(q, "A");
        ledger.select(q, "B");

        assert_eq!(ledger.answered_count(), 1);
        assert_eq!(ledger.selection(q), Some("B"));
    }

    #[test]
    fn unanswered_question_has_no_entry() {
        let ledger = AnswerLedger::new();
        let q = QuestionId::generate();

        assert!(!ledger.is_answered(q));
        assert_eq!(ledger.selection(q), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn counts_distinct_questions() {
        let mut ledger = AnswerLedger::new();
        ledger.select(QuestionId::generate(), "A");
        ledger.select(QuestionId::generate(), "B");
        assert_eq!(ledger.answered_count(), 2);
    }
}
