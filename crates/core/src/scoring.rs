//! Pure grading: partition a question set against the ledger and map the
//! correctness ratio onto the 0–1000 reporting scale.

use crate::model::{AnswerLedger, AttemptResult, Question};

/// Disjoint outcome counts for one attempt.
///
/// `correct + incorrect + omitted` always equals the number of questions the
/// tally was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub correct: u32,
    pub incorrect: u32,
    pub omitted: u32,
}

impl Tally {
    /// Partition every question into correct / incorrect / omitted based on
    /// the ledger's current selections.
    #[must_use]
    pub fn count(questions: &[Question], ledger: &AnswerLedger) -> Self {
        let mut correct = 0_u32;
        let mut incorrect = 0_u32;
        let mut omitted = 0_u32;

        for question in questions {
            match ledger.selection(question.id()) {
                None => omitted += 1,
                Some(choice) if question.is_correct_choice(choice) => correct += 1,
                Some(_) => incorrect += 1,
            }
        }

        Self {
            correct,
            incorrect,
            omitted,
        }
    }

    /// Total number of questions tallied.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.correct + self.incorrect + self.omitted
    }

    /// Grade the tally into a persistable result.
    ///
    /// Requires a non-empty tally; an exam with zero questions never reaches
    /// scoring (rejected at session start).
    #[must_use]
    pub fn into_result(self) -> AttemptResult {
        AttemptResult {
            score: scaled_score(self.correct, self.total()),
            correct: self.correct,
            incorrect: self.incorrect,
            omitted: self.omitted,
        }
    }
}

/// Map a raw correct count onto the 100–1000 reporting scale.
///
/// `round(500 + (correct / total * 100 - 50) * 10)`: 50% sits at 500 and each
/// percentage point is worth 10 points, so 0% -> 0 and 100% -> 1000. The
/// result is not clamped. Ties round half away from zero (`f64::round`).
///
/// `total` must be positive; this is guarded upstream by the empty-exam check
/// at session start.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scaled_score(correct: u32, total: u32) -> u32 {
    debug_assert!(total > 0, "scoring requires at least one question");
    debug_assert!(correct <= total, "correct count cannot exceed total");

    let percentage = f64::from(correct) / f64::from(total) * 100.0;
    (500.0 + (percentage - 50.0) * 10.0).round() as u32
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, QuestionId};

    fn build_question(correct: &str) -> Question {
        Question::new(
            QuestionId::generate(),
            "Q",
            None,
            Difficulty::Medium,
            correct,
            vec!["X".into(), "Y".into()],
            "",
        )
        .unwrap()
    }

    #[test]
    fn score_endpoints_and_midpoint() {
        for n in [1, 4, 7, 80] {
            assert_eq!(scaled_score(0, n), 0);
            assert_eq!(scaled_score(n, n), 1000);
        }
        for n in [2, 4, 10, 80] {
            assert_eq!(scaled_score(n / 2, n), 500);
        }
    }

    #[test]
    fn score_one_of_four_is_250() {
        assert_eq!(scaled_score(1, 4), 250);
    }

    #[test]
    fn score_ties_round_half_away_from_zero() {
        // 1/16 = 6.25% -> 500 + (6.25 - 50) * 10 = 62.5
        assert_eq!(scaled_score(1, 16), 63);
        // 3/16 = 18.75% -> 187.5
        assert_eq!(scaled_score(3, 16), 188);
    }

    #[test]
    fn score_is_deterministic() {
        assert_eq!(scaled_score(13, 17), scaled_score(13, 17));
    }

    #[test]
    fn tally_partitions_mixed_ledger() {
        let questions = vec![
            build_question("A"),
            build_question("A"),
            build_question("A"),
            build_question("A"),
        ];
        let mut ledger = AnswerLedger::new();
        ledger.select(questions[0].id(), "A");
        ledger.select(questions[1].id(), "B");

        let tally = Tally::count(&questions, &ledger);
        assert_eq!(tally.correct, 1);
        assert_eq!(tally.incorrect, 1);
        assert_eq!(tally.omitted, 2);
        assert_eq!(tally.total(), 4);

        let result = tally.into_result();
        assert_eq!(result.score, 250);
    }

    #[test]
    fn tally_of_empty_ledger_is_all_omitted() {
        let questions = vec![build_question("A"), build_question("A")];
        let ledger = AnswerLedger::new();

        let tally = Tally::count(&questions, &ledger);
        assert_eq!(tally.correct, 0);
        assert_eq!(tally.incorrect, 0);
        assert_eq!(tally.omitted, 2);
        assert_eq!(tally.total(), questions.len() as u32);
    }

    #[test]
    fn tally_of_fully_answered_ledger_has_no_omissions() {
        let questions = vec![build_question("A"), build_question("A")];
        let mut ledger = AnswerLedger::new();
        for q in &questions {
            ledger.select(q.id(), "A");
        }

        let tally = Tally::count(&questions, &ledger);
        assert_eq!(tally.omitted, 0);
        assert_eq!(tally.total(), 2);
        assert_eq!(tally.into_result().score, 1000);
    }

    #[test]
    fn ledger_selections_ignore_foreign_questions() {
        let questions = vec![build_question("A")];
        let mut ledger = AnswerLedger::new();
        ledger.select(QuestionId::generate(), "A");

        let tally = Tally::count(&questions, &ledger);
        assert_eq!(tally.omitted, 1);
        assert_eq!(tally.total(), 1);
    }
}
