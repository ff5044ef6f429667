use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question content cannot be empty")]
    EmptyContent,

    #[error("correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("invalid image url: {0}")]
    InvalidImageUrl(String),
}

/// Error type for parsing a `Difficulty` label from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDifficultyError {
    raw: String,
}

impl fmt::Display for ParseDifficultyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown difficulty label: {}", self.raw)
    }
}

impl std::error::Error for ParseDifficultyError {}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Catalog difficulty label for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Storage representation of the label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ParseDifficultyError {
                raw: other.to_string(),
            }),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Read-only catalog data for one multiple-choice question.
///
/// The catalog guarantees (not this type) that the correct answer is not also
/// listed among the distractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    content: String,
    image_url: Option<String>,
    difficulty: Difficulty,
    correct_answer: String,
    distractors: Vec<String>,
    explanation: String,
}

impl Question {
    /// Creates a new question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyContent` / `EmptyCorrectAnswer` for blank
    /// fields, and `QuestionError::InvalidImageUrl` if an image reference is
    /// present but does not parse as a URL.
    pub fn new(
        id: QuestionId,
        content: impl Into<String>,
        image_url: Option<String>,
        difficulty: Difficulty,
        correct_answer: impl Into<String>,
        distractors: Vec<String>,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(QuestionError::EmptyContent);
        }

        let correct_answer = correct_answer.into();
        if correct_answer.trim().is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }

        if let Some(raw) = &image_url {
            Url::parse(raw).map_err(|_| QuestionError::InvalidImageUrl(raw.clone()))?;
        }

        Ok(Self {
            id,
            content,
            image_url,
            difficulty,
            correct_answer,
            distractors,
            explanation: explanation.into(),
        })
    }

    /// Rehydrate a question from persisted storage.
    ///
    /// # Errors
    ///
    /// Same validation as `new`.
    pub fn from_persisted(
        id: QuestionId,
        content: String,
        image_url: Option<String>,
        difficulty: Difficulty,
        correct_answer: String,
        distractors: Vec<String>,
        explanation: String,
    ) -> Result<Self, QuestionError> {
        Self::new(
            id,
            content,
            image_url,
            difficulty,
            correct_answer,
            distractors,
            explanation,
        )
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn distractors(&self) -> &[String] {
        &self.distractors
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Whether the given selection matches the correct answer exactly.
    #[must_use]
    pub fn is_correct_choice(&self, selected: &str) -> bool {
        selected == self.correct_answer
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_question(image_url: Option<String>) -> Result<Question, QuestionError> {
        Question::new(
            QuestionId::generate(),
            "2 + 2 = ?",
            image_url,
            Difficulty::Easy,
            "4",
            vec!["3".into(), "5".into(), "22".into()],
            "Basic addition.",
        )
    }

    #[test]
    fn question_rejects_empty_content() {
        let err = Question::new(
            QuestionId::generate(),
            " ",
            None,
            Difficulty::Easy,
            "4",
            vec![],
            "",
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyContent);
    }

    #[test]
    fn question_rejects_malformed_image_url() {
        let err = build_question(Some("not a url".into())).unwrap_err();
        assert!(matches!(err, QuestionError::InvalidImageUrl(_)));
    }

    #[test]
    fn question_accepts_valid_image_url() {
        let q = build_question(Some("https://cdn.example.com/q/plot.png".into())).unwrap();
        assert_eq!(q.image_url(), Some("https://cdn.example.com/q/plot.png"));
    }

    #[test]
    fn correct_choice_is_exact_match() {
        let q = build_question(None).unwrap();
        assert!(q.is_correct_choice("4"));
        assert!(!q.is_correct_choice("3"));
        assert!(!q.is_correct_choice(" 4"));
    }

    #[test]
    fn difficulty_label_roundtrip() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(d.as_str().parse::<Difficulty>().unwrap(), d);
        }
        assert!("brutal".parse::<Difficulty>().is_err());
    }
}
