mod answer;
mod attempt;
mod exam;
mod ids;
mod ledger;
mod question;

pub use ids::{AttemptId, ExamId, ParseIdError, QuestionId, UserId};

pub use answer::Answer;
pub use attempt::{Attempt, AttemptError, AttemptResult, AttemptStatus, ParseStatusError};
pub use exam::{Exam, ExamError};
pub use ledger::AnswerLedger;
pub use question::{Difficulty, ParseDifficultyError, Question, QuestionError};
