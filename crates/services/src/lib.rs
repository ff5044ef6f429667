#![forbid(unsafe_code)]

pub mod error;
pub mod results;
pub mod sessions;

pub use ensayo_core::Clock;

pub use error::SessionError;
pub use results::{AttemptReview, ResultsService, ReviewEntry};
pub use sessions::{ExamFlowService, ExamSession, SessionProgress};
