use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ensayo_core::model::{
    Answer, Attempt, AttemptId, AttemptResult, AttemptStatus, Difficulty, Exam, ExamId, Question,
    QuestionId, UserId,
};
use ensayo_core::time::{fixed_clock, fixed_now};
use services::{ExamFlowService, ResultsService, SessionError};
use storage::repository::{
    AnswerRepository, AttemptRepository, ExamCatalog, InMemoryRepository, StorageError,
};

fn build_user() -> UserId {
    UserId::new(uuid::Uuid::new_v4())
}

fn build_question(n: usize) -> Question {
    Question::new(
        QuestionId::generate(),
        format!("Q{n}"),
        None,
        Difficulty::Medium,
        "A",
        vec!["B".into(), "C".into(), "D".into()],
        "A is correct.",
    )
    .unwrap()
}

async fn seed_exam(
    repo: &InMemoryRepository,
    duration_minutes: u32,
    question_count: usize,
) -> (Exam, Vec<Question>) {
    let exam = Exam::new(
        ExamId::generate(),
        "Ensayo de prueba",
        duration_minutes,
        fixed_now(),
    )
    .unwrap();
    repo.upsert_exam(&exam).await.unwrap();

    let mut questions = Vec::new();
    for n in 0..question_count {
        let question = build_question(n);
        repo.upsert_question(&question).await.unwrap();
        questions.push(question);
    }
    let ids: Vec<QuestionId> = questions.iter().map(Question::id).collect();
    repo.set_exam_questions(exam.id(), &ids).await.unwrap();

    (exam, questions)
}

fn build_service(repo: &InMemoryRepository) -> ExamFlowService {
    ExamFlowService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
}

#[tokio::test]
async fn explicit_finish_grades_and_persists() {
    let repo = InMemoryRepository::new();
    let (exam, questions) = seed_exam(&repo, 10, 4).await;

    let flow = build_service(&repo);
    let mut session = flow.start(exam.id(), build_user()).await.unwrap();
    assert_eq!(session.remaining_seconds(), 600);
    assert_eq!(session.total_questions(), 4);

    session.select_answer(questions[0].id(), "A").unwrap();
    session.select_answer(questions[1].id(), "B").unwrap();

    let result = flow.finish(&mut session).await.unwrap();
    assert_eq!(result.correct, 1);
    assert_eq!(result.incorrect, 1);
    assert_eq!(result.omitted, 2);
    assert_eq!(result.score, 250);
    assert!(session.is_complete());
    assert_eq!(session.finished_at(), Some(fixed_now()));

    let attempt = repo.get_attempt(session.attempt_id()).await.unwrap();
    assert_eq!(attempt.status(), AttemptStatus::Completed);
    assert_eq!(attempt.result(), Some(&result));

    // One immutable record per question, omitted ones included.
    let trail = repo.list_answers(session.attempt_id()).await.unwrap();
    assert_eq!(trail.len(), 4);
    assert_eq!(trail.iter().filter(|a| a.is_correct()).count(), 1);
    assert_eq!(trail.iter().filter(|a| a.is_omitted()).count(), 2);
}

#[tokio::test]
async fn countdown_expiry_auto_finishes_with_all_omitted() {
    let repo = InMemoryRepository::new();
    let (exam, _questions) = seed_exam(&repo, 1, 4).await;

    let flow = build_service(&repo);
    let mut session = flow.start(exam.id(), build_user()).await.unwrap();
    assert_eq!(session.remaining_seconds(), 60);

    let mut finished = None;
    for _ in 0..60 {
        assert!(finished.is_none());
        finished = flow.tick(&mut session).await.unwrap();
    }

    let result = finished.expect("zero crossing must finalize");
    assert_eq!(result.correct, 0);
    assert_eq!(result.incorrect, 0);
    assert_eq!(result.omitted, 4);
    assert_eq!(result.score, 0);
    assert!(session.is_complete());

    // Ticks after the terminal transition change nothing.
    assert!(flow.tick(&mut session).await.unwrap().is_none());
    assert_eq!(session.remaining_seconds(), 0);

    let attempt = repo.get_attempt(session.attempt_id()).await.unwrap();
    assert_eq!(attempt.status(), AttemptStatus::Completed);
}

#[tokio::test]
async fn finish_is_idempotent_and_writes_once() {
    let repo = InMemoryRepository::new();
    let (exam, questions) = seed_exam(&repo, 10, 2).await;

    let flow = build_service(&repo);
    let mut session = flow.start(exam.id(), build_user()).await.unwrap();
    session.select_answer(questions[0].id(), "A").unwrap();

    let first = flow.finish(&mut session).await.unwrap();
    let second = flow.finish(&mut session).await.unwrap();
    assert_eq!(first, second);

    // A second round of writes would conflict on the answer trail and the
    // attempt transition; the trail length shows none happened.
    let trail = repo.list_answers(session.attempt_id()).await.unwrap();
    assert_eq!(trail.len(), 2);
}

#[tokio::test]
async fn start_fails_for_unknown_exam() {
    let repo = InMemoryRepository::new();
    let flow = build_service(&repo);

    let err = flow
        .start(ExamId::generate(), build_user())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::ExamNotFound));
}

#[tokio::test]
async fn start_fails_for_exam_without_questions() {
    let repo = InMemoryRepository::new();
    let exam = Exam::new(ExamId::generate(), "Ensayo vacio", 10, fixed_now()).unwrap();
    repo.upsert_exam(&exam).await.unwrap();

    let flow = build_service(&repo);
    let err = flow.start(exam.id(), build_user()).await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyExam));
}

#[tokio::test]
async fn start_fails_on_question_shortfall() {
    let repo = InMemoryRepository::new();
    let exam = Exam::new(ExamId::generate(), "Ensayo roto", 10, fixed_now()).unwrap();
    repo.upsert_exam(&exam).await.unwrap();

    let present = build_question(0);
    repo.upsert_question(&present).await.unwrap();
    repo.set_exam_questions(exam.id(), &[present.id(), QuestionId::generate()])
        .await
        .unwrap();

    let flow = build_service(&repo);
    let err = flow.start(exam.id(), build_user()).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::DataIntegrity {
            expected: 2,
            loaded: 1
        }
    ));
}

/// Answer store that rejects every write, for the best-effort trail path.
#[derive(Clone)]
struct FailingAnswers;

#[async_trait]
impl AnswerRepository for FailingAnswers {
    async fn insert_answer(
        &self,
        _attempt_id: AttemptId,
        _answer: &Answer,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("answer store offline".into()))
    }

    async fn list_answers(&self, _attempt_id: AttemptId) -> Result<Vec<Answer>, StorageError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn answer_trail_failures_do_not_block_the_result() {
    let repo = InMemoryRepository::new();
    let (exam, questions) = seed_exam(&repo, 10, 2).await;

    let flow = ExamFlowService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(FailingAnswers),
    );

    let mut session = flow.start(exam.id(), build_user()).await.unwrap();
    for q in &questions {
        session.select_answer(q.id(), "A").unwrap();
    }

    let result = flow.finish(&mut session).await.unwrap();
    assert_eq!(result.score, 1000);
    assert_eq!(result.correct, 2);

    let attempt = repo.get_attempt(session.attempt_id()).await.unwrap();
    assert_eq!(attempt.status(), AttemptStatus::Completed);
}

/// Attempt store whose completion write always fails.
#[derive(Clone)]
struct FailingAttempts {
    inner: InMemoryRepository,
}

#[async_trait]
impl AttemptRepository for FailingAttempts {
    async fn create_attempt(
        &self,
        user_id: UserId,
        exam_id: ExamId,
        started_at: DateTime<Utc>,
    ) -> Result<Attempt, StorageError> {
        self.inner.create_attempt(user_id, exam_id, started_at).await
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Attempt, StorageError> {
        self.inner.get_attempt(id).await
    }

    async fn complete_attempt(
        &self,
        _id: AttemptId,
        _result: &AttemptResult,
        _finished_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("attempt store offline".into()))
    }
}

#[tokio::test]
async fn attempt_update_failure_still_terminates_the_session() {
    let repo = InMemoryRepository::new();
    let (exam, questions) = seed_exam(&repo, 10, 2).await;

    let flow = ExamFlowService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(FailingAttempts { inner: repo.clone() }),
        Arc::new(repo.clone()),
    );

    let mut session = flow.start(exam.id(), build_user()).await.unwrap();
    session.select_answer(questions[0].id(), "A").unwrap();

    let err = flow.finish(&mut session).await.unwrap_err();
    assert!(matches!(err, SessionError::Storage(_)));

    // The learner still has a terminal session and a readable score.
    assert!(session.is_complete());
    let outcome = session.outcome().unwrap();
    assert_eq!(outcome.correct, 1);
    assert_eq!(outcome.score, 500);

    // The durable record keeps its pre-failure state.
    let attempt = repo.get_attempt(session.attempt_id()).await.unwrap();
    assert_eq!(attempt.status(), AttemptStatus::InProgress);
}

#[tokio::test]
async fn results_review_joins_answers_with_questions() {
    let repo = InMemoryRepository::new();
    let (exam, questions) = seed_exam(&repo, 10, 4).await;

    let flow = build_service(&repo);
    let mut session = flow.start(exam.id(), build_user()).await.unwrap();
    session.select_answer(questions[0].id(), "A").unwrap();
    session.select_answer(questions[1].id(), "B").unwrap();
    flow.finish(&mut session).await.unwrap();

    let results = ResultsService::new(
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    );

    let review = results.load(session.attempt_id()).await.unwrap();
    assert!(review.attempt.is_completed());
    assert_eq!(review.entries.len(), 4);
    assert!(review.entries.iter().all(|e| e.question.is_some()));

    let result = review.result().unwrap();
    assert_eq!(result.total(), 4);
    assert_eq!(result.percentage(), 25);

    let err = results.load(AttemptId::generate()).await.unwrap_err();
    assert!(matches!(err, SessionError::AttemptNotFound));
}
