use ensayo_core::model::{
    Answer, AttemptResult, AttemptStatus, Difficulty, Exam, ExamId, Question, QuestionId, UserId,
};
use ensayo_core::time::fixed_now;
use storage::repository::{AnswerRepository, AttemptRepository, ExamCatalog, StorageError};
use storage::sqlite::SqliteRepository;

fn build_exam(title: &str) -> Exam {
    Exam::new(ExamId::generate(), title, 10, fixed_now()).unwrap()
}

fn build_question(content: &str, correct: &str) -> Question {
    Question::new(
        QuestionId::generate(),
        content,
        Some("https://cdn.example.com/fig.png".into()),
        Difficulty::Medium,
        correct,
        vec!["B".into(), "C".into(), "D".into()],
        "Because A.",
    )
    .unwrap()
}

fn build_user() -> UserId {
    UserId::new(uuid::Uuid::new_v4())
}

#[tokio::test]
async fn sqlite_roundtrips_catalog_with_question_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_catalog?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let exam = build_exam("Ensayo M1");
    repo.upsert_exam(&exam).await.unwrap();

    let q1 = build_question("Q1", "A");
    let q2 = build_question("Q2", "A");
    let q3 = build_question("Q3", "A");
    for q in [&q1, &q2, &q3] {
        repo.upsert_question(q).await.unwrap();
    }
    repo.set_exam_questions(exam.id(), &[q3.id(), q1.id(), q2.id()])
        .await
        .unwrap();

    let fetched = repo.get_exam(exam.id()).await.unwrap();
    assert_eq!(fetched, exam);

    let ids = repo.get_question_ids(exam.id()).await.unwrap();
    assert_eq!(ids, vec![q3.id(), q1.id(), q2.id()]);

    let mut questions = repo.get_questions(&ids).await.unwrap();
    questions.sort_by_key(ensayo_core::model::Question::id);
    let mut expected = vec![q1, q2, q3];
    expected.sort_by_key(ensayo_core::model::Question::id);
    assert_eq!(questions, expected);
}

#[tokio::test]
async fn sqlite_relinking_replaces_question_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_relink?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let exam = build_exam("Ensayo M2");
    repo.upsert_exam(&exam).await.unwrap();

    let q1 = build_question("Q1", "A");
    let q2 = build_question("Q2", "A");
    for q in [&q1, &q2] {
        repo.upsert_question(q).await.unwrap();
    }

    repo.set_exam_questions(exam.id(), &[q1.id(), q2.id()])
        .await
        .unwrap();
    repo.set_exam_questions(exam.id(), &[q2.id()]).await.unwrap();

    let ids = repo.get_question_ids(exam.id()).await.unwrap();
    assert_eq!(ids, vec![q2.id()]);
}

#[tokio::test]
async fn sqlite_attempt_lifecycle_and_answer_trail() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_attempts?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let exam = build_exam("Ensayo M3");
    repo.upsert_exam(&exam).await.unwrap();

    let attempt = repo
        .create_attempt(build_user(), exam.id(), fixed_now())
        .await
        .unwrap();
    assert_eq!(attempt.status(), AttemptStatus::InProgress);

    let stored = repo.get_attempt(attempt.id()).await.unwrap();
    assert_eq!(stored, attempt);
    assert!(stored.result().is_none());

    let q = build_question("Q1", "A");
    repo.insert_answer(attempt.id(), &Answer::graded(&q, Some("A".into())))
        .await
        .unwrap();
    let err = repo
        .insert_answer(attempt.id(), &Answer::graded(&q, Some("B".into())))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let omitted_q = build_question("Q2", "A");
    repo.insert_answer(attempt.id(), &Answer::graded(&omitted_q, None))
        .await
        .unwrap();

    let trail = repo.list_answers(attempt.id()).await.unwrap();
    assert_eq!(trail.len(), 2);
    assert!(trail[0].is_correct());
    assert!(trail[1].is_omitted());

    let result = AttemptResult {
        score: 500,
        correct: 1,
        incorrect: 0,
        omitted: 1,
    };
    repo.complete_attempt(attempt.id(), &result, fixed_now())
        .await
        .unwrap();

    let completed = repo.get_attempt(attempt.id()).await.unwrap();
    assert_eq!(completed.status(), AttemptStatus::Completed);
    assert_eq!(completed.result(), Some(&result));
    assert_eq!(completed.finished_at(), Some(fixed_now()));

    let err = repo
        .complete_attempt(attempt.id(), &result, fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_missing_rows_surface_not_found() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_missing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let err = repo.get_exam(ExamId::generate()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    let err = repo
        .complete_attempt(
            ensayo_core::model::AttemptId::generate(),
            &AttemptResult {
                score: 0,
                correct: 0,
                incorrect: 0,
                omitted: 1,
            },
            fixed_now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    // Unlinked exams have an empty question list, not an error.
    let exam = build_exam("Ensayo M4");
    repo.upsert_exam(&exam).await.unwrap();
    assert!(repo.get_question_ids(exam.id()).await.unwrap().is_empty());
}
