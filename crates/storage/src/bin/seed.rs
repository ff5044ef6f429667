use std::fmt;

use chrono::{DateTime, Utc};
use ensayo_core::model::{Difficulty, Exam, ExamId, Question, QuestionId};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    title: String,
    duration_minutes: u32,
    questions: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDuration { raw: String },
    InvalidQuestions { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDuration { raw } => write!(f, "invalid --duration value: {raw}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("ENSAYO_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut title = std::env::var("ENSAYO_EXAM_TITLE").unwrap_or_else(|_| "Ensayo M1".into());
        let mut duration_minutes = 10_u32;
        let mut questions = 4_u32;
        let mut now = None;

        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--db" => db_url = require_value(&mut iter, "--db")?,
                "--title" => title = require_value(&mut iter, "--title")?,
                "--duration" => {
                    let raw = require_value(&mut iter, "--duration")?;
                    duration_minutes = raw
                        .parse()
                        .map_err(|_| ArgsError::InvalidDuration { raw })?;
                }
                "--questions" => {
                    let raw = require_value(&mut iter, "--questions")?;
                    questions = raw
                        .parse()
                        .map_err(|_| ArgsError::InvalidQuestions { raw })?;
                }
                "--now" => {
                    let raw = require_value(&mut iter, "--now")?;
                    now = Some(
                        raw.parse::<DateTime<Utc>>()
                            .map_err(|_| ArgsError::InvalidNow { raw })?,
                    );
                }
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => return Err(ArgsError::UnknownArg(other.to_string())),
            }
        }

        Ok(Self {
            db_url,
            title,
            duration_minutes,
            questions,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --title <text>            Exam title (default: Ensayo M1)");
    eprintln!("  --duration <minutes>      Exam duration in minutes (default: 10)");
    eprintln!("  --questions <n>           Number of sample questions to link (default: 4)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  ENSAYO_DB_URL, ENSAYO_EXAM_TITLE");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let exam = Exam::new(ExamId::generate(), args.title.clone(), args.duration_minutes, now)?;
    storage.catalog.upsert_exam(&exam).await?;

    let samples = [
        ("7 * 8 = ?", "56", ["54", "58", "63"], Difficulty::Easy),
        ("15% of 200 = ?", "30", ["15", "25", "35"], Difficulty::Medium),
        (
            "Solve 2x + 6 = 14",
            "x = 4",
            ["x = 2", "x = 6", "x = 10"],
            Difficulty::Medium,
        ),
        (
            "The slope of y = 3x - 1 is",
            "3",
            ["-1", "1", "1/3"],
            Difficulty::Hard,
        ),
    ];

    let mut question_ids = Vec::new();
    for i in 0..args.questions {
        let (content, correct, distractors, difficulty) = samples[(i as usize) % samples.len()];
        let question = Question::new(
            QuestionId::generate(),
            format!("{content} (#{})", i + 1),
            None,
            difficulty,
            correct,
            distractors.iter().map(ToString::to_string).collect(),
            "See the arithmetic refresher chapter.",
        )?;
        storage.catalog.upsert_question(&question).await?;
        question_ids.push(question.id());
    }

    storage
        .catalog
        .set_exam_questions(exam.id(), &question_ids)
        .await?;

    println!(
        "Seeded exam {} ({} min, {} questions) into {}",
        exam.id(),
        exam.duration_minutes(),
        question_ids.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
