use std::fmt;

use chrono::{DateTime, Duration, Utc};
use storage::repository::Storage;
use study_core::model::{OptionLabel, QuestionOutcome, QuizError, QuizResult, UserId};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    results: u32,
    questions: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUser { raw: String },
    InvalidResults { raw: String },
    InvalidQuestions { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw:?}"),
            ArgsError::InvalidResults { raw } => write!(f, "invalid --results value: {raw}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
            std::env::var("STUDY_DB_URL").unwrap_or_else(|_| "sqlite:study.sqlite3".into());
        let raw_user = std::env::var("STUDY_SEED_USER").unwrap_or_else(|_| "demo".into());
        let mut user_id =
            UserId::new(raw_user.clone()).map_err(|_| ArgsError::InvalidUser { raw: raw_user })?;
        let mut results = 5_u32;
        let mut questions = 5_u32;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    user_id = UserId::new(value.clone())
                        .map_err(|_| ArgsError::InvalidUser { raw: value })?;
                }
                "--results" => {
                    let value = require_value(&mut args, "--results")?;
                    results = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidResults { raw: value.clone() })?;
                }
                "--questions" => {
                    let value = require_value(&mut args, "--questions")?;
                    questions = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| ArgsError::InvalidQuestions { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            results,
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
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:study.sqlite3)");
    eprintln!("  --user <id>               User id to attach results to (default: demo)");
    eprintln!("  --results <n>             Number of quiz results to append (default: 5)");
    eprintln!("  --questions <n>           Questions per quiz (default: 5)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL, STUDY_SEED_USER");
}

const TOPICS: [&str; 5] = [
    "Which layer of the OSI model handles routing?",
    "What does a hash map trade memory for?",
    "Which sorting algorithm is stable and O(n log n)?",
    "What is the role of a mutex?",
    "Which data structure backs a priority queue?",
];

fn sample_outcomes(seed: u32, questions: u32) -> Result<Vec<QuestionOutcome>, QuizError> {
    (0..questions)
        .map(|q| {
            let index = q as usize;
            let is_correct = (seed + q) % 3 != 0;
            let label = OptionLabel::new(["A", "B", "C", "D"][index % 4])?;
            Ok(QuestionOutcome {
                index,
                correct_answer: if is_correct {
                    label.as_str().to_string()
                } else {
                    "D".to_string()
                },
                user_answer: label,
                is_correct,
                topic_snippet: TOPICS[index % TOPICS.len()].to_string(),
            })
        })
        .collect()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    for i in 0..args.results {
        let taken_at = now - Duration::days(i64::from(i)) - Duration::minutes(15);
        let result = QuizResult::from_outcomes(
            args.user_id.clone(),
            taken_at,
            sample_outcomes(i, args.questions)?,
        )?;
        let _ = storage.quiz_results.append_result(&result).await?;
    }

    println!(
        "Seeded {} quiz results for user {} into {}",
        args.results, args.user_id, args.db_url
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
