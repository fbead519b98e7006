use services::ProgressOverview;
use storage::repository::QuizResultRow;

use super::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverviewVm {
    pub quizzes_taken: String,
    pub average: String,
    pub best: String,
    pub totals: String,
    pub latest: String,
}

impl From<&ProgressOverview> for OverviewVm {
    fn from(overview: &ProgressOverview) -> Self {
        Self {
            quizzes_taken: overview.quizzes_taken.to_string(),
            average: format!("{}%", overview.average_percentage),
            best: format!("{}%", overview.best_percentage),
            totals: format!(
                "{} / {} correct",
                overview.total_correct, overview.total_questions
            ),
            latest: overview
                .latest
                .map_or_else(|| "Never".to_string(), format_datetime),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRowVm {
    pub id: i64,
    pub taken_at: String,
    pub score: String,
    pub percentage: String,
    pub grade_class: &'static str,
    pub missed_topics: Vec<String>,
}

#[must_use]
pub fn map_history_rows(rows: &[QuizResultRow]) -> Vec<HistoryRowVm> {
    rows.iter()
        .map(|row| {
            let result = &row.result;
            let percentage = result.percentage();
            HistoryRowVm {
                id: row.id,
                taken_at: format_datetime(result.taken_at()),
                score: format!("{}/{}", result.score(), result.total()),
                percentage: format!("{percentage}%"),
                grade_class: match percentage {
                    80.. => "grade-good",
                    50..=79 => "grade-fair",
                    _ => "grade-poor",
                },
                missed_topics: result
                    .outcomes()
                    .iter()
                    .filter(|outcome| !outcome.is_correct)
                    .map(|outcome| outcome.topic_snippet.clone())
                    .collect(),
            }
        })
        .collect()
}
