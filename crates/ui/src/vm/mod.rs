mod answer_vm;
mod markdown_vm;
mod notice_vm;
mod progress_vm;
mod quiz_vm;
mod time_fmt;

pub use answer_vm::{AnswerVm, SourceVm};
pub use markdown_vm::{markdown_to_html, sanitize_html};
pub use notice_vm::{NoticeSlot, NoticeVm, use_notice};
pub use progress_vm::{HistoryRowVm, OverviewVm, map_history_rows};
pub use quiz_vm::{
    CompletionVm, OptionVm, OutcomeVm, QuestionCardVm, StepVm, VerdictVm, completion_warning,
    persistence_label,
};
pub use time_fmt::format_datetime;
