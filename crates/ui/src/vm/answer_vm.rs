use services::api::{Answer, Source};

use super::markdown_vm::markdown_to_html;

const SNIPPET_CHARS: usize = 240;

#[derive(Clone, Debug, PartialEq)]
pub struct SourceVm {
    pub file: String,
    pub section: String,
    pub snippet: String,
    pub score: Option<String>,
}

impl From<&Source> for SourceVm {
    fn from(source: &Source) -> Self {
        Self {
            file: source.file.clone(),
            section: source.section.clone(),
            snippet: snippet(&source.text),
            score: source
                .relevance_score
                .map(|score| format!("Relevance: {:.0}%", score * 100.0)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnswerVm {
    pub html: String,
    pub sources: Vec<SourceVm>,
    pub sources_label: String,
}

impl From<&Answer> for AnswerVm {
    fn from(answer: &Answer) -> Self {
        let sources: Vec<SourceVm> = answer.sources.iter().map(SourceVm::from).collect();
        let count = answer
            .total_sources
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(sources.len());
        let sources_label = match count {
            0 => "No sources".to_string(),
            1 => "1 source".to_string(),
            n => format!("{n} sources"),
        };
        Self {
            html: markdown_to_html(&answer.answer),
            sources,
            sources_label,
        }
    }
}

fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= SNIPPET_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(SNIPPET_CHARS).collect();
    cut.push_str("...");
    cut
}
