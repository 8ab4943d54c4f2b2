use crate::language::LanguageTag;
use crate::metrics::{compute_metrics, TextMetrics};
use crate::time_series::History;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One saved piece of writing; the unit of persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub metrics: TextMetrics,
    #[serde(default)]
    pub writing_time_seconds: u64,
    #[serde(default)]
    pub history: History,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: String::new(),
            content: String::new(),
            metrics: TextMetrics::empty(),
            writing_time_seconds: 0,
            history: History::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Metrics freshly computed from the content, ignoring the stored snapshot
    pub fn recompute_metrics(&self, tag: LanguageTag) -> TextMetrics {
        compute_metrics(&self.content, tag)
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            word_count: self.metrics.word_count,
            updated_at: self.updated_at,
        }
    }

    /// Summary with the word count taken from the content under `tag`
    pub fn summary_in(&self, tag: LanguageTag) -> DocumentSummary {
        DocumentSummary {
            word_count: self.recompute_metrics(tag).word_count,
            ..self.summary()
        }
    }
}

/// What a document list shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub word_count: usize,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ExportFormat {
    PlainText,
    Markdown,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::PlainText => "txt",
            ExportFormat::Markdown => "md",
        }
    }
}

pub fn export(record: &DocumentRecord, format: ExportFormat) -> String {
    match format {
        ExportFormat::PlainText => record.content.clone(),
        ExportFormat::Markdown => format!("# {}\n\n{}", record.title, record.content),
    }
}

/// File name for an export: the title with path-hostile characters replaced
pub fn export_file_name(record: &DocumentRecord, format: ExportFormat) -> String {
    let stem: String = record
        .title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() { "document" } else { &stem };
    format!("{stem}.{}", format.extension())
}
