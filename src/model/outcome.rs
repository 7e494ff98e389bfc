//! What a lesson ended up with after generation.

use crate::types::GenerationId;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Links pulled out of a terminal job payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedResult {
    pub share_url: Option<String>,
    pub file_url: Option<String>,
}

impl ExtractedResult {
    pub fn is_empty(&self) -> bool {
        self.share_url.is_none() && self.file_url.is_none()
    }
}

/// Status label recorded for each lesson in the index and status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutcomeStatus {
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "throttled")]
    Throttled,
    #[serde(rename = "timeout")]
    TimedOut,
    #[serde(rename = "rejected")]
    Rejected,
}

impl OutcomeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Throttled => "throttled",
            Self::TimedOut => "timeout",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One lesson's row in the batch summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOutcome {
    pub title: String,
    pub slug: String,
    pub source: PathBuf,
    pub generation_id: Option<GenerationId>,
    pub status: OutcomeStatus,
    pub share_url: Option<String>,
    pub file_url: Option<String>,
    pub downloaded_file: Option<PathBuf>,
    pub error: Option<String>,
    /// Terminal payload as returned by the service, kept for later inspection.
    pub result: Option<Value>,
}

impl LessonOutcome {
    /// An outcome with no generation data yet, labelled `status`.
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        source: impl Into<PathBuf>,
        status: OutcomeStatus,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            source: source.into(),
            generation_id: None,
            status,
            share_url: None,
            file_url: None,
            downloaded_file: None,
            error: None,
            result: None,
        }
    }
}

/// A lesson outcome together with the Markdown it was generated from.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonRecord {
    pub outcome: LessonOutcome,
    /// Empty when the lesson file could not be read.
    pub markdown: String,
}
