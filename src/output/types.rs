// src/output/types.rs
//! The files a site consists of, and what happened when writing them.
//!
//! A site is planned first as [`SitePlan`] and written afterwards, so the
//! plan can be inspected without touching the disk.

use std::fmt;
use std::path::PathBuf;

/// Role of one file in the generated site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteFile {
    Index,
    StatusSnapshot,
    LessonPage { slug: String },
}

impl fmt::Display for SiteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("index"),
            Self::StatusSnapshot => f.write_str("status snapshot"),
            Self::LessonPage { slug } => write!(f, "lesson page '{}'", slug),
        }
    }
}

/// A site file with its destination and rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub kind: SiteFile,
    pub path: PathBuf,
    pub content: String,
}

/// Every file of a site, in write order.
#[derive(Debug, Clone, Default)]
pub struct SitePlan {
    files: Vec<PlannedFile>,
}

impl SitePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, kind: SiteFile, path: PathBuf, content: String) -> Self {
        self.files.push(PlannedFile {
            kind,
            path,
            content,
        });
        self
    }

    pub fn files(&self) -> &[PlannedFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<PlannedFile> {
        self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A site file that reached the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub kind: SiteFile,
    pub path: PathBuf,
    pub bytes: usize,
}

/// A site file that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedWrite {
    pub kind: SiteFile,
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of writing a site. Failures never stop the remaining writes.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    pub written: Vec<WrittenFile>,
    pub failed: Vec<FailedWrite>,
}

impl DeliveryReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn bytes_written(&self) -> usize {
        self.written.iter().map(|file| file.bytes).sum()
    }

    /// Whether the index and the status snapshot both made it to disk.
    pub fn site_is_browsable(&self) -> bool {
        let written = |kind: &SiteFile| self.written.iter().any(|file| &file.kind == kind);
        written(&SiteFile::Index) && written(&SiteFile::StatusSnapshot)
    }

    /// Slugs of lesson pages that failed to write.
    pub fn failed_pages(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().filter_map(|failure| match &failure.kind {
            SiteFile::LessonPage { slug } => Some(slug.as_str()),
            _ => None,
        })
    }
}
