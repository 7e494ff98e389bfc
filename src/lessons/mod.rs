//! Finding and loading the lessons of a batch.
//!
//! A batch is either every Markdown file in the input directory or the rows
//! of a CSV manifest. Planning only decides *which* files to use; each file
//! is read later, so one unreadable lesson fails on its own.

mod manifest;
mod source;

pub use manifest::read_manifest;
pub use source::{discover_lessons, first_heading, substitute_host, title_from_path};

use crate::error::AppError;
use crate::model::{DeckFormat, ExportFormat, GenerationOptions};
use crate::types::ThemeName;
use std::path::{Path, PathBuf};

/// Per-lesson settings that replace the run defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonOverrides {
    pub format: Option<DeckFormat>,
    pub theme: Option<ThemeName>,
    pub export_as: Option<ExportFormat>,
}

impl LessonOverrides {
    /// Applies these overrides on top of `defaults`.
    pub fn apply(&self, defaults: &GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            format: self.format.unwrap_or(defaults.format),
            theme: self.theme.clone().unwrap_or_else(|| defaults.theme.clone()),
            export_as: self.export_as.or(defaults.export_as),
            ..defaults.clone()
        }
    }
}

/// A lesson selected for the batch but not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonEntry {
    pub source: PathBuf,
    /// Title given by the manifest, if any.
    pub title: Option<String>,
    pub overrides: LessonOverrides,
}

impl LessonEntry {
    pub fn from_path(source: PathBuf) -> Self {
        Self {
            source,
            title: None,
            overrides: LessonOverrides::default(),
        }
    }

    /// Title to show before the file has been read.
    pub fn provisional_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| title_from_path(&self.source))
    }
}

/// A lesson read from disk with its host placeholders filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub source: PathBuf,
    pub title: String,
    pub markdown: String,
    pub overrides: LessonOverrides,
}

/// Selects the lessons for a run: manifest rows if a manifest is given,
/// otherwise the Markdown files of `input_dir`.
pub fn plan_lessons(input_dir: &Path, manifest: Option<&Path>) -> Result<Vec<LessonEntry>, AppError> {
    match manifest {
        Some(path) => read_manifest(path, input_dir),
        None => Ok(discover_lessons(input_dir)?
            .into_iter()
            .map(LessonEntry::from_path)
            .collect()),
    }
}

/// Reads one planned lesson, substituting `host` for `{{HOST}}`.
///
/// The title comes from the manifest, else the first `# ` heading, else
/// the file name.
pub fn load_lesson(entry: &LessonEntry, host: &str) -> Result<Lesson, AppError> {
    let raw = source::read_lesson(&entry.source)?;
    let markdown = substitute_host(&raw, host);
    let title = entry
        .title
        .clone()
        .or_else(|| first_heading(&markdown))
        .unwrap_or_else(|| title_from_path(&entry.source));

    log::debug!(
        "Loaded lesson '{}' from {} ({} bytes)",
        title,
        entry.source.display(),
        markdown.len()
    );

    Ok(Lesson {
        source: entry.source.clone(),
        title,
        markdown,
        overrides: entry.overrides.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn loads_with_host_and_heading_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intro.md");
        fs::write(&path, "# Welcome\nSee {{HOST}}/intro\n").unwrap();

        let lesson = load_lesson(&LessonEntry::from_path(path.clone()), "https://learn.example.com")
            .unwrap();
        assert_eq!(lesson.title, "Welcome");
        assert_eq!(lesson.markdown, "# Welcome\nSee https://learn.example.com/intro\n");
        assert_eq!(lesson.source, path);
    }

    #[test]
    fn manifest_title_wins_then_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("week-two.md");
        fs::write(&path, "no heading").unwrap();

        let plain = load_lesson(&LessonEntry::from_path(path.clone()), "h").unwrap();
        assert_eq!(plain.title, "week two");

        let named = LessonEntry {
            title: Some("Week 2".to_string()),
            ..LessonEntry::from_path(path)
        };
        assert_eq!(load_lesson(&named, "h").unwrap().title, "Week 2");
    }

    #[test]
    fn missing_file_is_a_per_lesson_error() {
        let entry = LessonEntry::from_path(PathBuf::from("/nope/deck.md"));
        let err = load_lesson(&entry, "h").unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(entry.provisional_title(), "deck");
    }

    #[test]
    fn overrides_replace_only_what_they_name() {
        let defaults = GenerationOptions {
            additional_instructions: Some("Keep it short".to_string()),
            ..GenerationOptions::default()
        };
        let overrides = LessonOverrides {
            export_as: Some(ExportFormat::Pdf),
            ..LessonOverrides::default()
        };
        let applied = overrides.apply(&defaults);
        assert_eq!(applied.export_as, Some(ExportFormat::Pdf));
        assert_eq!(applied.format, defaults.format);
        assert_eq!(applied.theme, defaults.theme);
        assert_eq!(applied.additional_instructions.as_deref(), Some("Keep it short"));
    }

    #[test]
    fn plans_directory_lessons_without_a_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        let planned = plan_lessons(dir.path(), None).unwrap();
        assert_eq!(
            planned,
            vec![
                LessonEntry::from_path(dir.path().join("a.md")),
                LessonEntry::from_path(dir.path().join("b.md")),
            ]
        );
    }
}
