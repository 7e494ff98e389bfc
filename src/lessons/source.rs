//! Reading lesson Markdown from disk.

use crate::constants::HOST_PLACEHOLDER;
use crate::error::AppError;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::fs;
use std::path::{Path, PathBuf};

static HOST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\{{\{{\s*{}\s*\}}\}}", HOST_PLACEHOLDER))
        .unwrap_or_else(|e| unreachable!("host placeholder pattern is invalid: {}", e))
});

/// Lists the `*.md` files directly inside `dir`, sorted by file name.
pub fn discover_lessons(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir).map_err(|source| AppError::ReadFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut lessons = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_markdown = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if is_markdown && path.is_file() {
            lessons.push(path);
        }
    }
    lessons.sort();

    log::debug!("Found {} lesson files in {}", lessons.len(), dir.display());
    Ok(lessons)
}

/// Reads a lesson file as UTF-8 text.
pub fn read_lesson(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Replaces every `{{HOST}}` placeholder with `host`.
///
/// `host` is expected without trailing slashes so `{{HOST}}/path` stays clean.
pub fn substitute_host(text: &str, host: &str) -> String {
    HOST_PATTERN.replace_all(text, NoExpand(host)).into_owned()
}

/// The text of the first level-one heading outside fenced code blocks.
pub fn first_heading(markdown: &str) -> Option<String> {
    let mut in_fence = false;
    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("# ").or_else(|| trimmed.strip_prefix("#\t")) {
            let heading = rest.trim().trim_end_matches('#').trim();
            if !heading.is_empty() {
                return Some(heading.to_string());
            }
        }
    }
    None
}

/// Title used when neither the manifest nor the lesson supplies one.
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
        .map(|stem| stem.trim().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "Untitled lesson".to_string())
}
