// src/output/paths.rs
//! Pure functions for slugs and output paths.
//!
//! Nothing here touches the filesystem.

use crate::constants::SLUG_MAX_LENGTH;
use crate::model::ExportFormat;
use crate::types::GenerationId;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Site-relative directory holding the per-lesson pages.
pub const LESSON_PAGES_DIR: &str = "lessons";

/// Directory under the output root for downloaded exports.
pub const DOWNLOADS_DIR: &str = "downloads";

/// Turns a title into a lowercase, hyphen-separated ASCII slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= SLUG_MAX_LENGTH {
            break;
        }
    }

    slug.truncate(SLUG_MAX_LENGTH);
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "lesson".to_string()
    } else {
        slug.to_string()
    }
}

/// Hands out slugs that are unique within one run.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    taken: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for `title`, suffixed `-2`, `-3`, … when already taken.
    pub fn claim(&mut self, title: &str) -> String {
        let base = slugify(title);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Site-relative link to a lesson page, as used in the index.
pub fn lesson_page_href(slug: &str) -> String {
    format!("{}/{}.html", LESSON_PAGES_DIR, slug)
}

/// Where a lesson page is written under the output root.
pub fn lesson_page_path(output_dir: &Path, slug: &str) -> PathBuf {
    output_dir
        .join(LESSON_PAGES_DIR)
        .join(format!("{}.html", slug))
}

/// Where a downloaded export is saved: `{out}/downloads/{slug}_{id}.{ext}`.
pub fn download_path(
    output_dir: &Path,
    slug: &str,
    id: &GenerationId,
    format: ExportFormat,
) -> PathBuf {
    output_dir.join(DOWNLOADS_DIR).join(format!(
        "{}_{}.{}",
        slug,
        sanitize_filename(id.as_str()),
        format.extension()
    ))
}

/// Replaces characters that are unsafe in file names.
pub fn sanitize_filename(name: &str) -> String {
    let safe_name = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>();

    let safe_name = safe_name.trim().trim_matches('.');
    if safe_name.is_empty() {
        "unnamed".to_string()
    } else {
        safe_name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slugs_are_lowercase_and_hyphenated() {
        assert_eq!(slugify("Intro to Rust: Part 1!"), "intro-to-rust-part-1");
        assert_eq!(slugify("  --Fractions & Decimals--  "), "fractions-decimals");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "lesson");
        assert_eq!(slugify(""), "lesson");
    }

    #[test]
    fn long_titles_are_cut_without_trailing_hyphen() {
        let title = format!("{} tail", "a".repeat(SLUG_MAX_LENGTH - 1));
        let slug = slugify(&title);
        assert!(slug.len() <= SLUG_MAX_LENGTH);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn registry_suffixes_duplicates() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.claim("Loops"), "loops");
        assert_eq!(registry.claim("loops"), "loops-2");
        assert_eq!(registry.claim("LOOPS!"), "loops-3");
        assert_eq!(registry.claim("Loops 2"), "loops-2-2");
    }

    #[test]
    fn builds_output_paths() {
        let out = Path::new("site");
        assert_eq!(lesson_page_href("intro"), "lessons/intro.html");
        assert_eq!(lesson_page_path(out, "intro"), Path::new("site/lessons/intro.html"));

        let id = GenerationId::new("abc/123").unwrap();
        assert_eq!(
            download_path(out, "intro", &id, ExportFormat::Pptx),
            Path::new("site/downloads/intro_abc_123.pptx")
        );
    }
}
