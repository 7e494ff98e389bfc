//! Renders the static lesson site: an index, one page per lesson and a
//! machine-readable status snapshot.

use super::markdown::render_markdown;
use crate::analytics::BatchStats;
use crate::error::AppError;
use crate::model::{LessonOutcome, LessonRecord};
use crate::output::{lesson_page_href, lesson_page_path, SiteFile, SitePlan, DOWNLOADS_DIR};
use chrono::{DateTime, SecondsFormat, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

const INDEX_TEMPLATE: &str = "index";
const LESSON_TEMPLATE: &str = "lesson";

/// File name of the status snapshot at the output root.
pub const STATUS_FILE: &str = "status.json";

/// Title shown on the index page.
pub const SITE_TITLE: &str = "Lesson decks";

/// One rendered lesson page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub slug: String,
    pub html: String,
}

/// Everything the site consists of, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSite {
    pub index: String,
    pub pages: Vec<RenderedPage>,
    pub status_json: String,
}

impl RenderedSite {
    /// Plans the writes for this site under `output_dir`.
    pub fn into_plan(self, output_dir: &Path) -> SitePlan {
        let plan = SitePlan::new()
            .with_file(SiteFile::Index, output_dir.join("index.html"), self.index)
            .with_file(
                SiteFile::StatusSnapshot,
                output_dir.join(STATUS_FILE),
                self.status_json,
            );
        self.pages.into_iter().fold(plan, |plan, page| {
            let path = lesson_page_path(output_dir, &page.slug);
            plan.with_file(SiteFile::LessonPage { slug: page.slug }, path, page.html)
        })
    }
}

/// Snapshot of a batch written to `status.json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot<'a> {
    pub generated_at: DateTime<Utc>,
    pub stats: BatchStats,
    pub lessons: Vec<&'a LessonOutcome>,
}

#[derive(Debug, Serialize)]
struct LessonView<'a> {
    title: &'a str,
    href: String,
    status: &'static str,
    share_url: Option<&'a str>,
    file_url: Option<&'a str>,
    download_href: Option<String>,
    error: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct IndexView<'a> {
    site_title: &'a str,
    generated_at: String,
    stats: BatchStats,
    lessons: Vec<LessonView<'a>>,
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    #[serde(flatten)]
    lesson: LessonView<'a>,
    content_html: String,
}

/// Handlebars-backed renderer with the site templates compiled in.
pub struct SiteRenderer {
    handlebars: Handlebars<'static>,
}

impl SiteRenderer {
    pub fn new() -> Result<Self, AppError> {
        let mut handlebars = Handlebars::new();
        for (name, source) in [
            (INDEX_TEMPLATE, include_str!("../../templates/index.hbs")),
            (LESSON_TEMPLATE, include_str!("../../templates/lesson.hbs")),
        ] {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| AppError::TemplateRenderError {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(Self { handlebars })
    }

    /// Renders the index, every lesson page and the status snapshot.
    pub fn render(
        &self,
        lessons: &[LessonRecord],
        generated_at: DateTime<Utc>,
    ) -> Result<RenderedSite, AppError> {
        let outcomes: Vec<&LessonOutcome> = lessons.iter().map(|l| &l.outcome).collect();
        let stats = BatchStats::measure(outcomes.iter().copied());

        let index = self.render_template(
            INDEX_TEMPLATE,
            &IndexView {
                site_title: SITE_TITLE,
                generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                stats,
                lessons: outcomes.iter().map(|o| lesson_view(o, "")).collect(),
            },
        )?;

        let pages = lessons
            .iter()
            .map(|lesson| {
                let html = self.render_template(
                    LESSON_TEMPLATE,
                    &PageView {
                        lesson: lesson_view(&lesson.outcome, "../"),
                        content_html: render_markdown(&lesson.markdown),
                    },
                )?;
                Ok(RenderedPage {
                    slug: lesson.outcome.slug.clone(),
                    html,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let status_json = serde_json::to_string_pretty(&StatusSnapshot {
            generated_at,
            stats,
            lessons: outcomes,
        })?;

        log::debug!(
            "Rendered index, {} lesson pages and {} bytes of status",
            pages.len(),
            status_json.len()
        );

        Ok(RenderedSite {
            index,
            pages,
            status_json,
        })
    }

    fn render_template<T: Serialize>(&self, name: &str, data: &T) -> Result<String, AppError> {
        self.handlebars
            .render(name, data)
            .map_err(|e| AppError::TemplateRenderError {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}

/// Template data for one lesson; `prefix` leads from the page back to the site root.
fn lesson_view<'a>(outcome: &'a LessonOutcome, prefix: &str) -> LessonView<'a> {
    LessonView {
        title: &outcome.title,
        href: format!("{}{}", prefix, lesson_page_href(&outcome.slug)),
        status: outcome.status.label(),
        share_url: web_link(outcome.share_url.as_deref()),
        file_url: web_link(outcome.file_url.as_deref()),
        download_href: outcome
            .downloaded_file
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| format!("{}{}/{}", prefix, DOWNLOADS_DIR, name.to_string_lossy())),
        error: outcome.error.as_deref(),
    }
}

/// Only http(s) links from the service end up in `href`/`src` attributes.
fn web_link(url: Option<&str>) -> Option<&str> {
    url.filter(|u| {
        let lower = u.trim_start().to_ascii_lowercase();
        lower.starts_with("https://") || lower.starts_with("http://")
    })
}
