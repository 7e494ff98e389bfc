// src/batch.rs
//! Runs a whole batch of lessons: generate, optionally download, then
//! render and deliver the site.
//!
//! Lessons are processed one at a time. A lesson that fails is recorded
//! with its status label and the batch moves on; only configuration
//! problems stop a run.

use crate::analytics::BatchStats;
use crate::config::RunConfig;
use crate::error::AppError;
use crate::formatting::{RenderedSite, SiteRenderer};
use crate::lessons::{load_lesson, plan_lessons, LessonEntry};
use crate::model::{
    ExportFormat, GenerationRequest, LessonOutcome, LessonRecord, OutcomeStatus,
};
use crate::output::{deliver, download_path, DeliveryReport, SlugRegistry};
use crate::pipeline::{DeckGenerator, ExportFetcher, SiteComposer, SiteDelivery};
use chrono::Utc;

/// What a finished batch produced.
#[derive(Debug)]
pub struct BatchSummary {
    pub lessons: Vec<LessonRecord>,
    pub stats: BatchStats,
    pub report: DeliveryReport,
}

/// Drives every lesson of a run through the pipeline stages.
pub struct BatchRunner<'a> {
    config: &'a RunConfig,
    generator: &'a dyn DeckGenerator,
    fetcher: Option<&'a dyn ExportFetcher>,
    renderer: SiteRenderer,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        config: &'a RunConfig,
        generator: &'a dyn DeckGenerator,
        fetcher: Option<&'a dyn ExportFetcher>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            config,
            generator,
            fetcher,
            renderer: SiteRenderer::new()?,
        })
    }

    /// Plans the lessons from the configured directory or manifest and runs them.
    pub async fn run(&self) -> Result<BatchSummary, AppError> {
        let entries = plan_lessons(&self.config.input_dir, self.config.batch_csv.as_deref())
            .map_err(|e| AppError::MissingConfiguration(format!("cannot read lessons: {}", e)))?;
        if entries.is_empty() {
            log::warn!(
                "No lessons found in {}",
                self.config
                    .batch_csv
                    .as_deref()
                    .unwrap_or(&self.config.input_dir)
                    .display()
            );
        }
        self.run_entries(&entries).await
    }

    /// Runs the given lessons in order, then renders and writes the site.
    pub async fn run_entries(&self, entries: &[LessonEntry]) -> Result<BatchSummary, AppError> {
        let mut slugs = SlugRegistry::new();
        let mut lessons = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            log::info!(
                "[{}/{}] {}",
                index + 1,
                entries.len(),
                entry.source.display()
            );
            let record = self.process(entry, &mut slugs).await;
            log::info!(
                "[{}/{}] '{}' → {}",
                index + 1,
                entries.len(),
                record.outcome.title,
                record.outcome.status
            );
            lessons.push(record);
        }

        let site = self.compose(&lessons)?;
        let report = self.deliver(site)?;
        if !report.is_success() {
            log::warn!(
                "{} of {} site files could not be written to {}",
                report.failed.len(),
                report.failed.len() + report.written.len(),
                self.config.output_dir.display()
            );
        }

        Ok(BatchSummary {
            stats: BatchStats::measure(lessons.iter().map(|l| &l.outcome)),
            lessons,
            report,
        })
    }

    /// Runs one lesson to an outcome. Never fails: errors become status labels.
    async fn process(&self, entry: &LessonEntry, slugs: &mut SlugRegistry) -> LessonRecord {
        let lesson = match load_lesson(entry, self.config.host.without_trailing_slash()) {
            Ok(lesson) => lesson,
            Err(err) => {
                let title = entry.provisional_title();
                let slug = slugs.claim(&title);
                log::warn!("Skipping {}: {}", entry.source.display(), err);
                return LessonRecord {
                    outcome: failed_outcome(title, slug, entry, &err),
                    markdown: String::new(),
                };
            }
        };

        let slug = slugs.claim(&lesson.title);
        let options = lesson.overrides.apply(&self.config.generation);

        let outcome = match GenerationRequest::new(lesson.markdown.as_str(), lesson.title.as_str(), &options) {
            Err(err) => {
                let err = AppError::from(err);
                log::warn!("Lesson '{}' is not valid: {}", lesson.title, err);
                failed_outcome(lesson.title.clone(), slug, entry, &err)
            }
            Ok(request) => match self.generator.generate(&request).await {
                Ok(deck) => {
                    let mut outcome = LessonOutcome {
                        generation_id: Some(deck.job.id().clone()),
                        share_url: deck.links.share_url,
                        file_url: deck.links.file_url,
                        ..LessonOutcome::new(
                            lesson.title.clone(),
                            slug,
                            entry.source.clone(),
                            OutcomeStatus::Completed,
                        )
                    };
                    outcome.result = Some(deck.job.into_payload());
                    self.download_export(&mut outcome, options.export_as).await;
                    outcome
                }
                Err(err) => {
                    log::warn!("Lesson '{}' ended as {}: {}", lesson.title, err.outcome_status(), err);
                    failed_outcome(lesson.title.clone(), slug, entry, &err)
                }
            },
        };

        LessonRecord {
            outcome,
            markdown: lesson.markdown,
        }
    }

    /// Saves the export next to the site when downloads are enabled.
    /// Failures are logged and leave the outcome otherwise untouched.
    async fn download_export(&self, outcome: &mut LessonOutcome, requested: Option<ExportFormat>) {
        if !self.config.download_exports {
            return;
        }
        let (Some(fetcher), Some(url), Some(id)) =
            (self.fetcher, outcome.file_url.as_deref(), outcome.generation_id.as_ref())
        else {
            return;
        };
        let Some(format) = requested.or_else(|| format_from_url(url)) else {
            log::warn!("Cannot tell the export format of {}; not downloading", url);
            return;
        };

        let destination = download_path(&self.config.output_dir, &outcome.slug, id, format);
        let url = url.to_string();
        let fetched = fetcher.fetch(&url, &destination).await;
        match fetched {
            Ok(_) => outcome.downloaded_file = Some(destination),
            Err(err) => log::warn!("Download of {} failed: {}", url, err),
        }
    }
}

impl SiteComposer for BatchRunner<'_> {
    fn compose(&self, lessons: &[LessonRecord]) -> Result<RenderedSite, AppError> {
        self.renderer.render(lessons, Utc::now())
    }
}

impl SiteDelivery for BatchRunner<'_> {
    fn deliver(&self, site: RenderedSite) -> Result<DeliveryReport, AppError> {
        Ok(deliver(site.into_plan(&self.config.output_dir)))
    }
}

fn failed_outcome(title: String, slug: String, entry: &LessonEntry, err: &AppError) -> LessonOutcome {
    LessonOutcome {
        generation_id: err.generation_id().cloned(),
        error: Some(err.to_string()),
        ..LessonOutcome::new(title, slug, entry.source.clone(), err.outcome_status())
    }
}

/// Guesses the export format from a link's file extension.
fn format_from_url(url: &str) -> Option<ExportFormat> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let extension = path.rsplit_once('.').map(|(_, ext)| ext)?;
    extension.parse().ok()
}
