// src/pipeline.rs
//! Pipeline capability traits for the stages of a lesson batch.
//!
//! Each trait describes a single capability, enabling testing each stage in isolation.

use crate::api::GeneratedDeck;
use crate::error::AppError;
use crate::formatting::RenderedSite;
use crate::model::{GenerationRequest, LessonRecord};
use crate::output::DeliveryReport;
use std::path::Path;

/// Turns one lesson request into a finished deck.
#[async_trait::async_trait]
pub trait DeckGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedDeck, AppError>;
}

/// Saves an exported deck file locally.
#[async_trait::async_trait]
pub trait ExportFetcher: Send + Sync {
    /// Downloads `url` into `destination`, returning the bytes written.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, AppError>;
}

/// Renders the batch outcomes into site pages.
pub trait SiteComposer {
    fn compose(&self, lessons: &[LessonRecord]) -> Result<RenderedSite, AppError>;
}

/// Writes the rendered site to its destination.
pub trait SiteDelivery {
    fn deliver(&self, site: RenderedSite) -> Result<DeliveryReport, AppError>;
}
