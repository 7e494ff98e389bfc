//! Generation API interaction: the ability to turn lesson text into a deck.
//!
//! This module keeps HTTP details (`client`), wire types (`types`) and the
//! submit/poll/extract logic apart, so the logic can run against any
//! [`GenerationApi`] implementation.

pub mod client;
pub mod extractor;
pub mod poller;
pub mod submitter;
pub mod types;

use crate::config::ClientConfig;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::AppError;
use crate::error_recovery::{Sleeper, TokioSleeper};
use crate::model::{ExtractedResult, GenerationJob, GenerationRequest};
use crate::pipeline::DeckGenerator;
use crate::types::GenerationId;
use client::ApiResponse;
use std::sync::Arc;

pub use client::GammaHttpClient;
pub use extractor::extract;
pub use poller::{Poller, RemoteState};
pub use submitter::Submitter;
pub use types::GenerationBody;

/// The two calls the generation service offers.
///
/// Business logic depends on this trait, never on HTTP details. Responses
/// are returned whatever their status; classifying them is the caller's job.
#[async_trait::async_trait]
pub trait GenerationApi: Send + Sync {
    async fn create_generation(&self, body: &GenerationBody)
        -> Result<ApiResponse<String>, AppError>;
    async fn fetch_generation(&self, id: &GenerationId) -> Result<ApiResponse<String>, AppError>;
}

/// A finished deck: the settled job and the links found in its payload.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub job: GenerationJob,
    pub links: ExtractedResult,
}

/// Submits a lesson, waits for it, and extracts its links.
pub struct DeckClient {
    submitter: Submitter,
    poller: Poller,
}

impl DeckClient {
    pub fn new(api: Arc<dyn GenerationApi>, config: &ClientConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            submitter: Submitter::new(api.clone(), config.submit_policy, sleeper.clone()),
            poller: Poller::new(api, config.poll_policy, sleeper),
        }
    }

    /// Builds a client that talks HTTP and sleeps on the tokio timer.
    pub fn connect(config: &ClientConfig) -> Result<Self, AppError> {
        let http = GammaHttpClient::new(config)?;
        Ok(Self::new(Arc::new(http), config, Arc::new(TokioSleeper)))
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }
}

#[async_trait::async_trait]
impl DeckGenerator for DeckClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedDeck, AppError> {
        let id = self.submitter.submit_request(request).await?;
        let job = self.poller.poll_until_terminal(&id).await?;
        let links = extract(job.payload(), request.export_as());

        if links.share_url.is_none() {
            log::warn!("Generation {} completed without a share link", id);
        }
        if request.export_as().is_some() && links.file_url.is_none() {
            log::warn!("Generation {} completed without an export link", id);
        }

        Ok(GeneratedDeck { job, links })
    }
}

/// Shortens a response body for logs and error messages.
pub(crate) fn preview_body(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let head: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}
