//! Turns a lesson into a remote generation job.

use super::client::ApiResponse;
use super::types::GenerationBody;
use super::{preview_body, GenerationApi};
use crate::error::{AppError, ResponseClass};
use crate::error_recovery::{with_backoff, BackoffError, RetryPolicy, Sleeper, Verdict};
use crate::model::{GenerationOptions, GenerationRequest};
use crate::types::GenerationId;
use serde_json::Value;
use std::sync::Arc;

/// Places where the service has been seen to put the new job's identifier.
const GENERATION_ID_POINTERS: &[&str] = &["/id", "/generationId", "/data/id", "/data/generationId"];

/// Submits generation requests, retrying only throttled answers.
pub struct Submitter {
    api: Arc<dyn GenerationApi>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Submitter {
    pub fn new(api: Arc<dyn GenerationApi>, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            api,
            policy,
            sleeper,
        }
    }

    /// Validates the lesson text and submits it. Empty text fails before
    /// any request is made.
    pub async fn submit(
        &self,
        source_text: &str,
        title: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationId, AppError> {
        let request = GenerationRequest::new(source_text, title, options)?;
        self.submit_request(&request).await
    }

    /// Submits an already validated request and returns the job identifier.
    pub async fn submit_request(&self, request: &GenerationRequest) -> Result<GenerationId, AppError> {
        let body = GenerationBody::from(request);
        log::info!(
            "Submitting '{}' (format: {}, theme: {}{})",
            request.title(),
            request.format(),
            request.theme(),
            request
                .export_as()
                .map(|e| format!(", export: {}", e))
                .unwrap_or_default()
        );

        let api = self.api.as_ref();
        let body = &body;
        let outcome = with_backoff(
            &self.policy,
            self.sleeper.as_ref(),
            move |_| api.create_generation(body),
            classify_submission,
        )
        .await;

        match outcome {
            Ok(id) => {
                log::info!("Generation ID for '{}': {}", request.title(), id);
                Ok(id)
            }
            Err(BackoffError::Fatal(err)) => Err(err),
            Err(BackoffError::Exhausted { attempts, .. }) => {
                Err(AppError::RateLimited { attempts })
            }
        }
    }
}

/// Decides what one submission attempt means.
///
/// Transport errors are not retried: the job may already exist remotely.
fn classify_submission(response: Result<ApiResponse<String>, AppError>) -> Verdict<GenerationId> {
    let response = match response {
        Ok(response) => response,
        Err(err) => return Verdict::Fatal(err),
    };

    match ResponseClass::from_status(response.status) {
        ResponseClass::Success => match parse_generation_id(&response.data) {
            Some(id) => Verdict::Ready(id),
            None => Verdict::Fatal(AppError::MissingIdentifier {
                body: preview_body(&response.data),
            }),
        },
        class if class.is_retryable() => {
            log::warn!("Submission answered {} ({})", response.status, class);
            Verdict::Throttled {
                retry_after: response.retry_after,
            }
        }
        _ => Verdict::Fatal(AppError::Submission {
            status: response.status,
            body: preview_body(&response.data),
        }),
    }
}

/// Finds the job identifier in a submission response body.
///
/// Numeric identifiers are accepted and kept in their decimal form.
pub fn parse_generation_id(body: &str) -> Option<GenerationId> {
    let payload: Value = serde_json::from_str(body).ok()?;
    GENERATION_ID_POINTERS.iter().find_map(|pointer| {
        let raw = match payload.pointer(pointer)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        GenerationId::new(raw).ok()
    })
}
