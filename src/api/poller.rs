//! Waits for a generation job to reach a terminal state.

use super::client::ApiResponse;
use super::{preview_body, GenerationApi};
use crate::constants::{FAILURE_STATUSES, SUCCESS_STATUSES};
use crate::error::{AppError, ResponseClass};
use crate::error_recovery::{with_backoff, BackoffError, RetryPolicy, Sleeper, Verdict};
use crate::model::{GenerationJob, JobStatus};
use crate::types::GenerationId;
use serde_json::Value;
use std::sync::Arc;

/// Places where a status string may appear in a status-check payload.
const STATUS_POINTERS: &[&str] = &["/status", "/data/status", "/result/status"];

/// Objects whose presence means the job produced its result.
const RESULT_POINTERS: &[&str] = &["/result", "/data/result"];

/// Deck links that only appear once a job is done.
const FINISHED_URL_POINTERS: &[&str] = &["/gammaUrl", "/data/gammaUrl", "/data/url", "/data/publicUrl"];

/// What a successful status-check payload says about the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    Pending,
    Completed,
    Failed,
}

impl RemoteState {
    /// Reads the job state from a payload of unknown shape.
    ///
    /// An explicit failure status wins; then a success status, a nested
    /// result object, or a finished deck link; anything else is pending.
    pub fn of(payload: &Value) -> Self {
        let status = STATUS_POINTERS
            .iter()
            .find_map(|pointer| payload.pointer(pointer).and_then(Value::as_str))
            .map(str::trim);

        let is_one_of = |candidates: &[&str]| {
            status.is_some_and(|s| candidates.iter().any(|c| s.eq_ignore_ascii_case(c)))
        };

        if is_one_of(FAILURE_STATUSES) {
            return Self::Failed;
        }
        if is_one_of(SUCCESS_STATUSES) {
            return Self::Completed;
        }
        let has_result = RESULT_POINTERS
            .iter()
            .any(|pointer| payload.pointer(pointer).is_some_and(Value::is_object));
        let has_deck_link = FINISHED_URL_POINTERS.iter().any(|pointer| {
            payload
                .pointer(pointer)
                .and_then(Value::as_str)
                .is_some_and(|url| !url.trim().is_empty())
        });
        if has_result || has_deck_link {
            Self::Completed
        } else {
            Self::Pending
        }
    }
}

/// Polls job status until it settles, backing off on throttled answers.
pub struct Poller {
    api: Arc<dyn GenerationApi>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Poller {
    pub fn new(api: Arc<dyn GenerationApi>, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            api,
            policy,
            sleeper,
        }
    }

    /// Issues at most `max_attempts` status checks and returns the completed job.
    ///
    /// Fails with [`AppError::GenerationFailed`] when the service reports a
    /// failure and with [`AppError::PollTimeout`] when attempts run out.
    pub async fn poll_until_terminal(&self, id: &GenerationId) -> Result<GenerationJob, AppError> {
        let api = self.api.as_ref();
        let max_attempts = self.policy.max_attempts;

        let outcome = with_backoff(
            &self.policy,
            self.sleeper.as_ref(),
            move |attempt| {
                log::debug!("Status check {}/{} for {}", attempt, max_attempts, id);
                api.fetch_generation(id)
            },
            |response| classify_status_check(id, response),
        )
        .await;

        match outcome {
            Ok(payload) => {
                let mut job = GenerationJob::pending(id.clone());
                job.transition(JobStatus::Completed, payload)?;
                log::info!("Generation {} completed", id);
                Ok(job)
            }
            Err(BackoffError::Fatal(err)) => Err(err),
            Err(BackoffError::Exhausted {
                attempts,
                throttled,
            }) => Err(AppError::PollTimeout {
                id: id.clone(),
                attempts,
                throttled,
            }),
        }
    }
}

/// Decides what one status check means.
///
/// Transport errors are retried like throttles: a status check is safe to repeat.
fn classify_status_check(
    id: &GenerationId,
    response: Result<ApiResponse<String>, AppError>,
) -> Verdict<Value> {
    let response = match response {
        Ok(response) => response,
        Err(err) => {
            log::warn!("Status check for {} failed: {}", id, err);
            return Verdict::Throttled { retry_after: None };
        }
    };

    match ResponseClass::from_status(response.status) {
        ResponseClass::Success => {
            let payload: Value = match serde_json::from_str(&response.data) {
                Ok(payload) => payload,
                Err(err) => {
                    return Verdict::Fatal(AppError::MalformedResponse(format!(
                        "status for {} is not JSON ({}): {}",
                        id,
                        err,
                        preview_body(&response.data)
                    )))
                }
            };
            match RemoteState::of(&payload) {
                RemoteState::Completed => Verdict::Ready(payload),
                RemoteState::Failed => Verdict::Fatal(AppError::GenerationFailed {
                    id: id.clone(),
                    body: response.data,
                }),
                RemoteState::Pending => {
                    log::info!("⏳ {} still pending", id);
                    Verdict::Pending
                }
            }
        }
        class if class.is_retryable() => {
            log::warn!("Status check for {} answered {} ({})", id, response.status, class);
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
