// src/api/client.rs
//! Pure HTTP client wrapper for the generation API.
//!
//! This module provides a thin wrapper around reqwest for making
//! HTTP requests to the generation service. It handles authentication,
//! URL building and response capture without any retry or parsing logic.

use super::types::GenerationBody;
use super::GenerationApi;
use crate::config::ClientConfig;
use crate::constants::API_KEY_HEADER;
use crate::error::AppError;
use crate::error_recovery::parse_retry_after;
use crate::types::{ApiKey, GenerationId, ValidatedUrl};
use reqwest::{header, Client, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// A thin wrapper around reqwest Client for generation API requests.
#[derive(Clone)]
pub struct GammaHttpClient {
    client: Client,
    base: ValidatedUrl,
}

impl GammaHttpClient {
    /// Creates a new HTTP client carrying the API key on every request.
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(&config.api_key)?)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base: config.api_base.clone(),
        })
    }

    /// Creates the default headers for generation API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let mut key = header::HeaderValue::from_str(api_key.as_str()).map_err(|e| {
            AppError::MissingConfiguration(format!("Invalid API key format: {}", e))
        })?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Joins path segments onto the API base, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base.as_url().clone();
        url.path_segments_mut()
            .map_err(|_| AppError::InternalError {
                message: format!("API base {} cannot carry a path", self.base),
                source: None,
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Makes a GET request to the endpoint formed from `segments`.
    pub async fn get(&self, segments: &[&str]) -> Result<ApiResponse<String>, AppError> {
        let url = self.endpoint(segments)?;
        log::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        extract_response_text(response).await
    }

    /// Makes a POST request with a JSON body to the endpoint formed from `segments`.
    pub async fn post<T: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &T,
    ) -> Result<ApiResponse<String>, AppError> {
        let url = self.endpoint(segments)?;
        log::debug!("POST {}", url);

        let response = self.client.post(url).json(body).send().await?;
        extract_response_text(response).await
    }
}

#[async_trait::async_trait]
impl GenerationApi for GammaHttpClient {
    async fn create_generation(
        &self,
        body: &GenerationBody,
    ) -> Result<ApiResponse<String>, AppError> {
        self.post(&["generations"], body).await
    }

    async fn fetch_generation(&self, id: &GenerationId) -> Result<ApiResponse<String>, AppError> {
        self.get(&["generations", id.as_str()]).await
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: StatusCode,
    pub url: String,
    /// Wait requested by the server via `Retry-After`, if any.
    pub retry_after: Option<Duration>,
}

impl ApiResponse<String> {
    /// A response with the given status and body, as if received from `url`.
    pub fn new(status: StatusCode, body: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            data: body.into(),
            status,
            url: url.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, wait: Duration) -> Self {
        self.retry_after = Some(wait);
        self
    }
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_retry_after);
    let text = response.text().await?;

    log::debug!("{} answered {} ({} bytes)", url, status, text.len());

    Ok(ApiResponse {
        data: text,
        status,
        url,
        retry_after,
    })
}
