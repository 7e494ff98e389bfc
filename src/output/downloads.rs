//! Fetching exported deck files over HTTP.

use crate::error::AppError;
use crate::pipeline::ExportFetcher;
use std::path::Path;
use std::time::Duration;

/// Downloads export files with a plain HTTP client.
///
/// Export links are pre-signed, so no API key is sent with them.
#[derive(Debug, Clone)]
pub struct HttpExportFetcher {
    client: reqwest::Client,
}

impl HttpExportFetcher {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ExportFetcher for HttpExportFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, AppError> {
        log::debug!("Downloading {} to {}", url, destination.display());

        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(destination, &bytes).await?;

        log::info!(
            "Saved export {} ({} bytes)",
            destination.display(),
            bytes.len()
        );
        Ok(bytes.len() as u64)
    }
}
