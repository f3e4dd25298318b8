use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::SourceError;
use crate::providers::ArchiveSource;

/// Response of the archives listing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ArchivesResponse {
    /// One URL per month with recorded games
    pub archives: Vec<String>,
}

/// chess.com public API client
#[derive(Debug)]
pub struct ChessComClient {
    /// Base URL of the public API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// chess.com client implementation - some methods are API surface for library consumers
#[allow(dead_code)]
impl ChessComClient {
    /// Create a new client against the given API base URL
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // The public API throttles clients without an identifying agent
                .user_agent(concat!("pgnexport/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }

    /// Create a new client with explicit retry configuration
    pub fn new_with_retries(
        base_url: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        let mut client = Self::new(base_url, timeout_secs);
        client.max_retries = max_retries;
        client.backoff_base_ms = backoff_base_ms;
        client
    }

    /// Derive the on-disk file name for a monthly archive URL.
    ///
    /// Archive URLs end in `.../games/{year}/{month}`; the download is
    /// saved as `{year}{month}.pgn` so a plain name sort restores
    /// chronological order before concatenation.
    pub fn archive_file_name(archive_url: &str) -> Result<String, SourceError> {
        let parsed = Url::parse(archive_url).map_err(|e| {
            SourceError::ParseError(format!("Invalid archive URL {}: {}", archive_url, e))
        })?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [.., year, month] => Ok(format!("{}{}.pgn", year, month)),
            _ => Err(SourceError::ParseError(format!(
                "Archive URL has no year/month segments: {}",
                archive_url
            ))),
        }
    }

    /// GET a URL as text with retry and exponential backoff
    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(self.backoff_base_ms << (attempt - 1));
                debug!(
                    "Retrying {} after {:?} (attempt {}/{})",
                    url, backoff, attempt, self.max_retries
                );
                tokio::time::sleep(backoff).await;
            }
            attempt += 1;

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.text().await.map_err(|e| {
                            SourceError::RequestFailed(format!(
                                "Failed to read response body from {}: {}",
                                url, e
                            ))
                        });
                    }

                    let status_code = status.as_u16();
                    if status_code == 429 {
                        // Backed-off retry is exactly what a 429 asks for
                        last_error = Some(SourceError::RateLimitExceeded(format!(
                            "{} answered 429",
                            url
                        )));
                        continue;
                    }

                    let message = response.text().await.unwrap_or_default();
                    let error = SourceError::ApiError {
                        status_code,
                        message,
                    };
                    if status.is_client_error() {
                        // 4xx (unknown user, gone archive) will not improve on retry
                        return Err(error);
                    }
                    last_error = Some(error);
                }
                Err(e) => {
                    last_error = Some(SourceError::ConnectionError(e.to_string()));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| SourceError::RequestFailed(format!("No attempts made for {}", url))))
    }
}

#[async_trait]
impl ArchiveSource for ChessComClient {
    async fn archive_urls(&self, username: &str) -> Result<Vec<String>, SourceError> {
        let url = format!("{}/player/{}/games/archives", self.base_url, username);
        let body = self.get_text(&url).await?;

        let parsed: ArchivesResponse = serde_json::from_str(&body).map_err(|e| {
            SourceError::ParseError(format!("Archives listing for {}: {}", username, e))
        })?;

        debug!(
            "Found {} monthly archives for {}",
            parsed.archives.len(),
            username
        );
        Ok(parsed.archives)
    }

    async fn fetch_pgn(&self, archive_url: &str) -> Result<String, SourceError> {
        self.get_text(&format!("{}/pgn", archive_url)).await
    }

    async fn test_connection(&self, username: &str) -> Result<(), SourceError> {
        let url = format!("{}/player/{}", self.base_url, username);
        self.get_text(&url).await.map(|_| ())
    }
}
