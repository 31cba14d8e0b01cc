//! Archive download with progress reporting
//!
//! Archives are streamed into memory chunk by chunk; the progress callback
//! fires after every chunk, so callers see movement before the body is
//! complete. There are no retries: every failure goes back to the caller.

use crate::error::{Error, Result};
use envkeeper_core::types::NetworkConfig;
use futures_util::StreamExt;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound for buffer space reserved from an announced content length
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Download progress information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes received so far
    pub downloaded_bytes: u64,

    /// Content length, when the server announced one
    pub total_bytes: Option<u64>,
}

impl DownloadProgress {
    /// Create a progress tracker
    pub fn new(total_bytes: Option<u64>) -> Self {
        Self {
            downloaded_bytes: 0,
            total_bytes,
        }
    }

    /// Fraction complete in `0.0..=1.0`, or `None` when indeterminate
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some((self.downloaded_bytes as f64 / total as f64).min(1.0)),
            None => None,
        }
    }

    /// Check if the announced length has been reached
    pub fn is_complete(&self) -> bool {
        self.total_bytes
            .map(|total| self.downloaded_bytes >= total)
            .unwrap_or(false)
    }
}

/// HTTP downloader for platform archives
#[derive(Debug, Clone)]
pub struct ArchiveDownloader {
    client: reqwest::Client,
}

impl ArchiveDownloader {
    /// Create a downloader using the configured timeouts and user agent
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&network.user_agent)
            .connect_timeout(Duration::from_secs(network.http_timeout_secs))
            .timeout(Duration::from_secs(network.download_timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// Download `url` into memory, reporting progress after every chunk
    pub async fn download<F>(&self, url: &str, mut on_progress: F) -> Result<Vec<u8>>
    where
        F: FnMut(&DownloadProgress),
    {
        info!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transfer(url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::version_not_found(url));
        }
        if !status.is_success() {
            return Err(Error::download_failed(url, status.as_u16()));
        }

        let mut progress = DownloadProgress::new(response.content_length());
        let mut buffer = Vec::with_capacity(initial_capacity(progress.total_bytes));
        on_progress(&progress);

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes = chunk.map_err(|e| Error::transfer(url, e))?;
            buffer.extend_from_slice(&chunk);
            progress.downloaded_bytes += chunk.len() as u64;
            on_progress(&progress);
        }

        if let Some(expected) = progress.total_bytes {
            if !progress.is_complete() {
                return Err(Error::Truncated {
                    url: url.to_string(),
                    expected,
                    received: progress.downloaded_bytes,
                });
            }
        }

        debug!("Downloaded {} bytes from {}", buffer.len(), url);
        Ok(buffer)
    }
}

/// Buffer space to reserve up front; the server's length is only a hint
fn initial_capacity(total_bytes: Option<u64>) -> usize {
    total_bytes.unwrap_or(0).min(MAX_PREALLOCATION) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_capacity_is_capped() {
        assert_eq!(initial_capacity(None), 0);
        assert_eq!(initial_capacity(Some(4096)), 4096);
        assert_eq!(initial_capacity(Some(1 << 46)), MAX_PREALLOCATION as usize);
    }

    #[test]
    fn test_progress_fraction_known_length() {
        let mut progress = DownloadProgress::new(Some(1000));
        assert_eq!(progress.fraction(), Some(0.0));
        assert!(!progress.is_complete());

        progress.downloaded_bytes = 500;
        assert_eq!(progress.fraction(), Some(0.5));

        progress.downloaded_bytes = 1000;
        assert_eq!(progress.fraction(), Some(1.0));
        assert!(progress.is_complete());
    }

    #[test]
    fn test_progress_indeterminate() {
        let mut progress = DownloadProgress::new(None);
        progress.downloaded_bytes = 4096;
        assert_eq!(progress.fraction(), None);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_progress_empty_body() {
        let progress = DownloadProgress::new(Some(0));
        assert_eq!(progress.fraction(), Some(1.0));
        assert!(progress.is_complete());
    }
}
