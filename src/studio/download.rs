//! DownloadHelper - saves a generated video to a timestamped file.

use std::path::{Path, PathBuf};

use base64::Engine;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::backend::GenerationResult;

/// Prefix of saved video files.
pub const FILENAME_PREFIX: &str = "ai-video-";

/// File name for a video saved at `at`.
///
/// The timestamp is ISO 8601 in UTC with `:` and `.` replaced by `-`, e.g.
/// `ai-video-2025-01-31T09-15-02-123Z.mp4`.
pub fn download_filename(at: DateTime<Utc>) -> String {
    format!("{}{}.mp4", FILENAME_PREFIX, at.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

/// Where the bytes of a video reference live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Bytes embedded in a `data:` URI.
    Inline { mime: String, bytes: Vec<u8> },
    /// Remote resource to fetch.
    Remote(String),
}

impl VideoSource {
    /// Interpret a video reference as returned by the backend.
    pub fn parse(reference: &str) -> Result<Self, DownloadError> {
        if let Some(rest) = reference.strip_prefix("data:") {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| DownloadError::InvalidDataUri("missing ',' separator".to_string()))?;
            let Some(mime) = meta.strip_suffix(";base64") else {
                return Err(DownloadError::InvalidDataUri(
                    "only base64 data URIs are supported".to_string(),
                ));
            };
            let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
            return Ok(VideoSource::Inline {
                mime: mime.to_string(),
                bytes,
            });
        }

        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(VideoSource::Remote(reference.to_string()));
        }

        Err(DownloadError::UnsupportedReference(
            reference.chars().take(32).collect(),
        ))
    }
}

/// Saves video references to a download directory.
#[derive(Debug, Clone)]
pub struct DownloadHelper {
    dir: PathBuf,
    http_client: reqwest::Client,
}

impl DownloadHelper {
    pub fn new(dir: PathBuf, http_client: reqwest::Client) -> Self {
        Self { dir, http_client }
    }

    /// Default download directory: the user's download folder, else the
    /// current directory.
    pub fn default_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save the video of a successful generation, named after the current time.
    pub async fn save(&self, result: &GenerationResult) -> Result<PathBuf, DownloadError> {
        self.save_reference(&result.video_data, Utc::now()).await
    }

    /// Save a video reference under the name for `at`.
    ///
    /// Bytes are written to a `.part` file first and renamed into place, so a
    /// failed save never leaves a truncated `.mp4` behind.
    pub async fn save_reference(&self, reference: &str, at: DateTime<Utc>) -> Result<PathBuf, DownloadError> {
        let source = VideoSource::parse(reference)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let dest = self.dir.join(download_filename(at));
        let partial = dest.with_extension("mp4.part");

        let written = match self.write_source(&source, &partial).await {
            Ok(n) => n,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        if written == 0 {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(DownloadError::Empty);
        }

        tokio::fs::rename(&partial, &dest).await?;
        log::info!("Saved video ({} bytes) to {}", written, dest.display());
        Ok(dest)
    }

    async fn write_source(&self, source: &VideoSource, path: &Path) -> Result<u64, DownloadError> {
        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0u64;

        match source {
            VideoSource::Inline { bytes, .. } => {
                file.write_all(bytes).await?;
                written = bytes.len() as u64;
            }
            VideoSource::Remote(url) => {
                let response = self.http_client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(DownloadError::Status(response.status().as_u16()));
                }
                let mut stream = response.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk?;
                    file.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                }
            }
        }

        file.flush().await?;
        Ok(written)
    }
}

/// Errors that can occur while saving a video.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Unsupported video reference: {0}")]
    UnsupportedReference(String),

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Video download failed with HTTP {0}")]
    Status(u16),

    #[error("Video is empty")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
