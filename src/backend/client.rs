//! VideoClient - handles communication with the video generation backend.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::types::{ApiInfo, ErrorBody, GenerationRequest, GenerationResponse, GenerationResult, HealthStatus};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable that overrides the configured backend URL.
pub const SERVER_URL_ENV: &str = "REELPROMPT_SERVER_URL";

/// Path of the generation endpoint.
pub const GENERATE_PATH: &str = "/generate-video";

/// Path of the health check endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Path of the API information endpoint.
pub const API_INFO_PATH: &str = "/api/info";

/// Shortest accepted prompt, in characters, after trimming.
pub const MIN_PROMPT_CHARS: usize = 3;

/// Longest accepted prompt, in characters, after trimming.
pub const MAX_PROMPT_CHARS: usize = 200;

/// Message shown when the server gives no usable detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate video";

/// Default timeout for a whole generation request (5 minutes).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the small metadata endpoints.
const METADATA_TIMEOUT: Duration = Duration::from_secs(15);

/// Validate a prompt before sending it to the backend.
///
/// Lengths are counted in characters of the trimmed prompt.
pub fn validate_prompt(prompt: &str) -> Result<(), ClientError> {
    let chars = prompt.trim().chars().count();

    if chars < MIN_PROMPT_CHARS {
        return Err(ClientError::PromptTooShort {
            min: MIN_PROMPT_CHARS,
        });
    }
    if chars > MAX_PROMPT_CHARS {
        return Err(ClientError::PromptTooLong {
            max: MAX_PROMPT_CHARS,
            actual: chars,
        });
    }

    Ok(())
}

/// Client for the video generation backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct VideoClient {
    base_url: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl VideoClient {
    /// Create a client for the given base URL with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with an explicit timeout for generation requests.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url,
            timeout,
            http_client,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the generation request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The underlying HTTP client, shared with the download helper.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit a prompt and wait for the generated video.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::PromptTooShort` / `PromptTooLong` without touching
    /// the network, `ClientError::Server` for non-2xx responses,
    /// `ClientError::Application` when the body does not report success,
    /// `ClientError::Timeout` when the request exceeds the configured timeout,
    /// or `ClientError::Http` for transport failures.
    pub async fn generate(&self, prompt: &str) -> Result<GenerationResult, ClientError> {
        self.generate_cancellable(prompt, &CancellationToken::new())
            .await
    }

    /// Like [`generate`](Self::generate), but abandons the request as soon as
    /// `cancel` fires, returning `ClientError::Cancelled`.
    pub async fn generate_cancellable(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, ClientError> {
        validate_prompt(prompt)?;
        let request = GenerationRequest::new(prompt.trim());

        log::info!("Submitting generation request ({} chars)", request.prompt.chars().count());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::warn!("Generation request cancelled");
                Err(ClientError::Cancelled)
            }
            outcome = tokio::time::timeout(self.timeout, self.send_generation(&request)) => {
                match outcome {
                    Ok(result) => result,
                    Err(_) => {
                        log::error!("Generation request timed out after {:?}", self.timeout);
                        Err(ClientError::Timeout(self.timeout))
                    }
                }
            }
        }
    }

    async fn send_generation(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
        let form = reqwest::multipart::Form::new().text("prompt", request.prompt.clone());

        let response = self
            .http_client
            .post(self.url(GENERATE_PATH))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::detail_text);
            log::error!(
                "Generation failed with status {}: {}",
                status,
                detail.as_deref().unwrap_or("<no detail>")
            );
            return Err(ClientError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: GenerationResponse = serde_json::from_str(&body)?;
        match parsed.into_result() {
            Ok(result) => {
                log::info!(
                    "Generation succeeded with model {} ({} bytes)",
                    result.model_used,
                    result
                        .video_size_bytes
                        .map(|b| b.to_string())
                        .unwrap_or_else(|| "?".to_string())
                );
                Ok(result)
            }
            Err(detail) => {
                log::error!(
                    "Backend reported failure: {}",
                    detail.as_deref().unwrap_or("<no detail>")
                );
                Err(ClientError::Application { detail })
            }
        }
    }

    /// Query `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get_json(HEALTH_PATH).await
    }

    /// Query `GET /api/info`.
    pub async fn api_info(&self) -> Result<ApiInfo, ClientError> {
        self.get_json(API_INFO_PATH).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .http_client
            .get(self.url(path))
            .timeout(METADATA_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::detail_text);
            return Err(ClientError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Errors that can occur while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Prompt must be at least {min} characters long")]
    PromptTooShort { min: usize },

    #[error("Prompt must be at most {max} characters long (got {actual})")]
    PromptTooLong { max: usize, actual: usize },

    #[error("Invalid server URL: '{0}'")]
    InvalidBaseUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned HTTP {status}: {}", .detail.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Server {
        /// HTTP status code
        status: u16,
        /// `detail` field of the error body, if any
        detail: Option<String>,
    },

    #[error("Generation failed: {}", .detail.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Application {
        /// `detail` field of the body, if any
        detail: Option<String>,
    },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Message for the error panel.
    ///
    /// Failures show the server's `detail` verbatim. Without one, a non-2xx
    /// response shows its HTTP status and anything else shows
    /// [`GENERIC_FAILURE_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server { status, detail } => detail
                .clone()
                .unwrap_or_else(|| format!("HTTP error! status: {}", status)),
            ClientError::Application { detail } => detail
                .clone()
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            ClientError::Decode(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            ClientError::Http(e) if e.is_connect() => {
                "Could not reach the video server".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether the error was raised before any network activity.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::PromptTooShort { .. } | ClientError::PromptTooLong { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_timeout() {
        let client = VideoClient::new("http://localhost:8000").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = VideoClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url(GENERATE_PATH), "http://localhost:8000/generate-video");
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        assert!(matches!(
            VideoClient::new(""),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_validate_prompt_bounds() {
        assert!(matches!(
            validate_prompt(""),
            Err(ClientError::PromptTooShort { min: 3 })
        ));
        assert!(matches!(
            validate_prompt("  ab  "),
            Err(ClientError::PromptTooShort { .. })
        ));
        assert!(validate_prompt("abc").is_ok());
        assert!(validate_prompt(&"x".repeat(200)).is_ok());
        assert!(matches!(
            validate_prompt(&"x".repeat(201)),
            Err(ClientError::PromptTooLong {
                max: 200,
                actual: 201
            })
        ));
    }

    #[test]
    fn test_validate_prompt_counts_characters_not_bytes() {
        // three characters, nine bytes
        assert!(validate_prompt("日本語").is_ok());
        assert!(validate_prompt(&"é".repeat(200)).is_ok());
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ClientError::Server {
            status: 500,
            detail: Some("Video generation failed: quota".to_string()),
        };
        assert_eq!(err.user_message(), "Video generation failed: quota");

        let err = ClientError::Server {
            status: 502,
            detail: None,
        };
        assert_eq!(err.user_message(), "HTTP error! status: 502");

        let err = ClientError::Application { detail: None };
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ClientError::Cancelled.to_string(), "Request cancelled");
        assert_eq!(
            ClientError::Timeout(Duration::from_secs(30)).to_string(),
            "Request timed out after 30s"
        );
        assert_eq!(
            ClientError::Server {
                status: 400,
                detail: Some("bad".to_string())
            }
            .to_string(),
            "Server returned HTTP 400: bad"
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(ClientError::PromptTooShort { min: 3 }.is_validation());
        assert!(!ClientError::Cancelled.is_validation());
    }

    #[tokio::test]
    async fn test_generate_rejects_short_prompt_without_network() {
        // Port 9 is discard; a network attempt would fail with Http, not PromptTooShort.
        let client = VideoClient::new("http://127.0.0.1:9").unwrap();
        let result = client.generate("hi").await;
        assert!(matches!(result, Err(ClientError::PromptTooShort { .. })));
    }

    #[tokio::test]
    async fn test_generate_cancellable_honours_pre_cancelled_token() {
        let client = VideoClient::new("http://127.0.0.1:9").unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let result = client.generate_cancellable("a valid prompt", &token).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }
}
