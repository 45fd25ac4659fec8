//! Wire types for the video generation backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value of the `status` field on a successful generation response.
pub const STATUS_SUCCESS: &str = "success";

/// A prompt submission.
///
/// Sent as the multipart form field `prompt`, not as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Body returned by `POST /generate-video`.
///
/// Every field is optional on decode: error bodies only carry `detail`, and a
/// 2xx body without `status: "success"` is an application-level failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub status: Option<String>,
    /// Playable video reference, usually a `data:video/mp4;base64,...` URI.
    #[serde(default)]
    pub video_data: Option<String>,
    #[serde(default)]
    pub original_prompt: Option<String>,
    #[serde(default)]
    pub enhanced_prompt: Option<String>,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub generation_timestamp: Option<String>,
    #[serde(default)]
    pub video_size_bytes: Option<u64>,
    #[serde(default)]
    pub enhancement_applied: Option<bool>,
    /// Server-supplied failure message.
    #[serde(default)]
    pub detail: Option<String>,
}

impl GenerationResponse {
    /// Whether the body reports application-level success.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }

    /// Convert a success body into a [`GenerationResult`].
    ///
    /// Returns the server `detail` (if any) when the body is not a success or
    /// carries no video reference.
    pub fn into_result(self) -> Result<GenerationResult, Option<String>> {
        if !self.is_success() {
            return Err(self.detail);
        }
        let Some(video_data) = self.video_data.filter(|v| !v.is_empty()) else {
            return Err(self
                .detail
                .or_else(|| Some("Response contained no video".to_string())));
        };

        Ok(GenerationResult {
            video_data,
            original_prompt: self.original_prompt.unwrap_or_default(),
            enhanced_prompt: self.enhanced_prompt.unwrap_or_default(),
            model_used: self.model_used.unwrap_or_default(),
            generation_timestamp: self.generation_timestamp,
            video_size_bytes: self.video_size_bytes,
        })
    }
}

/// A validated, successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// The video reference exactly as returned by the server.
    pub video_data: String,
    pub original_prompt: String,
    pub enhanced_prompt: String,
    pub model_used: String,
    pub generation_timestamp: Option<String>,
    pub video_size_bytes: Option<u64>,
}

/// Error body shape used by the backend for non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Extract `detail` as text. Validation errors may send a structured value.
    pub(crate) fn detail_text(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::String(_) | serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub api_configured: Option<bool>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Model section of `GET /api/info`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub primary_model: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub capabilities: Option<String>,
}

/// Body returned by `GET /api/info`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub api_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub features: BTreeMap<String, String>,
    #[serde(default)]
    pub model_details: Option<ModelDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success_body() -> GenerationResponse {
        serde_json::from_value(serde_json::json!({
            "status": "success",
            "video_data": "data:video/mp4;base64,AAAA",
            "original_prompt": "a fox in the snow",
            "enhanced_prompt": "a fox in the snow, natural lighting",
            "model_used": "Wan-AI/Wan2.2-TI2V-5B",
            "generation_timestamp": "2025-01-01 10:00:00",
            "video_size_bytes": 3,
            "enhancement_applied": true
        }))
        .unwrap()
    }

    #[test]
    fn test_success_body_converts_verbatim() {
        let result = success_body().into_result().unwrap();
        assert_eq!(result.video_data, "data:video/mp4;base64,AAAA");
        assert_eq!(result.original_prompt, "a fox in the snow");
        assert_eq!(result.enhanced_prompt, "a fox in the snow, natural lighting");
        assert_eq!(result.model_used, "Wan-AI/Wan2.2-TI2V-5B");
        assert_eq!(result.video_size_bytes, Some(3));
    }

    #[test]
    fn test_non_success_status_returns_detail() {
        let body: GenerationResponse = serde_json::from_value(serde_json::json!({
            "status": "queued",
            "detail": "still working"
        }))
        .unwrap();
        assert_eq!(body.into_result(), Err(Some("still working".to_string())));
    }

    #[test]
    fn test_missing_status_is_failure_without_detail() {
        let body: GenerationResponse = serde_json::from_str("{}").unwrap();
        assert!(!body.is_success());
        assert_eq!(body.into_result(), Err(None));
    }

    #[test]
    fn test_success_without_video_is_failure() {
        let mut body = success_body();
        body.video_data = None;
        assert_eq!(
            body.into_result(),
            Err(Some("Response contained no video".to_string()))
        );
    }

    #[test]
    fn test_error_body_detail_text() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": "Prompt must be at least 3 characters long"}"#)
                .unwrap();
        assert_eq!(
            body.detail_text().as_deref(),
            Some("Prompt must be at least 3 characters long")
        );

        let body: ErrorBody = serde_json::from_str(r#"{"detail": [{"msg": "field required"}]}"#)
            .unwrap();
        assert!(body.detail_text().unwrap().contains("field required"));

        let body: ErrorBody = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert!(body.detail_text().is_none());
    }

    #[test]
    fn test_health_status_deserialization() {
        let health: HealthStatus = serde_json::from_value(serde_json::json!({
            "status": "healthy",
            "service": "Video Generator",
            "version": "1.0.0",
            "api_configured": false,
            "features": ["Text-to-Video", "Download Support"]
        }))
        .unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.api_configured, Some(false));
        assert_eq!(health.features.len(), 2);
    }

    #[test]
    fn test_api_info_deserialization_tolerates_extra_fields() {
        let info: ApiInfo = serde_json::from_value(serde_json::json!({
            "api_name": "Video Generator",
            "version": "1.0.0",
            "developer": {"name": "someone"},
            "features": {"text_to_video": "Generate videos from text descriptions"},
            "model_details": {"primary_model": "Wan-AI/Wan2.2-TI2V-5B", "provider": "Replicate"}
        }))
        .unwrap();
        assert_eq!(info.api_name.as_deref(), Some("Video Generator"));
        assert_eq!(info.features.len(), 1);
        let model = info.model_details.unwrap();
        assert_eq!(model.primary_model.as_deref(), Some("Wan-AI/Wan2.2-TI2V-5B"));
        assert!(model.capabilities.is_none());
    }
}
