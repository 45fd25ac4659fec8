//! Video generation backend integration.
//!
//! The backend accepts a prompt on `POST /generate-video`, forwards it to a
//! hosted text-to-video model and answers with the video as a `data:` URI plus
//! the server-enhanced prompt.

mod client;
mod types;

pub use client::{
    validate_prompt, ClientError, VideoClient, API_INFO_PATH, DEFAULT_BASE_URL,
    DEFAULT_REQUEST_TIMEOUT, GENERATE_PATH, GENERIC_FAILURE_MESSAGE, HEALTH_PATH,
    MAX_PROMPT_CHARS, MIN_PROMPT_CHARS, SERVER_URL_ENV,
};
pub use types::{
    ApiInfo, GenerationRequest, GenerationResponse, GenerationResult, HealthStatus, ModelDetails,
    STATUS_SUCCESS,
};
