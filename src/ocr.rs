//! Remote text recognition for receipt photos.
//!
//! The recognition service is an external collaborator: given raw image
//! bytes it returns the recognized text, or nothing when the image carries no
//! readable text. This module speaks the Google Vision `images:annotate`
//! protocol. The service is invoked at most once per photo event; there is no
//! retry loop, and callers degrade any failure to the same user-facing path
//! as an empty recognition.

use std::env;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024; // 10MB limit for image files

/// Configuration for the recognition client.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Annotate endpoint URL.
    pub endpoint: String,
    /// API key passed as the `key` query parameter.
    pub api_key: String,
    /// Timeout for one recognition call in seconds.
    pub timeout_secs: u64,
    /// Maximum accepted image size in bytes.
    pub max_image_bytes: usize,
}

impl OcrConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }

    /// Build the configuration from `VISION_API_KEY` and the optional
    /// `VISION_ENDPOINT` / `OCR_TIMEOUT_SECS` overrides.
    pub fn from_env() -> Result<Self, OcrError> {
        let api_key = env::var("VISION_API_KEY")
            .map_err(|_| OcrError::Configuration("VISION_API_KEY must be set".to_string()))?;

        let mut config = Self::new(api_key);
        if let Ok(endpoint) = env::var("VISION_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("OCR_TIMEOUT_SECS") {
            config.timeout_secs = timeout
                .parse()
                .map_err(|_| OcrError::Configuration("OCR_TIMEOUT_SECS must be a number".to_string()))?;
        }
        Ok(config)
    }
}

/// Custom error types for recognition calls.
#[derive(Debug, Clone)]
pub enum OcrError {
    /// Configuration errors
    Configuration(String),
    /// Input validation errors
    Validation(String),
    /// Transport-level request errors
    Request(String),
    /// Timeout errors
    Timeout(String),
    /// Malformed service responses
    Decode(String),
}

impl std::fmt::Display for OcrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            OcrError::Validation(msg) => write!(f, "Validation error: {msg}"),
            OcrError::Request(msg) => write!(f, "Request error: {msg}"),
            OcrError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            OcrError::Decode(msg) => write!(f, "Decode error: {msg}"),
        }
    }
}

impl std::error::Error for OcrError {}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OcrError::Timeout(err.to_string())
        } else {
            OcrError::Request(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Deserialize, Default)]
struct AnnotateResult {
    #[serde(default, rename = "textAnnotations")]
    text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Client for the remote text recognition service.
pub struct TextRecognizer {
    client: reqwest::Client,
    config: OcrConfig,
}

impl TextRecognizer {
    pub fn new(config: OcrConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OcrError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Recognize text in raw image bytes.
    ///
    /// Returns `Ok(None)` when the service found no text in the image.
    pub async fn recognize(&self, image: &[u8]) -> Result<Option<String>, OcrError> {
        if image.is_empty() {
            return Err(OcrError::Validation("empty image payload".to_string()));
        }
        if image.len() > self.config.max_image_bytes {
            return Err(OcrError::Validation(format!(
                "image of {} bytes exceeds the {} byte limit",
                image.len(),
                self.config.max_image_bytes
            )));
        }

        debug!(bytes = image.len(), "Submitting image for text recognition");

        let body = serde_json::json!({
            "requests": [{
                "image": { "content": BASE64.encode(image) },
                "features": [{ "type": "TEXT_DETECTION" }],
            }]
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| OcrError::Decode(e.to_string()))?;

        let text = first_description(parsed)?;
        info!(
            chars_recognized = text.as_deref().map(str::len).unwrap_or(0),
            "Text recognition completed"
        );
        Ok(text)
    }
}

/// Reduce an annotate response to the full recognized text, if any.
///
/// The first annotation carries the whole recognized block; the rest are
/// per-word fragments and are ignored.
fn first_description(parsed: AnnotateResponse) -> Result<Option<String>, OcrError> {
    let Some(result) = parsed.responses.into_iter().next() else {
        return Ok(None);
    };

    if let Some(error) = result.error {
        return Err(OcrError::Request(error.message));
    }

    match result.text_annotations.into_iter().next() {
        Some(annotation) if !annotation.description.trim().is_empty() => {
            Ok(Some(annotation.description))
        }
        _ => Ok(None),
    }
}
