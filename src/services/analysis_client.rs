//! Remote analysis through the Gemini `generateContent` endpoint.

use super::credentials::ApiKey;
use super::prompt_builder;
use crate::models::{AnalysisRequest, AnalysisResult, AppConfig, EncodedImage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Could not reach the analysis service: {0}")]
    Connection(String),

    #[error("Analysis request timed out after {0}s")]
    Timeout(u64),

    #[error("Analysis service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Analysis was blocked: {0}")]
    Blocked(String),

    #[error("Analysis service returned no text (finish reason: {0})")]
    EmptyResponse(String),

    #[error("Failed to parse analysis response: {0}")]
    ResponseParsing(String),
}

/// A service that turns an [`AnalysisRequest`] into free text
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError>;

    /// Model identifier, for logs and the status page
    fn model(&self) -> &str;
}

/// HTTP client for the Generative Language API
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: ApiKey,
    send_image: bool,
    timeout: Option<Duration>,
}

impl GeminiClient {
    pub fn new(api_key: ApiKey, config: &AppConfig) -> Result<Self, AnalysisError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AnalysisError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            send_image: config.analysis.send_image,
            timeout: config.timeout(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn request_body(&self, request: &AnalysisRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: prompt_builder::build(request.patient(), request.focus_areas()),
        }];
        if self.send_image {
            parts.push(Part::inline_png(request.image()));
        }
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        }
    }
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

impl Part {
    fn inline_png(image: &EncodedImage) -> Self {
        Part::InlineData {
            inline_data: Blob {
                mime_type: EncodedImage::MIME_TYPE,
                data: image.base64.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, AnalysisError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(AnalysisError::Blocked(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse(
                candidate
                    .finish_reason
                    .unwrap_or_else(|| "unknown".to_string()),
            ));
        }
        Ok(text)
    }
}

/// Prefer the API's own error message over the bare status line
fn remote_error(status: reqwest::StatusCode, body: &str) -> AnalysisError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
    AnalysisError::Remote {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let body = self.request_body(request);

        tracing::info!(
            model = %self.model,
            focus_areas = request.focus_areas().len(),
            with_image = self.send_image,
            "Requesting analysis"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(self.timeout.map(|t| t.as_secs()).unwrap_or_default())
                } else {
                    AnalysisError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(remote_error(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;
        let text = parsed.into_text()?;

        tracing::info!(chars = text.len(), "Analysis received");
        Ok(AnalysisResult::new(text))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Mock analysis client for testing — returns a configurable outcome and
/// remembers the prompts it was asked about.
pub struct MockAnalysisClient {
    outcome: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockAnalysisClient {
    pub fn new(response: &str) -> Self {
        Self {
            outcome: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails with a remote error carrying `message`
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AnalysisClient for MockAnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt_builder::build(
                request.patient(),
                request.focus_areas(),
            ));
        }
        match &self.outcome {
            Ok(text) => Ok(AnalysisResult::new(text.clone())),
            Err(message) => Err(AnalysisError::Remote {
                status: 500,
                message: message.clone(),
            }),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
