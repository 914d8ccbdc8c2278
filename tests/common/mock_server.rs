//! Mock Generative Language API for testing the analysis client.

use std::time::Duration;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use molar::models::AppConfig;

/// Model name the mock serves
pub const MODEL: &str = "gemini-1.5-flash";

/// Key the mock expects in `x-goog-api-key`
pub const API_KEY: &str = "test-key-123";

/// Wrapper around wiremock MockServer with Gemini-shaped responses
pub struct MockGemini {
    pub server: MockServer,
}

impl MockGemini {
    /// Start a new mock server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// App config pointing at this server
    pub fn config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.server.uri(),
            model: MODEL.to_string(),
            ..AppConfig::default()
        }
    }

    fn endpoint() -> String {
        format!("/v1beta/models/{MODEL}:generateContent")
    }

    async fn respond(&self, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(Self::endpoint()))
            .and(header("x-goog-api-key", API_KEY))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// Answer with one candidate whose text is split over `parts`
    pub async fn mock_text(&self, parts: &[&str]) {
        let parts: Vec<_> = parts
            .iter()
            .map(|text| serde_json::json!({ "text": text }))
            .collect();
        self.respond(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": parts },
                "finishReason": "STOP"
            }]
        })))
        .await;
    }

    /// Answer with a slow success
    pub async fn mock_delayed(&self, delay: Duration) {
        self.respond(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "candidates": [{ "content": { "parts": [{ "text": "late" }] } }]
                }))
                .set_delay(delay),
        )
        .await;
    }

    /// Answer with an API error envelope
    pub async fn mock_error(&self, status: u16, message: &str) {
        self.respond(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "error": { "code": status, "message": message, "status": "ERROR" }
        })))
        .await;
    }

    /// Answer with a non-JSON error body
    pub async fn mock_plain_error(&self, status: u16) {
        self.respond(ResponseTemplate::new(status).set_body_string("upstream exploded"))
            .await;
    }

    /// Answer with no candidates and a block reason
    pub async fn mock_blocked(&self, reason: &str) {
        self.respond(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "promptFeedback": { "blockReason": reason }
        })))
        .await;
    }

    /// Answer with a candidate that carries no text
    pub async fn mock_empty(&self, finish_reason: &str) {
        self.respond(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": finish_reason }]
        })))
        .await;
    }

    /// JSON bodies of all requests received so far
    pub async fn received_bodies(&self) -> Vec<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}
