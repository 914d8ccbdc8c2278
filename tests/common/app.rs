//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use molar::assets::AssetLoader;
use molar::models::AppConfig;
use molar::server::{build_router, create_app_state, AppState};
use molar::services::{AnalysisClient, MockAnalysisClient};

use super::fixtures::{self, MultipartForm};

/// Canned analysis text returned by the default mock client
pub const MOCK_ANALYSIS: &str = "No caries detected. Bone levels within normal limits.";

/// Test application with router, the mock analyst and a one-cookie jar
pub struct TestApp {
    router: axum::Router,
    pub state: AppState,
    pub analyst: Arc<MockAnalysisClient>,
    cookie: Mutex<Option<String>>,
}

impl TestApp {
    /// Create a test application using embedded assets and a succeeding mock
    pub fn new() -> Self {
        Self::with_analyst(MockAnalysisClient::new(MOCK_ANALYSIS))
    }

    /// Create a test application whose analysis calls all fail
    pub fn failing(message: &str) -> Self {
        Self::with_analyst(MockAnalysisClient::failing(message))
    }

    pub fn with_analyst(analyst: MockAnalysisClient) -> Self {
        let analyst = Arc::new(analyst);
        Self::build(AppConfig::default(), analyst.clone(), analyst)
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let analyst = Arc::new(MockAnalysisClient::new(MOCK_ANALYSIS));
        Self::build(config, analyst.clone(), analyst)
    }

    /// Create a test application whose handlers call `client`; `analyst`
    /// is the recording mock behind it
    pub fn with_client(analyst: Arc<MockAnalysisClient>, client: Arc<dyn AnalysisClient>) -> Self {
        Self::build(AppConfig::default(), analyst, client)
    }

    fn build(
        config: AppConfig,
        analyst: Arc<MockAnalysisClient>,
        client: Arc<dyn AnalysisClient>,
    ) -> Self {
        let state = create_app_state(&AssetLoader::default(), config, client)
            .expect("Failed to create app state");
        let router = build_router(state.clone());

        Self {
            router,
            state,
            analyst,
            cookie: Mutex::new(None),
        }
    }

    /// The `name=value` pair of the current session cookie, if any
    pub fn cookie(&self) -> Option<String> {
        self.cookie.lock().unwrap().clone()
    }

    /// Forget the session cookie, as a fresh browser would
    pub fn clear_cookie(&self) {
        *self.cookie.lock().unwrap() = None;
    }

    /// Replace the session cookie with an arbitrary value
    pub fn set_cookie(&self, cookie: &str) {
        *self.cookie.lock().unwrap() = Some(cookie.to_string());
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path), Body::empty()).await
    }

    /// Fetch the page and return its HTML
    pub async fn page(&self) -> String {
        let response = self.get("/").await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        response.text()
    }

    /// Make a url-encoded form POST; repeated keys stay repeated
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let builder = Request::post(path).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.request(builder, Body::from(fixtures::urlencode(fields)))
            .await
    }

    /// Make a multipart POST
    pub async fn post_multipart(&self, path: &str, form: MultipartForm) -> TestResponse {
        let builder = Request::post(path).header(header::CONTENT_TYPE, form.content_type());
        self.request(builder, Body::from(form.into_body())).await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> TestResponse {
        let builder = Request::post(path).header(header::CONTENT_TYPE, "application/json");
        self.request(builder, Body::from(body.to_string())).await
    }

    /// Save a patient through the sidebar form
    pub async fn save_patient(&self, fields: &[(&str, &str)]) -> TestResponse {
        self.post_form("/patient", fields).await
    }

    /// Upload a PNG through the page's upload form
    pub async fn upload_png(&self, file_name: &str, bytes: Vec<u8>) -> TestResponse {
        let form = MultipartForm::new().file("xray", file_name, "image/png", bytes);
        self.post_multipart("/xray", form).await
    }

    /// Send a request to the router, carrying and collecting the cookie
    async fn request(&self, mut builder: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = self.cookie() {
            builder = builder.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();

        if let Some(set_cookie) = headers.get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            *self.cookie.lock().unwrap() = Some(pair);
        }

        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get a header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
