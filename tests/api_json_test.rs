//! JSON API: /api/enhance, /api/prompt, /api/analysis.

mod common;

use axum::http::StatusCode;
use base64::Engine;
use pretty_assertions::assert_eq;

use common::app::MOCK_ANALYSIS;
use common::fixtures::{self, patient_json, MultipartForm};
use common::{assert_json_error, assert_ok, TestApp};

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[tokio::test]
async fn test_enhance_returns_png() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .file("xray", "scan.png", "image/png", fixtures::xray_png(40, 30))
        .text("denoise_strength", "6")
        .text("contrast_limit", "3.0");
    let response = app.post_multipart("/api/enhance", form).await;
    assert_ok(&response);

    let json: serde_json::Value = response.json();
    assert_eq!(json["width"], 40);
    assert_eq!(json["height"], 30);
    assert_eq!(json["denoise_strength"], 6);
    assert_eq!(json["contrast_limit"], 3.0);
    assert_eq!(json["mime_type"], "image/png");

    let png = base64::engine::general_purpose::STANDARD
        .decode(json["image_base64"].as_str().unwrap())
        .unwrap();
    assert!(fixtures::is_png(&png));
    assert_eq!(fixtures::png_dimensions(&png), (40, 30));
}

#[tokio::test]
async fn test_enhance_defaults_when_sliders_missing() {
    let app = TestApp::new();

    let form = MultipartForm::new().file("xray", "scan.png", "image/png", fixtures::xray_png(16, 16));
    let response = app.post_multipart("/api/enhance", form).await;
    assert_ok(&response);

    let json: serde_json::Value = response.json();
    assert_eq!(json["denoise_strength"], 10);
    assert_eq!(json["contrast_limit"], 2.0);
}

#[tokio::test]
async fn test_enhance_does_not_touch_sessions() {
    let app = TestApp::new();

    let form = MultipartForm::new().file("xray", "scan.png", "image/png", fixtures::xray_png(16, 16));
    let response = app.post_multipart("/api/enhance", form).await;
    assert_ok(&response);
    assert!(response.header("set-cookie").is_none());
}

#[tokio::test]
async fn test_enhance_errors() {
    let app = TestApp::new();

    let form = MultipartForm::new().text("denoise_strength", "5");
    let response = app.post_multipart("/api/enhance", form).await;
    assert_json_error(&response, StatusCode::BAD_REQUEST, "missing file field");

    let form = MultipartForm::new().file("xray", "scan.bmp", "image/bmp", vec![0x42, 0x4d]);
    let response = app.post_multipart("/api/enhance", form).await;
    assert_json_error(&response, StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported file type");

    let form = MultipartForm::new().file("xray", "scan.png", "image/png", b"garbage".to_vec());
    let response = app.post_multipart("/api/enhance", form).await;
    assert_json_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "Unable to read the image");

    let form = MultipartForm::new()
        .file("xray", "scan.png", "image/png", fixtures::xray_png(16, 16))
        .text("denoise_strength", "0");
    let response = app.post_multipart("/api/enhance", form).await;
    assert_json_error(&response, StatusCode::BAD_REQUEST, "Denoise strength 0 outside 1..=20");
}

#[tokio::test]
async fn test_prompt_exact_text() {
    let app = TestApp::new();

    let body = serde_json::json!({
        "patient": patient_json("John Doe", 30),
        "focus_areas": ["Cavity Detection"]
    });
    let response = app.post_json("/api/prompt", &body).await;
    assert_ok(&response);

    let json: serde_json::Value = response.json();
    let expected = "\
Please analyze this dental X-ray image with the following context:

Patient Information:
- Name: John Doe
- Age: 30
- Gender: Male
- Medical History: None
- Current Complaints: Tooth pain
- Previous Treatments: None
- Smoking Status: Non-smoker

Focus Areas: Cavity Detection

Provide:
1. Identified abnormalities
2. Potential diagnosis
3. Recommendations
";
    assert_eq!(json["prompt"].as_str().unwrap(), expected);
}

#[tokio::test]
async fn test_prompt_rejects_age_out_of_range() {
    let app = TestApp::new();

    let body = serde_json::json!({ "patient": patient_json("Kid", 12) });
    let response = app.post_json("/api/prompt", &body).await;
    assert_json_error(
        &response,
        StatusCode::BAD_REQUEST,
        "age must be between 30 and 120, got 12",
    );
}

#[tokio::test]
async fn test_prompt_rejects_unknown_option() {
    let app = TestApp::new();

    let mut patient = patient_json("John Doe", 40);
    patient["smoking_status"] = "Occasional".into();
    let response = app
        .post_json("/api/prompt", &serde_json::json!({ "patient": patient }))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_analysis_success() {
    let app = TestApp::new();

    let body = serde_json::json!({
        "patient": patient_json("Jane Roe", 52),
        "focus_areas": ["Periodontal Status"],
        "image_base64": b64(&fixtures::xray_png(24, 24))
    });
    let response = app.post_json("/api/analysis", &body).await;
    assert_ok(&response);

    let json: serde_json::Value = response.json();
    assert_eq!(json["model"], "mock");
    assert_eq!(json["analysis"], MOCK_ANALYSIS);
    assert_eq!(
        json["disclaimer"],
        "This analysis is for informational purposes only. Consult a professional."
    );

    let prompts = app.analyst.prompts();
    assert!(prompts[0].contains("- Name: Jane Roe\n"));
    assert!(prompts[0].contains("Focus Areas: Periodontal Status\n"));
}

#[tokio::test]
async fn test_analysis_accepts_jpeg() {
    let app = TestApp::new();

    let body = serde_json::json!({
        "patient": patient_json("Jane Roe", 52),
        "image_base64": b64(&fixtures::xray_jpeg(24, 24))
    });
    let response = app.post_json("/api/analysis", &body).await;
    assert_ok(&response);
}

#[tokio::test]
async fn test_analysis_empty_name() {
    let app = TestApp::new();

    let body = serde_json::json!({
        "patient": patient_json("", 52),
        "image_base64": b64(&fixtures::xray_png(8, 8))
    });
    let response = app.post_json("/api/analysis", &body).await;
    assert_json_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "Enter the patient's name");
    assert!(app.analyst.prompts().is_empty());
}

#[tokio::test]
async fn test_analysis_bad_image() {
    let app = TestApp::new();

    let body = serde_json::json!({
        "patient": patient_json("Jane Roe", 52),
        "image_base64": "%%%not base64%%%"
    });
    let response = app.post_json("/api/analysis", &body).await;
    assert_json_error(&response, StatusCode::BAD_REQUEST, "not valid base64");

    let body = serde_json::json!({
        "patient": patient_json("Jane Roe", 52),
        "image_base64": b64(b"plain text")
    });
    let response = app.post_json("/api/analysis", &body).await;
    assert_json_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "Unable to read the image");
}

#[tokio::test]
async fn test_analysis_remote_failure() {
    let app = TestApp::failing("model overloaded");

    let body = serde_json::json!({
        "patient": patient_json("Jane Roe", 52),
        "image_base64": b64(&fixtures::xray_png(8, 8))
    });
    let response = app.post_json("/api/analysis", &body).await;
    assert_json_error(&response, StatusCode::BAD_GATEWAY, "model overloaded");
}
