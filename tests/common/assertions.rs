//! Assertion helpers for tests.

use axum::http::StatusCode;
use base64::Engine;
use pretty_assertions::assert_eq;

use super::app::TestResponse;
use super::fixtures;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status,
        expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert a form post redirected back to the page
pub fn assert_redirect_home(response: &TestResponse) {
    assert_status(response, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/"));
}

/// Assert JSON error body carries the expected status and message fragment
pub fn assert_json_error(response: &TestResponse, expected: StatusCode, fragment: &str) {
    assert_status(response, expected);
    let json: serde_json::Value = response.json();
    assert_eq!(
        json["status"].as_u64(),
        Some(u64::from(expected.as_u16())),
        "Full response: {json}"
    );
    let message = json["error"].as_str().unwrap_or_default();
    assert!(
        message.contains(fragment),
        "Expected error containing {fragment:?}, got {message:?}"
    );
}

/// Assert the page shows an error banner containing `fragment`
pub fn assert_banner(page: &str, fragment: &str) {
    let start = page
        .find(r#"class="banner error""#)
        .unwrap_or_else(|| panic!("No error banner on page:\n{page}"));
    let banner = &page[start..];
    let end = banner.find("</div>").unwrap_or(banner.len());
    assert!(
        banner[..end].contains(fragment),
        "Expected banner containing {fragment:?}, got {:?}",
        &banner[..end]
    );
}

/// Assert the page shows no error banner
pub fn assert_no_banner(page: &str) {
    assert!(
        !page.contains(r#"class="banner error""#),
        "Unexpected error banner on page"
    );
}

/// The `data:` URIs of all images on the page
pub fn image_sources(page: &str) -> Vec<String> {
    page.match_indices(r#"src="data:image/png;base64,"#)
        .map(|(start, _)| {
            let rest = &page[start + 5..];
            rest[..rest.find('"').unwrap()].to_string()
        })
        .collect()
}

/// Decode a PNG data URI and return the image dimensions
pub fn data_uri_dimensions(uri: &str) -> (u32, u32) {
    let encoded = uri
        .strip_prefix("data:image/png;base64,")
        .expect("Not a PNG data URI");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .expect("Invalid base64 in data URI");
    assert!(fixtures::is_png(&bytes), "Data URI is not a PNG");
    fixtures::png_dimensions(&bytes)
}

/// The phase attribute on the page's body element
pub fn page_phase(page: &str) -> String {
    let marker = r#"data-phase=""#;
    let start = page.find(marker).expect("No phase on page") + marker.len();
    let rest = &page[start..];
    rest[..rest.find('"').unwrap()].to_string()
}
