use axum::{
    extract::{Multipart, State},
    response::Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::page::DISCLAIMER;
use super::upload::Upload;
use crate::error::ApiError;
use crate::models::{AnalysisRequest, EnhanceParams, FocusArea, PatientRecord};
use crate::server::AppState;
use crate::services::form_collector::{self, FormInput, FIELD_CONTRAST, FIELD_DENOISE};
use crate::services::{image_pipeline, prompt_builder};

/// Enhanced image returned by `/api/enhance`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnhanceResponse {
    pub width: u32,
    pub height: u32,
    pub denoise_strength: u8,
    pub contrast_limit: f32,
    pub mime_type: String,
    /// PNG bytes, standard base64 with padding
    pub image_base64: String,
}

/// Patient data and focus areas for prompt generation
#[derive(Debug, Deserialize, ToSchema)]
pub struct PromptRequest {
    pub patient: PatientRecord,
    #[serde(default)]
    pub focus_areas: Vec<FocusArea>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromptResponse {
    pub prompt: String,
}

/// Everything needed for one analysis call
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub patient: PatientRecord,
    #[serde(default)]
    pub focus_areas: Vec<FocusArea>,
    /// JPEG or PNG bytes, standard base64
    pub image_base64: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeResponse {
    pub model: String,
    pub analysis: String,
    pub disclaimer: String,
}

/// Enhance an uploaded X-ray
///
/// Multipart body: the image in field `xray`, optional `denoise_strength`
/// (1-20) and `contrast_limit` (1.0-5.0). Missing values use the configured
/// defaults.
#[utoipa::path(
    post,
    path = "/api/enhance",
    request_body(content_type = "multipart/form-data", description = "X-ray image and slider values"),
    responses(
        (status = 200, description = "Enhanced image", body = EnhanceResponse),
        (status = 400, description = "Missing file or invalid slider values"),
        (status = 415, description = "Not a JPEG or PNG file"),
        (status = 422, description = "Image could not be decoded"),
    ),
    tag = "Imaging"
)]
pub async fn enhance_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EnhanceResponse>, ApiError> {
    let mut upload = Upload::read(&mut multipart).await?;

    let mut fields = std::mem::take(&mut upload.fields);
    let defaults = state.config.default_params();
    if !fields.iter().any(|(k, _)| k == FIELD_DENOISE) {
        fields.push((FIELD_DENOISE.to_string(), defaults.denoise_strength.to_string()));
    }
    if !fields.iter().any(|(k, _)| k == FIELD_CONTRAST) {
        fields.push((FIELD_CONTRAST.to_string(), defaults.contrast_limit.to_string()));
    }
    let params: EnhanceParams = form_collector::collect_params(&FormInput::new(fields))?;

    let original = upload.decode(state.config.upload.max_dimension).await?;
    let enhanced = image_pipeline::process(original.pixels, params).await?;

    tracing::info!(
        width = enhanced.encoded.width,
        height = enhanced.encoded.height,
        denoise = params.denoise_strength,
        contrast = params.contrast_limit,
        "Enhanced image via API"
    );

    Ok(Json(EnhanceResponse {
        width: enhanced.encoded.width,
        height: enhanced.encoded.height,
        denoise_strength: params.denoise_strength,
        contrast_limit: params.contrast_limit,
        mime_type: crate::models::EncodedImage::MIME_TYPE.to_string(),
        image_base64: enhanced.encoded.base64.to_string(),
    }))
}

/// Build the analysis prompt for a patient
#[utoipa::path(
    post,
    path = "/api/prompt",
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Prompt text", body = PromptResponse),
        (status = 400, description = "Invalid patient record"),
    ),
    tag = "Analysis"
)]
pub async fn build_prompt(
    Json(request): Json<PromptRequest>,
) -> Result<Json<PromptResponse>, ApiError> {
    form_collector::validate(&request.patient)?;
    Ok(Json(PromptResponse {
        prompt: prompt_builder::build(&request.patient, &request.focus_areas),
    }))
}

/// Analyze an X-ray with the configured model
///
/// The image is sent as given (after re-encoding to grayscale PNG); run it
/// through `/api/enhance` first for the enhanced view.
#[utoipa::path(
    post,
    path = "/api/analysis",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Model analysis", body = AnalyzeResponse),
        (status = 400, description = "Invalid patient record or base64"),
        (status = 422, description = "Image undecodable or patient name empty"),
        (status = 502, description = "Analysis service failed"),
        (status = 504, description = "Analysis service timed out"),
    ),
    tag = "Analysis"
)]
pub async fn analyze_image(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    form_collector::validate(&request.patient)?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(request.image_base64.trim())
        .map_err(|e| ApiError::BadRequest(format!("image_base64 is not valid base64: {e}")))?;
    let image = image_pipeline::load(bytes, state.config.upload.max_dimension).await?;

    let analysis_request =
        AnalysisRequest::new(request.patient, request.focus_areas, Some(image.encoded))?;
    let result = state.analyst.analyze(&analysis_request).await?;

    Ok(Json(AnalyzeResponse {
        model: state.analyst.model().to_string(),
        analysis: result.as_str().to_string(),
        disclaimer: DISCLAIMER.to_string(),
    }))
}
