//! Handlers for the page's form posts.
//!
//! Each handler turns the submission into reducer actions, stores the new
//! view and redirects back to `/`. Failures become a banner on the page
//! rather than an error status.

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    response::Response,
    Form,
};

use super::session::Session;
use super::upload::Upload;
use crate::error::ApiError;
use crate::models::{Action, EnhanceParams, Phase};
use crate::server::AppState;
use crate::services::form_collector::{self, FormInput};
use crate::services::image_pipeline;

type FormPairs = Form<Vec<(String, String)>>;

/// Save the sidebar patient form
pub async fn save_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): FormPairs,
) -> Result<Response, ApiError> {
    let mut session = Session::open(&state, &headers).await?;

    let action = match form_collector::collect(&FormInput::new(pairs)) {
        Ok(record) => {
            tracing::info!(
                session = %session.id,
                named = record.has_name(),
                age = record.age,
                "Patient information saved"
            );
            Action::PatientSaved(record)
        }
        Err(e) => Action::Rejected(format!("Invalid patient information: {e}")),
    };
    session.commit(&state, action).await?;

    session.redirect()
}

/// Accept an X-ray upload and enhance it with the current slider values
pub async fn upload_xray(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut session = Session::open(&state, &headers).await?;

    let upload = match Upload::read(&mut multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            session
                .commit(&state, Action::UploadRejected(e.to_string()))
                .await?;
            return session.redirect();
        }
    };

    let file_name = upload.file_name.clone();
    match upload.decode(state.config.upload.max_dimension).await {
        Ok(original) => {
            tracing::info!(
                session = %session.id,
                file = %file_name,
                width = original.encoded.width,
                height = original.encoded.height,
                "X-ray uploaded"
            );
            session
                .commit(
                    &state,
                    Action::ImageUploaded {
                        file_name,
                        original,
                    },
                )
                .await?;
            let params = session.view.params;
            enhance_original(&state, &mut session, params).await?;
        }
        Err(e) => {
            session
                .commit(&state, Action::UploadRejected(e.to_string()))
                .await?;
        }
    }

    session.redirect()
}

/// Re-run the pipeline on the original upload with new slider values
pub async fn enhance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): FormPairs,
) -> Result<Response, ApiError> {
    let mut session = Session::open(&state, &headers).await?;

    match form_collector::collect_params(&FormInput::new(pairs)) {
        Ok(params) => enhance_original(&state, &mut session, params).await?,
        Err(e) => {
            session
                .commit(&state, Action::Rejected(e.to_string()))
                .await?
        }
    }

    session.redirect()
}

async fn enhance_original(
    state: &AppState,
    session: &mut Session,
    params: EnhanceParams,
) -> Result<(), ApiError> {
    let Some(original) = session.view.original.as_ref().map(|p| p.pixels.clone()) else {
        return session
            .commit(
                state,
                Action::Rejected("Upload an X-ray image first".to_string()),
            )
            .await;
    };

    let action = match image_pipeline::process(original, params).await {
        Ok(enhanced) => Action::Enhanced { params, enhanced },
        Err(e) => Action::EnhanceFailed {
            params: Some(params),
            message: e.to_string(),
        },
    };
    session.commit(state, action).await
}

/// Record the chosen focus areas and ask the model for an analysis
pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): FormPairs,
) -> Result<Response, ApiError> {
    let mut session = Session::open(&state, &headers).await?;

    let focus_areas = match form_collector::collect_focus(&FormInput::new(pairs)) {
        Ok(areas) => areas,
        Err(e) => {
            session
                .commit(&state, Action::Rejected(e.to_string()))
                .await?;
            return session.redirect();
        }
    };
    session
        .commit(&state, Action::FocusSelected(focus_areas))
        .await?;

    let request = match session.view.analysis_request() {
        Ok(request) => request,
        Err(e) => {
            session
                .commit(&state, Action::Rejected(e.to_string()))
                .await?;
            return session.redirect();
        }
    };

    session.commit(&state, Action::AnalysisRequested).await?;
    let action = match state.analyst.analyze(&request).await {
        Ok(result) => Action::AnalysisCompleted(result),
        Err(e) => Action::AnalysisFailed(format!("Error generating analysis: {e}")),
    };

    // The remote call is slow; the browser may have moved on meanwhile
    if !session.reload(&state).await? || session.view.phase != Phase::AnalysisRequested {
        tracing::info!(
            session = %session.id,
            phase = %session.view.phase,
            "Discarding analysis for a superseded request"
        );
        return session.redirect();
    }
    session.commit(&state, action).await?;

    session.redirect()
}

/// Drop the image and analysis, keeping the patient record
pub async fn reset(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let mut session = Session::open(&state, &headers).await?;
    session.commit(&state, Action::Reset).await?;
    session.redirect()
}
