use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::NotReady;
use crate::services::{AnalysisError, FormError, PipelineError, TemplateError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid form: {0}")]
    Form(#[from] FormError),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    NotReady(#[from] NotReady),

    #[error("Error generating analysis: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Page error: {0}")]
    Template(#[from] TemplateError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Form(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(e) => match e {
                PipelineError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                PipelineError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::Enhance(_) | PipelineError::Encode(_) | PipelineError::Task(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::NotReady(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Analysis(e) => match e {
                AnalysisError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                AnalysisError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            ApiError::Template(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "Request rejected");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        (status, body).into_response()
    }
}
