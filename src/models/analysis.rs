use super::{EncodedImage, FocusArea, PatientRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Why an analysis cannot be requested yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotReady {
    #[error("Upload an X-ray image before requesting an analysis")]
    MissingImage,

    #[error("Enter the patient's name before requesting an analysis")]
    MissingName,
}

/// Everything one remote analysis call needs.
///
/// Only constructible with an image and a named patient.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    patient: PatientRecord,
    focus_areas: Vec<FocusArea>,
    image: EncodedImage,
}

impl AnalysisRequest {
    pub fn new(
        patient: PatientRecord,
        focus_areas: Vec<FocusArea>,
        image: Option<EncodedImage>,
    ) -> Result<Self, NotReady> {
        let image = image.ok_or(NotReady::MissingImage)?;
        if !patient.has_name() {
            return Err(NotReady::MissingName);
        }
        Ok(Self {
            patient,
            focus_areas,
            image,
        })
    }

    pub fn patient(&self) -> &PatientRecord {
        &self.patient
    }

    pub fn focus_areas(&self) -> &[FocusArea] {
        &self.focus_areas
    }

    pub fn image(&self) -> &EncodedImage {
        &self.image
    }
}

/// Free text returned by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct AnalysisResult(String);

impl AnalysisResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
