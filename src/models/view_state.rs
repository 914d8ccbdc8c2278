//! Per-session page state and the reducer that advances it.
//!
//! Every HTTP interaction produces exactly one [`Action`]; the handler reads
//! the session's [`ViewState`], applies the action and stores the result.

use super::{
    AnalysisRequest, AnalysisResult, EncodedImage, EnhanceParams, FocusArea, NotReady,
    PatientRecord,
};
use std::fmt;
use std::sync::Arc;
use xray_enhance::GrayImage;

/// Where the current interaction left the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    ImageUploaded,
    Enhanced,
    AnalysisRequested,
    AnalysisComplete,
    AnalysisFailed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::ImageUploaded => "image-uploaded",
            Phase::Enhanced => "enhanced",
            Phase::AnalysisRequested => "analysis-requested",
            Phase::AnalysisComplete => "analysis-complete",
            Phase::AnalysisFailed => "analysis-failed",
        };
        f.write_str(name)
    }
}

/// A decoded image alongside its PNG encoding
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePanel {
    pub pixels: Arc<GrayImage>,
    pub encoded: EncodedImage,
}

/// One user interaction
#[derive(Debug, Clone)]
pub enum Action {
    /// The sidebar form was submitted (or defaults collected on first render)
    PatientSaved(PatientRecord),
    /// A new upload decoded successfully
    ImageUploaded {
        file_name: String,
        original: ImagePanel,
    },
    /// The upload could not be read as an image
    UploadRejected(String),
    /// The pipeline ran on the original with these slider values
    Enhanced {
        params: EnhanceParams,
        enhanced: ImagePanel,
    },
    /// Slider values were rejected or the pipeline failed
    EnhanceFailed {
        params: Option<EnhanceParams>,
        message: String,
    },
    FocusSelected(Vec<FocusArea>),
    /// A submission was refused; only the banner changes
    Rejected(String),
    AnalysisRequested,
    AnalysisCompleted(AnalysisResult),
    AnalysisFailed(String),
    /// Start over with the same patient
    Reset,
}

/// Everything the page shows for one session
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub phase: Phase,
    /// Absent until the first page render stores the form defaults
    pub patient: Option<PatientRecord>,
    pub credentials_present: bool,
    pub file_name: Option<String>,
    pub original: Option<ImagePanel>,
    pub enhanced: Option<ImagePanel>,
    pub params: EnhanceParams,
    pub focus_areas: Vec<FocusArea>,
    pub analysis: Option<AnalysisResult>,
    pub error: Option<String>,
}

impl ViewState {
    pub fn new(params: EnhanceParams, credentials_present: bool) -> Self {
        Self {
            params,
            credentials_present,
            ..Default::default()
        }
    }

    /// Produce the state that follows `action`
    pub fn apply(&self, action: Action) -> ViewState {
        let mut next = self.clone();
        next.error = None;

        match action {
            Action::PatientSaved(record) => {
                next.patient = Some(record);
            }
            Action::ImageUploaded {
                file_name,
                original,
            } => {
                next.phase = Phase::ImageUploaded;
                next.file_name = Some(file_name);
                next.original = Some(original);
                next.enhanced = None;
                next.analysis = None;
            }
            Action::UploadRejected(message) => {
                next.phase = Phase::Idle;
                next.file_name = None;
                next.original = None;
                next.enhanced = None;
                next.analysis = None;
                next.error = Some(message);
            }
            Action::Enhanced { params, enhanced } => {
                next.phase = Phase::Enhanced;
                next.params = params;
                next.enhanced = Some(enhanced);
                next.analysis = None;
            }
            Action::EnhanceFailed { params, message } => {
                if let Some(params) = params {
                    next.params = params;
                }
                next.phase = if next.original.is_some() {
                    Phase::ImageUploaded
                } else {
                    Phase::Idle
                };
                next.enhanced = None;
                next.analysis = None;
                next.error = Some(message);
            }
            Action::FocusSelected(areas) => {
                next.focus_areas = areas;
            }
            Action::Rejected(message) => {
                next.error = Some(message);
            }
            Action::AnalysisRequested => {
                next.phase = Phase::AnalysisRequested;
                next.analysis = None;
            }
            Action::AnalysisCompleted(result) => {
                next.phase = Phase::AnalysisComplete;
                next.analysis = Some(result);
            }
            Action::AnalysisFailed(message) => {
                next.phase = Phase::AnalysisFailed;
                next.analysis = None;
                next.error = Some(message);
            }
            Action::Reset => {
                next = ViewState {
                    patient: self.patient.clone(),
                    credentials_present: self.credentials_present,
                    params: self.params,
                    ..Default::default()
                };
            }
        }

        next
    }

    /// The image sent for analysis: the enhanced one when available
    pub fn analysis_image(&self) -> Option<&ImagePanel> {
        self.enhanced.as_ref().or(self.original.as_ref())
    }

    /// Whether the "Generate Analysis" control is offered
    pub fn can_analyze(&self) -> bool {
        self.analysis_image().is_some()
            && self.patient.as_ref().is_some_and(PatientRecord::has_name)
    }

    pub fn analysis_request(&self) -> Result<AnalysisRequest, NotReady> {
        let image = self.analysis_image().map(|panel| panel.encoded.clone());
        let patient = self.patient.clone().unwrap_or_default();
        AnalysisRequest::new(patient, self.focus_areas.clone(), image)
    }
}
