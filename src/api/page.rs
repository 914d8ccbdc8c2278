use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
};
use serde::Serialize;

use super::session::Session;
use crate::error::ApiError;
use crate::models::{
    Action, Condition, FocusArea, Gender, ImagePanel, PatientRecord, SmokingStatus, ViewState,
    AGE_MAX, AGE_MIN, CONTRAST_RANGE, DENOISE_RANGE,
};
use crate::server::AppState;
use crate::services::image_pipeline::ACCEPTED_EXTENSIONS;
use crate::services::PAGE_TEMPLATE;

pub const DISCLAIMER: &str =
    "This analysis is for informational purposes only. Consult a professional.";
pub const FOOTER: &str = "© 2024 Advanced Dental X-Ray Analysis System";

/// One entry of a select or multi-select
#[derive(Debug, Serialize)]
struct Choice {
    label: &'static str,
    selected: bool,
}

fn choices<T: Copy + PartialEq>(
    all: &[T],
    label: fn(&T) -> &'static str,
    selected: impl Fn(&T) -> bool,
) -> Vec<Choice> {
    all.iter()
        .map(|item| Choice {
            label: label(item),
            selected: selected(item),
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct ImageView {
    src: String,
    width: u32,
    height: u32,
}

impl From<&ImagePanel> for ImageView {
    fn from(panel: &ImagePanel) -> Self {
        Self {
            src: panel.encoded.data_uri(),
            width: panel.encoded.width,
            height: panel.encoded.height,
        }
    }
}

/// Range input attributes, preformatted so the posted value parses back
#[derive(Debug, Serialize)]
struct SliderView {
    value: String,
    min: String,
    max: String,
    step: String,
}

/// Everything the page template reads
#[derive(Debug, Serialize)]
struct PageView<'a> {
    title: &'a str,
    model: &'a str,
    phase: String,
    patient: &'a PatientRecord,
    age_min: u8,
    age_max: u8,
    genders: Vec<Choice>,
    conditions: Vec<Choice>,
    smoking_statuses: Vec<Choice>,
    focus_areas: Vec<Choice>,
    accept: String,
    file_name: Option<&'a str>,
    original: Option<ImageView>,
    enhanced: Option<ImageView>,
    denoise: SliderView,
    contrast: SliderView,
    can_analyze: bool,
    analysis: Option<&'a str>,
    error: Option<&'a str>,
    disclaimer: &'static str,
    footer: &'static str,
}

impl<'a> PageView<'a> {
    fn new(state: &'a AppState, view: &'a ViewState, patient: &'a PatientRecord) -> Self {
        Self {
            title: &state.config.title,
            model: state.analyst.model(),
            phase: view.phase.to_string(),
            patient,
            age_min: AGE_MIN,
            age_max: AGE_MAX,
            genders: choices(Gender::ALL, Gender::label, |g| *g == patient.gender),
            conditions: choices(Condition::ALL, Condition::label, |c| {
                patient.medical_history.contains(c)
            }),
            smoking_statuses: choices(SmokingStatus::ALL, SmokingStatus::label, |s| {
                *s == patient.smoking_status
            }),
            focus_areas: choices(FocusArea::ALL, FocusArea::label, |a| {
                view.focus_areas.contains(a)
            }),
            accept: ACCEPTED_EXTENSIONS
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(","),
            file_name: view.file_name.as_deref(),
            original: view.original.as_ref().map(ImageView::from),
            enhanced: view.enhanced.as_ref().map(ImageView::from),
            denoise: SliderView {
                value: view.params.denoise_strength.to_string(),
                min: DENOISE_RANGE.start().to_string(),
                max: DENOISE_RANGE.end().to_string(),
                step: "1".to_string(),
            },
            contrast: SliderView {
                value: format!("{:.1}", view.params.contrast_limit),
                min: format!("{:.1}", CONTRAST_RANGE.start()),
                max: format!("{:.1}", CONTRAST_RANGE.end()),
                step: "0.1".to_string(),
            },
            can_analyze: view.can_analyze(),
            analysis: view.analysis.as_ref().map(|a| a.as_str()),
            error: view.error.as_deref(),
            disclaimer: DISCLAIMER,
            footer: FOOTER,
        }
    }
}

/// Render the page for a view, falling back to a bare error page
pub fn render_page(state: &AppState, view: &ViewState) -> String {
    let default_patient;
    let patient = match view.patient {
        Some(ref patient) => patient,
        None => {
            default_patient = PatientRecord::default();
            &default_patient
        }
    };

    let page = PageView::new(state, view, patient);
    state
        .templates
        .render(PAGE_TEMPLATE, &page)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to render page");
            state.templates.render_error(&e.to_string())
        })
}

/// Show the page for the caller's session.
///
/// The first render of a session stores the form defaults as the patient
/// record.
pub async fn show_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let mut session = Session::open(&state, &headers).await?;

    if session.view.patient.is_none() {
        session
            .commit(&state, Action::PatientSaved(PatientRecord::default()))
            .await?;
    }

    session.page(render_page(&state, &session.view))
}
