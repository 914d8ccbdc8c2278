//! Turn submitted form fields into typed records.
//!
//! Browsers send multi-selects as repeated keys, so forms arrive as an
//! ordered list of pairs rather than a map.

use crate::models::{
    Condition, EnhanceParams, FocusArea, Gender, ParamError, PatientRecord, SmokingStatus,
    AGE_MAX, AGE_MIN,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

pub const FIELD_NAME: &str = "name";
pub const FIELD_AGE: &str = "age";
pub const FIELD_GENDER: &str = "gender";
pub const FIELD_HISTORY: &str = "medical_history";
pub const FIELD_COMPLAINTS: &str = "dental_complaints";
pub const FIELD_TREATMENTS: &str = "previous_treatments";
pub const FIELD_SMOKING: &str = "smoking_status";
pub const FIELD_LAST_VISIT: &str = "last_visit";
pub const FIELD_DENOISE: &str = "denoise_strength";
pub const FIELD_CONTRAST: &str = "contrast_limit";
pub const FIELD_FOCUS: &str = "focus_areas";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("Missing form field: {0}")]
    Missing(&'static str),

    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid choice for {field}: '{value}'")]
    UnknownOption { field: &'static str, value: String },

    #[error("Invalid date for {field}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error(transparent)]
    Params(#[from] ParamError),
}

/// Submitted fields in arrival order
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pairs: Vec<(String, String)>,
}

impl FormInput {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value submitted under `name`
    pub fn value(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value submitted under `name`
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn required(&self, field: &'static str) -> Result<&str, FormError> {
        self.value(field).ok_or(FormError::Missing(field))
    }

    fn choice<T: FromStr>(&self, field: &'static str) -> Result<T, FormError> {
        let value = self.required(field)?;
        value.parse().map_err(|_| FormError::UnknownOption {
            field,
            value: value.to_string(),
        })
    }

    fn choices<T: FromStr + Ord>(&self, field: &'static str) -> Result<BTreeSet<T>, FormError> {
        self.values(field)
            .map(|value| {
                value.parse().map_err(|_| FormError::UnknownOption {
                    field,
                    value: value.to_string(),
                })
            })
            .collect()
    }
}

impl From<Vec<(String, String)>> for FormInput {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::new(pairs)
    }
}

/// Build a fresh patient record from the sidebar form.
///
/// Only per-field checks apply. An empty name is accepted; it just keeps
/// the analysis step unavailable.
pub fn collect(form: &FormInput) -> Result<PatientRecord, FormError> {
    let age_raw = form.required(FIELD_AGE)?.trim();
    let age: i64 = age_raw.parse().map_err(|_| FormError::InvalidNumber {
        field: FIELD_AGE,
        value: age_raw.to_string(),
    })?;
    check_age(age)?;

    let visit_raw = form.required(FIELD_LAST_VISIT)?.trim();
    let last_visit = NaiveDate::parse_from_str(visit_raw, "%Y-%m-%d").map_err(|_| {
        FormError::InvalidDate {
            field: FIELD_LAST_VISIT,
            value: visit_raw.to_string(),
        }
    })?;

    Ok(PatientRecord {
        name: form.required(FIELD_NAME)?.to_string(),
        age: age as u8,
        gender: form.choice::<Gender>(FIELD_GENDER)?,
        medical_history: form.choices::<Condition>(FIELD_HISTORY)?,
        dental_complaints: form.required(FIELD_COMPLAINTS)?.to_string(),
        previous_treatments: form.required(FIELD_TREATMENTS)?.to_string(),
        smoking_status: form.choice::<SmokingStatus>(FIELD_SMOKING)?,
        last_visit,
    })
}

/// Per-field checks for a record that arrived by other means than the form
pub fn validate(record: &PatientRecord) -> Result<(), FormError> {
    check_age(record.age.into())
}

fn check_age(age: i64) -> Result<(), FormError> {
    if (i64::from(AGE_MIN)..=i64::from(AGE_MAX)).contains(&age) {
        Ok(())
    } else {
        Err(FormError::OutOfRange {
            field: FIELD_AGE,
            value: age,
            min: AGE_MIN.into(),
            max: AGE_MAX.into(),
        })
    }
}

/// Read the two slider values
pub fn collect_params(form: &FormInput) -> Result<EnhanceParams, FormError> {
    let denoise_raw = form.required(FIELD_DENOISE)?.trim();
    let denoise: u8 = denoise_raw.parse().map_err(|_| FormError::InvalidNumber {
        field: FIELD_DENOISE,
        value: denoise_raw.to_string(),
    })?;

    let contrast_raw = form.required(FIELD_CONTRAST)?.trim();
    let contrast: f32 = contrast_raw.parse().map_err(|_| FormError::InvalidNumber {
        field: FIELD_CONTRAST,
        value: contrast_raw.to_string(),
    })?;

    let params = EnhanceParams {
        denoise_strength: denoise,
        contrast_limit: contrast,
    }
    .snapped();
    params.validate()?;
    Ok(params)
}

/// Read the focus-area multi-select, keeping option order
pub fn collect_focus(form: &FormInput) -> Result<Vec<FocusArea>, FormError> {
    Ok(form.choices::<FocusArea>(FIELD_FOCUS)?.into_iter().collect())
}
