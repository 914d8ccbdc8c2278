use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;
use utoipa::ToSchema;

/// Accepted denoise strengths (slider steps of 1)
pub const DENOISE_RANGE: RangeInclusive<u8> = 1..=20;
/// Accepted CLAHE clip limits (slider steps of 0.1)
pub const CONTRAST_RANGE: RangeInclusive<f32> = 1.0..=5.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("Denoise strength {0} outside 1..=20")]
    DenoiseOutOfRange(u8),

    #[error("Contrast limit {0} outside 1.0..=5.0")]
    ContrastOutOfRange(f32),
}

/// Slider values for the enhancement pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnhanceParams {
    /// NL-means filter strength `h`
    pub denoise_strength: u8,
    /// CLAHE clip limit
    pub contrast_limit: f32,
}

impl EnhanceParams {
    pub fn new(denoise_strength: u8, contrast_limit: f32) -> Result<Self, ParamError> {
        let params = Self {
            denoise_strength,
            contrast_limit,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if !DENOISE_RANGE.contains(&self.denoise_strength) {
            return Err(ParamError::DenoiseOutOfRange(self.denoise_strength));
        }
        if !CONTRAST_RANGE.contains(&self.contrast_limit) {
            return Err(ParamError::ContrastOutOfRange(self.contrast_limit));
        }
        Ok(())
    }

    /// Round the clip limit to the slider's 0.1 step
    pub fn snapped(self) -> Self {
        Self {
            contrast_limit: (self.contrast_limit * 10.0).round() / 10.0,
            ..self
        }
    }
}

impl Default for EnhanceParams {
    fn default() -> Self {
        Self {
            denoise_strength: 10,
            contrast_limit: 2.0,
        }
    }
}
