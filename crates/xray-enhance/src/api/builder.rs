//! Enhancer builder -- the primary ergonomic entry point for the crate.
//!
//! [`Enhancer`] chains denoising and CLAHE behind fluent configuration.

use crate::api::EnhanceError;
use crate::contrast::{clahe, ClaheOptions};
use crate::denoise::{denoise_nl_means, NlMeansOptions};
use crate::image::GrayImage;

/// Denoise-then-equalize pipeline for grayscale radiographs.
///
/// - Configuration methods consume and return `self`
/// - [`enhance()`](Self::enhance) takes `&self`, so one enhancer can be
///   reused across images and threads
/// - The pipeline is stateless: the same input and settings always give the
///   same output. Enhancing an already enhanced image denoises it again, so
///   repeated application is not idempotent.
///
/// # Example
///
/// ```
/// use xray_enhance::{Enhancer, GrayImage};
///
/// let image = GrayImage::from_raw(4, 4, vec![90; 16]).unwrap();
/// let enhancer = Enhancer::new()
///     .denoise_strength(12.0)
///     .clip_limit(3.0);
///
/// let out = enhancer.enhance(&image).unwrap();
/// assert_eq!(out.dimensions(), (4, 4));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Enhancer {
    denoise: NlMeansOptions,
    contrast: ClaheOptions,
}

impl Enhancer {
    /// Strength 10, 7/21 windows, clip limit 2.0, 8x8 tiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the non-local means filter strength `h`.
    #[inline]
    pub fn denoise_strength(mut self, h: f32) -> Self {
        self.denoise = self.denoise.strength(h);
        self
    }

    /// Set template and search window sizes for denoising.
    #[inline]
    pub fn windows(mut self, template: usize, search: usize) -> Self {
        self.denoise = self.denoise.template_window(template).search_window(search);
        self
    }

    /// Set the CLAHE clip limit.
    #[inline]
    pub fn clip_limit(mut self, limit: f32) -> Self {
        self.contrast = self.contrast.clip_limit(limit);
        self
    }

    /// Set the CLAHE tile grid.
    #[inline]
    pub fn tile_grid(mut self, x: u32, y: u32) -> Self {
        self.contrast = self.contrast.tile_grid(x, y);
        self
    }

    pub fn denoise_options(&self) -> &NlMeansOptions {
        &self.denoise
    }

    pub fn contrast_options(&self) -> &ClaheOptions {
        &self.contrast
    }

    /// Check both stages' settings without touching an image.
    pub fn validate(&self) -> Result<(), EnhanceError> {
        self.denoise.validate()?;
        self.contrast.validate()
    }

    /// Run denoising then CLAHE. Output has the input's dimensions.
    pub fn enhance(&self, image: &GrayImage) -> Result<GrayImage, EnhanceError> {
        self.validate()?;
        let denoised = denoise_nl_means(image, &self.denoise)?;
        clahe(&denoised, &self.contrast)
    }
}
