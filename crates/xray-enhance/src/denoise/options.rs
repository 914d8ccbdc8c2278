//! Configuration for non-local means denoising.

use crate::api::EnhanceError;

/// Options for [`denoise_nl_means`](crate::denoise_nl_means).
///
/// Defaults: strength 10, template window 7, search window 21.
#[derive(Debug, Clone, PartialEq)]
pub struct NlMeansOptions {
    /// Filter strength `h`. Larger removes more noise and more detail.
    pub strength: f32,

    /// Side of the square patch compared between pixels. Must be odd.
    pub template_window: usize,

    /// Side of the square area searched for similar patches. Must be odd
    /// and at least as large as the template window.
    pub search_window: usize,
}

impl Default for NlMeansOptions {
    fn default() -> Self {
        Self {
            strength: 10.0,
            template_window: 7,
            search_window: 21,
        }
    }
}

impl NlMeansOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn strength(mut self, h: f32) -> Self {
        self.strength = h;
        self
    }

    #[inline]
    pub fn template_window(mut self, size: usize) -> Self {
        self.template_window = size;
        self
    }

    #[inline]
    pub fn search_window(mut self, size: usize) -> Self {
        self.search_window = size;
        self
    }

    pub fn validate(&self) -> Result<(), EnhanceError> {
        if !self.strength.is_finite() || self.strength <= 0.0 {
            return Err(EnhanceError::InvalidStrength(self.strength));
        }
        let odd = |n: usize| n % 2 == 1;
        if !odd(self.template_window)
            || !odd(self.search_window)
            || self.template_window > self.search_window
        {
            return Err(EnhanceError::InvalidWindow {
                template: self.template_window,
                search: self.search_window,
            });
        }
        Ok(())
    }
}
