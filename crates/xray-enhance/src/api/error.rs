//! Unified error type for the xray-enhance public API.

use std::fmt;

/// Error returned by image construction and filter parameter validation.
///
/// # Example
///
/// ```
/// use xray_enhance::{EnhanceError, Enhancer};
///
/// let err = Enhancer::new().clip_limit(-1.0).validate().unwrap_err();
/// assert!(matches!(err, EnhanceError::InvalidClipLimit(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum EnhanceError {
    /// Width or height is zero
    EmptyImage,
    /// Pixel buffer length does not match `width * height`
    BufferSize {
        /// Required number of samples
        expected: usize,
        /// Number of samples supplied
        actual: usize,
    },
    /// Denoising strength must be finite and positive
    InvalidStrength(f32),
    /// Template and search windows must be odd, non-zero, and template <= search
    InvalidWindow {
        /// Template (patch) window size
        template: usize,
        /// Search window size
        search: usize,
    },
    /// Clip limit must be finite and positive
    InvalidClipLimit(f32),
    /// Tile grid must have at least one tile per axis
    InvalidTileGrid {
        /// Tiles across
        x: u32,
        /// Tiles down
        y: u32,
    },
}

impl fmt::Display for EnhanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnhanceError::EmptyImage => write!(f, "image has zero width or height"),
            EnhanceError::BufferSize { expected, actual } => write!(
                f,
                "pixel buffer has {} samples, expected {}",
                actual, expected
            ),
            EnhanceError::InvalidStrength(h) => {
                write!(f, "denoising strength must be positive, got {}", h)
            }
            EnhanceError::InvalidWindow { template, search } => write!(
                f,
                "invalid window sizes (template {}, search {}): both must be odd and template <= search",
                template, search
            ),
            EnhanceError::InvalidClipLimit(limit) => {
                write!(f, "clip limit must be positive, got {}", limit)
            }
            EnhanceError::InvalidTileGrid { x, y } => {
                write!(f, "tile grid {}x{} must be at least 1x1", x, y)
            }
        }
    }
}

impl std::error::Error for EnhanceError {}
