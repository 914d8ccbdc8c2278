//! Row-major 8-bit grayscale image.

use crate::api::EnhanceError;

/// An 8-bit single-channel image stored row-major.
///
/// Dimensions are always non-zero and `data.len() == width * height`;
/// both are checked at construction so the filters never have to.
///
/// # Example
///
/// ```
/// use xray_enhance::GrayImage;
///
/// let image = GrayImage::from_raw(2, 2, vec![0, 64, 128, 255]).unwrap();
/// assert_eq!(image.get(1, 1), 255);
///
/// assert!(GrayImage::from_raw(2, 2, vec![0; 3]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl GrayImage {
    /// Create a black image.
    pub fn new(width: u32, height: u32) -> Result<Self, EnhanceError> {
        Self::from_raw(width, height, vec![0; width as usize * height as usize])
    }

    /// Wrap an existing row-major buffer.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EnhanceError> {
        if width == 0 || height == 0 {
            return Err(EnhanceError::EmptyImage);
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(EnhanceError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sample at column `x`, row `y`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx] = value;
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Mean intensity, handy for quick sanity checks on filter output.
    pub fn mean(&self) -> f64 {
        let sum: u64 = self.data.iter().map(|&v| v as u64).sum();
        sum as f64 / self.data.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_black() {
        let image = GrayImage::new(3, 2).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert!(image.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert_eq!(GrayImage::new(0, 5), Err(EnhanceError::EmptyImage));
        assert_eq!(
            GrayImage::from_raw(5, 0, Vec::new()),
            Err(EnhanceError::EmptyImage)
        );
    }

    #[test]
    fn test_buffer_size_checked() {
        let err = GrayImage::from_raw(4, 4, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            EnhanceError::BufferSize {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_get_set_row_major() {
        let mut image = GrayImage::new(4, 3).unwrap();
        image.set(3, 1, 200);
        assert_eq!(image.get(3, 1), 200);
        assert_eq!(image.as_raw()[4 + 3], 200);
    }

    #[test]
    fn test_mean() {
        let image = GrayImage::from_raw(2, 1, vec![100, 200]).unwrap();
        assert!((image.mean() - 150.0).abs() < 1e-9);
    }
}
