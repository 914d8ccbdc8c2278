//! Configuration for CLAHE.

use crate::api::EnhanceError;

/// Options for [`clahe`](crate::clahe).
///
/// Defaults: clip limit 2.0, 8x8 tile grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaheOptions {
    /// Histogram clip limit, relative to a uniform histogram. A tile bin may
    /// hold at most `clip_limit * tile_area / 256` samples (never below 1).
    pub clip_limit: f32,

    /// Number of tiles across.
    pub tiles_x: u32,

    /// Number of tiles down.
    pub tiles_y: u32,
}

impl Default for ClaheOptions {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tiles_x: 8,
            tiles_y: 8,
        }
    }
}

impl ClaheOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clip_limit(mut self, limit: f32) -> Self {
        self.clip_limit = limit;
        self
    }

    #[inline]
    pub fn tile_grid(mut self, x: u32, y: u32) -> Self {
        self.tiles_x = x;
        self.tiles_y = y;
        self
    }

    pub fn validate(&self) -> Result<(), EnhanceError> {
        if !self.clip_limit.is_finite() || self.clip_limit <= 0.0 {
            return Err(EnhanceError::InvalidClipLimit(self.clip_limit));
        }
        if self.tiles_x == 0 || self.tiles_y == 0 {
            return Err(EnhanceError::InvalidTileGrid {
                x: self.tiles_x,
                y: self.tiles_y,
            });
        }
        Ok(())
    }
}
