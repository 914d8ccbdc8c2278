//! Contrast limited adaptive histogram equalization (CLAHE).
//!
//! The image is split into a grid of tiles. Each tile gets its own
//! equalization curve built from a clipped histogram, and every pixel is
//! mapped through a bilinear blend of the four nearest tile curves. Clipping
//! caps how steep a curve can get, which keeps flat regions (soft tissue,
//! background) from turning into amplified noise.

mod clahe;
mod options;

pub use clahe::clahe;
pub use options::ClaheOptions;
