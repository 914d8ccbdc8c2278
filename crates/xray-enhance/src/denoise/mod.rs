//! Non-local means denoising.
//!
//! Each output pixel is a weighted mean of the pixels in a square search
//! window around it. The weight of a candidate pixel `q` for target `p` is
//!
//! ```text
//! w(p, q) = exp(-d(p, q) / h^2)
//! d(p, q) = mean over the template window of (I(p + t) - I(q + t))^2
//! ```
//!
//! so pixels whose neighbourhoods look alike contribute most, regardless of
//! how far apart they are inside the search window. `h` is the filter
//! strength: larger values remove more noise and more detail.
//!
//! # Example
//!
//! ```
//! use xray_enhance::{denoise_nl_means, GrayImage, NlMeansOptions};
//!
//! let image = GrayImage::from_raw(4, 4, vec![120; 16]).unwrap();
//! let options = NlMeansOptions::new().strength(10.0);
//! let denoised = denoise_nl_means(&image, &options).unwrap();
//!
//! // A flat image is a fixed point of the filter
//! assert_eq!(denoised, image);
//! ```

mod nlmeans;
mod options;

pub use nlmeans::denoise_nl_means;
pub use options::NlMeansOptions;
