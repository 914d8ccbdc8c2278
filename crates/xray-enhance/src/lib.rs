// Tight numeric loops index several buffers in lockstep
#![allow(clippy::needless_range_loop, clippy::too_many_arguments)]

//! xray-enhance: denoising and local contrast enhancement for radiographs
//!
//! This library implements the two filters used to prepare a grayscale
//! X-ray for viewing and analysis:
//!
//! 1. **Non-local means denoising** ([`denoise_nl_means`]) -- every pixel is
//!    replaced by a weighted average of pixels in a search window, where the
//!    weight depends on how similar the surrounding patches are.
//! 2. **CLAHE** ([`clahe`]) -- contrast limited adaptive histogram
//!    equalization over a grid of tiles, with bilinear blending between the
//!    per-tile lookup tables.
//!
//! # Quick Start
//!
//! The [`Enhancer`] builder runs both stages in order:
//!
//! ```
//! use xray_enhance::{Enhancer, GrayImage};
//!
//! let pixels: Vec<u8> = (0..64u32).map(|i| (i * 4) as u8).collect();
//! let image = GrayImage::from_raw(8, 8, pixels).unwrap();
//!
//! let enhancer = Enhancer::new().denoise_strength(10.0).clip_limit(2.0);
//! let enhanced = enhancer.enhance(&image).unwrap();
//!
//! assert_eq!(enhanced.width(), 8);
//! assert_eq!(enhanced.height(), 8);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! GrayImage (u8, row-major)
//!     |
//!     v
//! [NL-means]    strength h, template 7x7, search 21x21
//!     |         weight = exp(-mean_patch_ssd / h^2)
//!     v
//! [CLAHE]       8x8 tiles, clip = clip_limit * tile_area / 256
//!     |
//!     v
//! GrayImage (same dimensions)
//! ```
//!
//! Both stages mirror pixels at the border (reflect-101: `dcb|abcd|cba`),
//! so the output always has the input's dimensions.
//!
//! # Patch distances
//!
//! A direct implementation of NL-means costs
//! `pixels * search_area * template_area` operations. For each offset in the
//! search window we instead build a summed-area table of squared differences,
//! which turns every patch distance into four lookups. The result is
//! identical; the cost drops to `pixels * search_area`.
//!
//! Weights are read from a lookup table indexed by the rounded mean squared
//! difference (0..=65025), so the exponential is evaluated once per level
//! instead of once per pixel pair.

mod api;
mod contrast;
mod denoise;
mod image;


pub use api::{EnhanceError, Enhancer};
pub use contrast::{clahe, ClaheOptions};
pub use denoise::{denoise_nl_means, NlMeansOptions};
pub use image::GrayImage;
