//! Non-local means filter using summed-area tables of patch differences.

use super::NlMeansOptions;
use crate::api::EnhanceError;
use crate::image::{reflect_101, GrayImage};

/// Largest mean squared difference between two 8-bit samples.
const MAX_MEAN_SQ: usize = 255 * 255;

/// Source image extended on every side by `margin` mirrored pixels.
struct Padded {
    data: Vec<u8>,
    stride: usize,
}

impl Padded {
    fn new(image: &GrayImage, margin: usize) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let stride = width + 2 * margin;
        let rows = height + 2 * margin;
        let src = image.as_raw();

        let mut data = Vec::with_capacity(stride * rows);
        for py in 0..rows {
            let sy = reflect_101(py as isize - margin as isize, height);
            for px in 0..stride {
                let sx = reflect_101(px as isize - margin as isize, width);
                data.push(src[sy * width + sx]);
            }
        }
        Self { data, stride }
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }
}

/// `exp(-d / h^2)` for every integer mean squared distance `d`.
fn weight_table(strength: f32) -> Vec<f64> {
    let h2 = strength as f64 * strength as f64;
    (0..=MAX_MEAN_SQ)
        .map(|d| (-(d as f64) / h2).exp())
        .collect()
}

/// Denoise a grayscale image with the non-local means filter.
///
/// Output has the input's dimensions. Borders are handled by reflect-101
/// mirroring, so edge pixels get full-size search and template windows.
///
/// # Errors
///
/// Returns [`EnhanceError::InvalidStrength`] or
/// [`EnhanceError::InvalidWindow`] when `options` fail validation.
pub fn denoise_nl_means(
    image: &GrayImage,
    options: &NlMeansOptions,
) -> Result<GrayImage, EnhanceError> {
    options.validate()?;

    let width = image.width() as usize;
    let height = image.height() as usize;
    let template = options.template_window;
    let tr = template / 2;
    let sr = options.search_window / 2;
    let margin = tr + sr;

    let padded = Padded::new(image, margin);
    let weights = weight_table(options.strength);
    let area = (template * template) as u64;

    // Region holding every template window of every output pixel.
    // Region (0, 0) is padded (sr, sr), i.e. image (-tr, -tr).
    let region_w = width + 2 * tr;
    let region_h = height + 2 * tr;
    let sat_stride = region_w + 1;
    let mut sat = vec![0u64; sat_stride * (region_h + 1)];

    let mut weight_sum = vec![0f64; width * height];
    let mut value_sum = vec![0f64; width * height];

    let sr = sr as isize;
    for dy in -sr..=sr {
        for dx in -sr..=sr {
            // Summed-area table of (I(p) - I(p + offset))^2 over the region
            for ry in 0..region_h {
                let py = ry + sr as usize;
                let qy = (py as isize + dy) as usize;
                let mut row_acc = 0u64;
                for rx in 0..region_w {
                    let px = rx + sr as usize;
                    let qx = (px as isize + dx) as usize;
                    let diff = padded.get(px, py) as i32 - padded.get(qx, qy) as i32;
                    row_acc += (diff * diff) as u64;
                    sat[(ry + 1) * sat_stride + rx + 1] = sat[ry * sat_stride + rx + 1] + row_acc;
                }
            }

            for y in 0..height {
                let top = y * sat_stride;
                let bottom = (y + template) * sat_stride;
                for x in 0..width {
                    let ssd = sat[bottom + x + template] + sat[top + x]
                        - sat[top + x + template]
                        - sat[bottom + x];
                    let mean = ((ssd + area / 2) / area) as usize;
                    let w = weights[mean.min(MAX_MEAN_SQ)];
                    if w == 0.0 {
                        continue;
                    }
                    let qx = (x + margin) as isize + dx;
                    let qy = (y + margin) as isize + dy;
                    let idx = y * width + x;
                    weight_sum[idx] += w;
                    value_sum[idx] += w * padded.get(qx as usize, qy as usize) as f64;
                }
            }
        }
    }

    // The zero offset always contributes weight 1, so weight_sum >= 1.
    let data = value_sum
        .iter()
        .zip(&weight_sum)
        .map(|(&v, &w)| (v / w).round().clamp(0.0, 255.0) as u8)
        .collect();

    GrayImage::from_raw(image.width(), image.height(), data)
}
