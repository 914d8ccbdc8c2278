//! Tile histograms, clipping, and bilinear LUT interpolation.

use super::ClaheOptions;
use crate::api::EnhanceError;
use crate::image::{reflect_101, GrayImage};

const BINS: usize = 256;

type Lut = [u8; BINS];

/// Cap every bin at `limit` and spread the clipped excess evenly.
///
/// Whatever doesn't divide evenly across 256 bins is handed out one sample
/// at a time at a regular stride, so the total count is unchanged.
fn clip_histogram(hist: &mut [usize; BINS], limit: usize) {
    let mut excess = 0;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let batch = excess / BINS;
    let mut residual = excess - batch * BINS;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

/// Cumulative histogram scaled to 0..=255.
fn build_lut(hist: &[usize; BINS], scale: f32) -> Lut {
    let mut lut = [0u8; BINS];
    let mut sum = 0usize;
    for (i, &count) in hist.iter().enumerate() {
        sum += count;
        lut[i] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Split a pixel coordinate into the two neighbouring tile indices and the
/// blend factor towards the second one.
#[inline]
fn tile_neighbours(pos: usize, inv_tile: f32, tiles: usize) -> (usize, usize, f32) {
    let f = pos as f32 * inv_tile - 0.5;
    let first = f.floor();
    let alpha = f - first;
    let first = first as isize;
    let lo = first.max(0) as usize;
    let hi = ((first + 1) as usize).min(tiles - 1);
    (lo, hi, alpha)
}

/// Apply CLAHE to a grayscale image.
///
/// When the image size is not a multiple of the tile grid, the image is
/// conceptually extended on the right and bottom by reflect-101 mirroring so
/// that all tiles have equal size; only the original area is written out.
///
/// # Errors
///
/// Returns [`EnhanceError::InvalidClipLimit`] or
/// [`EnhanceError::InvalidTileGrid`] when `options` fail validation.
///
/// # Example
///
/// ```
/// use xray_enhance::{clahe, ClaheOptions, GrayImage};
///
/// // A washed-out horizontal ramp between 100 and 131
/// let data: Vec<u8> = (0..32 * 32).map(|i| 100 + (i % 32) as u8).collect();
/// let image = GrayImage::from_raw(32, 32, data).unwrap();
///
/// let out = clahe(&image, &ClaheOptions::new().clip_limit(4.0)).unwrap();
/// let min = *out.as_raw().iter().min().unwrap();
/// let max = *out.as_raw().iter().max().unwrap();
/// assert!(max - min > 31, "contrast should be stretched");
/// ```
pub fn clahe(image: &GrayImage, options: &ClaheOptions) -> Result<GrayImage, EnhanceError> {
    options.validate()?;

    let width = image.width() as usize;
    let height = image.height() as usize;
    let tiles_x = options.tiles_x as usize;
    let tiles_y = options.tiles_y as usize;
    let tile_w = width.div_ceil(tiles_x);
    let tile_h = height.div_ceil(tiles_y);
    let tile_area = tile_w * tile_h;
    let src = image.as_raw();

    let clip = ((options.clip_limit as f64 * tile_area as f64 / BINS as f64) as usize).max(1);
    let scale = (BINS - 1) as f32 / tile_area as f32;

    let mut luts: Vec<Lut> = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0usize; BINS];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect_101(y as isize, height);
                let row = &src[sy * width..(sy + 1) * width];
                for x in tx * tile_w..(tx + 1) * tile_w {
                    hist[row[reflect_101(x as isize, width)] as usize] += 1;
                }
            }
            clip_histogram(&mut hist, clip);
            luts.push(build_lut(&hist, scale));
        }
    }

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;

    // Horizontal neighbours only depend on x
    let columns: Vec<(usize, usize, f32)> = (0..width)
        .map(|x| tile_neighbours(x, inv_tw, tiles_x))
        .collect();

    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        let (ty1, ty2, ya) = tile_neighbours(y, inv_th, tiles_y);
        let top_row = &luts[ty1 * tiles_x..(ty1 + 1) * tiles_x];
        let bottom_row = &luts[ty2 * tiles_x..(ty2 + 1) * tiles_x];

        for x in 0..width {
            let (tx1, tx2, xa) = columns[x];
            let v = src[y * width + x] as usize;

            let top = top_row[tx1][v] as f32 * (1.0 - xa) + top_row[tx2][v] as f32 * xa;
            let bottom = bottom_row[tx1][v] as f32 * (1.0 - xa) + bottom_row[tx2][v] as f32 * xa;
            let value = top * (1.0 - ya) + bottom * ya;
            data.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }

    GrayImage::from_raw(image.width(), image.height(), data)
}
