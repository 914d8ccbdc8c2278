//! Upload decoding, enhancement and PNG/base64 encoding.
//!
//! The pipeline is stateless: every slider change re-runs it on the
//! original upload. The async entry points move the CPU-heavy work onto
//! the blocking thread pool.

use crate::models::{EncodedImage, EnhanceParams, ImagePanel};
use base64::Engine;
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;
use xray_enhance::{EnhanceError, Enhancer, GrayImage};

/// Upload file extensions the pipeline accepts
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported file type: {0} (expected JPEG or PNG)")]
    UnsupportedType(String),

    #[error("Unable to read the image. Please try another file. ({0})")]
    Decode(String),

    #[error("Error processing image: {0}")]
    Enhance(#[from] EnhanceError),

    #[error("PNG encode error: {0}")]
    Encode(String),

    #[error("Image task failed: {0}")]
    Task(String),
}

/// Reject uploads that are neither named nor labelled as JPEG/PNG.
///
/// Either a matching extension or a matching content type is enough;
/// the decoder has the final word.
pub fn check_upload(file_name: &str, content_type: Option<&str>) -> Result<(), PipelineError> {
    let extension_ok = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    let content_type_ok = content_type
        .map(|ct| matches!(ct, "image/png" | "image/jpeg" | "image/jpg"))
        .unwrap_or(false);

    if extension_ok || content_type_ok {
        Ok(())
    } else {
        Err(PipelineError::UnsupportedType(
            content_type.unwrap_or(file_name).to_string(),
        ))
    }
}

/// Decode JPEG or PNG bytes into an 8-bit grayscale matrix.
///
/// Width and height are checked against `max_dimension` from the header,
/// before any pixel buffer is allocated.
pub fn decode(bytes: &[u8], max_dimension: u32) -> Result<GrayImage, PipelineError> {
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(max_dimension);
    limits.max_image_height = Some(max_dimension);

    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode(e.to_string()))?;
    reader.limits(limits);

    let luma = reader
        .decode()
        .map_err(|e| match e {
            image::ImageError::Limits(_) => PipelineError::Decode(format!(
                "image exceeds {max_dimension}x{max_dimension} pixels"
            )),
            other => PipelineError::Decode(other.to_string()),
        })?
        .to_luma8();
    let (width, height) = luma.dimensions();

    GrayImage::from_raw(width, height, luma.into_raw())
        .map_err(|e| PipelineError::Decode(e.to_string()))
}

/// Denoise then apply CLAHE; output dimensions equal the input's
pub fn enhance(image: &GrayImage, params: EnhanceParams) -> Result<GrayImage, PipelineError> {
    let enhanced = Enhancer::new()
        .denoise_strength(f32::from(params.denoise_strength))
        .clip_limit(params.contrast_limit)
        .enhance(image)?;

    tracing::debug!(
        width = enhanced.width(),
        height = enhanced.height(),
        denoise = params.denoise_strength,
        contrast = params.contrast_limit,
        "Enhanced image"
    );

    Ok(enhanced)
}

/// Encode as an 8-bit grayscale PNG plus standard padded base64
pub fn encode(image: &GrayImage) -> Result<EncodedImage, PipelineError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| PipelineError::Encode(e.to_string()))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| PipelineError::Encode(e.to_string()))?;
    }
    let png_bytes = buf.into_inner();
    let base64 = base64::engine::general_purpose::STANDARD.encode(&png_bytes);

    Ok(EncodedImage {
        png_bytes: Arc::from(png_bytes),
        base64: Arc::from(base64),
        width: image.width(),
        height: image.height(),
    })
}

/// Decode an upload and prepare it for display
pub async fn load(bytes: Vec<u8>, max_dimension: u32) -> Result<ImagePanel, PipelineError> {
    run_blocking(move || {
        let pixels = decode(&bytes, max_dimension)?;
        let encoded = encode(&pixels)?;
        Ok(ImagePanel {
            pixels: Arc::new(pixels),
            encoded,
        })
    })
    .await
}

/// Run the enhancement pipeline on `original` and encode the result
pub async fn process(
    original: Arc<GrayImage>,
    params: EnhanceParams,
) -> Result<ImagePanel, PipelineError> {
    run_blocking(move || {
        let pixels = enhance(&original, params)?;
        let encoded = encode(&pixels)?;
        Ok(ImagePanel {
            pixels: Arc::new(pixels),
            encoded,
        })
    })
    .await
}

async fn run_blocking<F>(work: F) -> Result<ImagePanel, PipelineError>
where
    F: FnOnce() -> Result<ImagePanel, PipelineError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
}
