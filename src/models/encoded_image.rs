use std::sync::Arc;

/// An 8-bit grayscale PNG and its base64 text form.
///
/// Bytes are shared so the view state can be cloned per request cheaply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub png_bytes: Arc<[u8]>,
    /// Standard alphabet, padded
    pub base64: Arc<str>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub const MIME_TYPE: &'static str = "image/png";

    /// `data:` URI for embedding in an `<img>` tag
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", Self::MIME_TYPE, self.base64)
    }
}
