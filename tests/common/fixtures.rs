//! Test fixtures: generated radiographs, form bodies and patient records.

use std::io::Cursor;

/// Sidebar form values for a complete, valid patient
pub fn patient_fields(name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", name.to_string()),
        ("age", "45".to_string()),
        ("gender", "Female".to_string()),
        ("medical_history", "Diabetes".to_string()),
        ("medical_history", "Hypertension".to_string()),
        ("dental_complaints", "Sensitivity on the lower left".to_string()),
        ("previous_treatments", "Root canal 2019".to_string()),
        ("smoking_status", "Former smoker".to_string()),
        ("last_visit", "2024-03-01".to_string()),
    ]
}

/// Replace (or add) one field of a form
pub fn with_field(
    mut fields: Vec<(&'static str, String)>,
    name: &'static str,
    value: &str,
) -> Vec<(&'static str, String)> {
    fields.retain(|(k, _)| *k != name);
    fields.push((name, value.to_string()));
    fields
}

/// Convert owned pairs to borrowed for TestApp methods
pub fn as_str_pairs<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

/// JSON patient record as accepted by the JSON API
pub fn patient_json(name: &str, age: u8) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "age": age,
        "gender": "Male",
        "medical_history": ["None"],
        "dental_complaints": "Tooth pain",
        "previous_treatments": "None",
        "smoking_status": "Non-smoker",
        "last_visit": "2024-01-15"
    })
}

/// A synthetic radiograph: diagonal gradient with a bright "tooth" disc and
/// deterministic speckle
pub fn xray_pixels(width: u32, height: u32) -> Vec<u8> {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let radius = width.min(height) as f32 / 4.0;
    let mut pixels = Vec::with_capacity((width * height) as usize);

    for y in 0..height {
        for x in 0..width {
            let gradient = (x + y) as f32 / (width + height) as f32 * 120.0;
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let tooth = if dx * dx + dy * dy < radius * radius {
                90.0
            } else {
                0.0
            };
            let speckle = ((x.wrapping_mul(31) ^ y.wrapping_mul(17)) % 23) as f32 - 11.0;
            pixels.push((30.0 + gradient + tooth + speckle).clamp(0.0, 255.0) as u8);
        }
    }
    pixels
}

/// Encode the synthetic radiograph as an 8-bit grayscale PNG
pub fn xray_png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer
            .write_image_data(&xray_pixels(width, height))
            .unwrap();
    }
    out
}

/// Encode the synthetic radiograph as an RGB JPEG
pub fn xray_jpeg(width: u32, height: u32) -> Vec<u8> {
    let gray = image::GrayImage::from_raw(width, height, xray_pixels(width, height)).unwrap();
    let rgb = image::DynamicImage::ImageLuma8(gray).to_rgb8();
    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

/// Check the PNG signature
pub fn is_png(bytes: &[u8]) -> bool {
    bytes.len() >= 8 && &bytes[0..8] == b"\x89PNG\r\n\x1a\n"
}

/// Read a PNG's dimensions from its header
pub fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let reader = decoder.read_info().unwrap();
    let info = reader.info();
    (info.width, info.height)
}

/// Percent-encode form fields as `application/x-www-form-urlencoded`
pub fn urlencode(fields: &[(&str, &str)]) -> String {
    fn encode(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for byte in s.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                    out.push(byte as char)
                }
                b' ' => out.push('+'),
                _ => out.push_str(&format!("%{byte:02X}")),
            }
        }
        out
    }

    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builder for `multipart/form-data` bodies
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "molar-test-boundary-7MA4YWxkTrZu0gW".to_string(),
            body: Vec::new(),
        }
    }

    /// Add a file part
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(&bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Add a plain text part
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn into_body(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}
