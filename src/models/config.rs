use super::EnhanceParams;
use crate::assets::AssetLoader;
use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Page heading
    #[serde(default = "default_title")]
    pub title: String,

    /// Gemini model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Generative Language API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout for the analysis call (none if unset)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub enhance: EnhanceConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

fn default_title() -> String {
    "Advanced Dental X-Ray Analysis System".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Attach the enhanced PNG to the request, not just the prompt
    #[serde(default = "default_send_image")]
    pub send_image: bool,
}

fn default_send_image() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            send_image: default_send_image(),
        }
    }
}

/// Initial slider positions
#[derive(Debug, Deserialize, Clone)]
pub struct EnhanceConfig {
    #[serde(default = "default_denoise")]
    pub default_denoise: u8,

    #[serde(default = "default_contrast")]
    pub default_contrast: f32,
}

fn default_denoise() -> u8 {
    10
}

fn default_contrast() -> f32 {
    2.0
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            default_denoise: default_denoise(),
            default_contrast: default_contrast(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Largest accepted request body
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Largest accepted image width or height, checked before decoding
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_max_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_max_dimension() -> u32 {
    4096
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            max_dimension: default_max_dimension(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Minutes of inactivity after which a session is forgotten
    #[serde(default = "default_idle_minutes")]
    pub idle_minutes: u64,
}

fn default_idle_minutes() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_minutes: default_idle_minutes(),
        }
    }
}

impl AppConfig {
    /// Load configuration from AssetLoader (embedded or external)
    pub fn load_from_assets(loader: &AssetLoader) -> Self {
        match loader.read_config_string() {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    let config: Self = config;
                    tracing::info!(
                        model = %config.model,
                        send_image = config.analysis.send_image,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Slider values a new session starts with.
    ///
    /// Out-of-range configured values fall back to the built-in defaults.
    pub fn default_params(&self) -> EnhanceParams {
        EnhanceParams::new(self.enhance.default_denoise, self.enhance.default_contrast)
            .unwrap_or_else(|e| {
                tracing::warn!(%e, "Invalid enhance defaults in config, using built-in values");
                EnhanceParams::default()
            })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session.idle_minutes.saturating_mul(60))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            model: default_model(),
            api_base_url: default_api_base_url(),
            timeout_secs: None,
            analysis: AnalysisConfig::default(),
            enhance: EnhanceConfig::default(),
            upload: UploadConfig::default(),
            session: SessionConfig::default(),
        }
    }
}
