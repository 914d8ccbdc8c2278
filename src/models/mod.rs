pub mod analysis;
pub mod config;
pub mod encoded_image;
pub mod enhance_params;
pub mod patient;
pub mod view_state;

pub use analysis::{AnalysisRequest, AnalysisResult, NotReady};
pub use config::AppConfig;
pub use encoded_image::EncodedImage;
pub use enhance_params::{EnhanceParams, ParamError, CONTRAST_RANGE, DENOISE_RANGE};
pub use patient::{
    Condition, FocusArea, Gender, PatientRecord, SmokingStatus, UnknownOption, AGE_MAX, AGE_MIN,
};
pub use view_state::{Action, ImagePanel, Phase, ViewState};
