pub mod form;
pub mod headers;
pub mod page;
pub mod rest;
pub mod session;
pub mod upload;

pub use form::{analyze, enhance, reset, save_patient, upload_xray};
pub use page::{show_page, DISCLAIMER, FOOTER};
pub use rest::{analyze_image, build_prompt, enhance_image};
pub use rest::{__path_analyze_image, __path_build_prompt, __path_enhance_image};
pub use rest::{AnalyzeRequest, AnalyzeResponse, EnhanceResponse, PromptRequest, PromptResponse};
