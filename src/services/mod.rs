pub mod analysis_client;
pub mod credentials;
pub mod form_collector;
pub mod image_pipeline;
pub mod prompt_builder;
pub mod session_store;
pub mod template_service;

pub use analysis_client::{AnalysisClient, AnalysisError, GeminiClient, MockAnalysisClient};
pub use credentials::{ApiKey, CredentialError, KeySource};
pub use form_collector::{FormError, FormInput};
pub use image_pipeline::PipelineError;
pub use session_store::{InMemorySessionStore, SessionId, SessionStore, SESSION_COOKIE};
pub use template_service::{TemplateError, TemplateService, PAGE_TEMPLATE};
