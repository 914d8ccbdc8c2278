use crate::assets::AssetLoader;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Template that renders the whole page
pub const PAGE_TEMPLATE: &str = "index.html";

/// Error type for template rendering
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),

    #[error("Template not found: {0}")]
    NotFound(String),
}

/// Service for rendering HTML pages with Tera
pub struct TemplateService {
    assets: AssetLoader,
}

impl TemplateService {
    /// Create a new template service, checking the page template parses
    pub fn new(assets: AssetLoader) -> Result<Self, TemplateError> {
        let service = Self { assets };
        let tera = service.load()?;
        tracing::info!(
            templates = tera.get_template_names().count(),
            "Template service initialized"
        );
        Ok(service)
    }

    /// Register custom Tera filters
    fn register_filters(tera: &mut Tera) {
        // truncate filter with custom length, counted in characters
        tera.register_filter(
            "truncate",
            |value: &tera::Value, args: &HashMap<String, tera::Value>| {
                let s = tera::try_get_value!("truncate", "value", String, value);
                let len = args
                    .get("length")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(50)
                    .max(4) as usize;

                if s.chars().count() <= len {
                    Ok(tera::Value::String(s))
                } else {
                    let truncated = s.chars().take(len - 3).collect::<String>() + "...";
                    Ok(tera::Value::String(truncated))
                }
            },
        );
    }

    /// Templates are loaded fresh on every render to support live editing
    fn load(&self) -> Result<Tera, TemplateError> {
        let mut tera = Tera::default();
        for name in self.assets.list_templates() {
            let content = self
                .assets
                .read_template_string(&name)
                .map_err(|_| TemplateError::NotFound(name.clone()))?;
            tera.add_raw_template(&name, &content)?;
        }
        if tera.get_template(PAGE_TEMPLATE).is_err() {
            return Err(TemplateError::NotFound(PAGE_TEMPLATE.to_string()));
        }
        Self::register_filters(&mut tera);
        Ok(tera)
    }

    /// Render a template with the given data
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, TemplateError> {
        let tera = self.load()?;
        let context = Context::from_serialize(data)?;
        Ok(tera.render(template, &context)?)
    }

    /// Minimal page for when the real template cannot be rendered
    pub fn render_error(&self, error: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Error</title></head>
<body style="font-family: sans-serif; max-width: 40rem; margin: 4rem auto;">
  <h1>Something went wrong</h1>
  <pre style="background: #fff0f0; border: 1px solid #c86464; padding: 1rem; white-space: pre-wrap;">{}</pre>
  <p>Check server logs for details. <a href="/">Back to the form</a></p>
</body>
</html>"#,
            html_escape(error)
        )
    }
}

/// Simple HTML escape for error messages
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
