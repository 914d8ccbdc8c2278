//! Header parsing utilities for browser requests.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::error::ApiError;
use crate::services::{SessionId, SESSION_COOKIE};

/// Extension trait for convenient header parsing.
pub trait HeaderMapExt {
    /// Get a header value as a string, returning None if missing.
    fn get_str(&self, name: &str) -> Option<&str>;

    /// Value of the first cookie called `name` across all `Cookie` headers.
    fn cookie(&self, name: &str) -> Option<&str>;

    /// Session id from the session cookie, if present and well-formed.
    fn session_id(&self) -> Option<SessionId>;
}

impl HeaderMapExt for HeaderMap {
    fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    fn session_id(&self) -> Option<SessionId> {
        self.cookie(SESSION_COOKIE).and_then(SessionId::parse)
    }
}

/// `Set-Cookie` value that binds the browser to a session
pub fn session_cookie(id: &SessionId) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        id.as_str()
    ))
    .map_err(|e| ApiError::Internal(format!("Invalid session cookie: {e}")))
}
