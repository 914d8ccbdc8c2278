use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};

use super::headers::{session_cookie, HeaderMapExt};
use crate::error::ApiError;
use crate::models::{Action, ViewState};
use crate::server::AppState;
use crate::services::SessionId;

/// The calling browser's session for the duration of one request
pub struct Session {
    pub id: SessionId,
    pub view: ViewState,
    is_new: bool,
}

impl Session {
    /// Resume the session named by the cookie, or start a new one
    pub async fn open(state: &AppState, headers: &HeaderMap) -> Result<Self, ApiError> {
        if let Some(id) = headers.session_id() {
            if let Some(view) = state.sessions.load(&id).await? {
                return Ok(Self {
                    id,
                    view,
                    is_new: false,
                });
            }
            tracing::debug!(session = %id, "Unknown session, starting a new one");
        }

        let view = ViewState::new(state.config.default_params(), state.credentials_present);
        let id = state.sessions.create(view.clone()).await?;
        Ok(Self {
            id,
            view,
            is_new: true,
        })
    }

    /// Advance the view by one action and store the result
    pub async fn commit(&mut self, state: &AppState, action: Action) -> Result<(), ApiError> {
        self.view = self.view.apply(action);
        if let Some(ref error) = self.view.error {
            tracing::warn!(session = %self.id, phase = %self.view.phase, error = %error, "Interaction failed");
        } else {
            tracing::debug!(session = %self.id, phase = %self.view.phase, "Interaction applied");
        }
        state.sessions.save(&self.id, self.view.clone()).await
    }

    /// Pick up changes other requests stored since this one opened the
    /// session. Returns false when the session has expired meanwhile.
    pub async fn reload(&mut self, state: &AppState) -> Result<bool, ApiError> {
        match state.sessions.load(&self.id).await? {
            Some(view) => {
                self.view = view;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Send the browser back to the page (post/redirect/get)
    pub fn redirect(&self) -> Result<Response, ApiError> {
        let mut response = (StatusCode::SEE_OTHER, [(header::LOCATION, "/")]).into_response();
        self.attach_cookie(&mut response)?;
        Ok(response)
    }

    /// Serve a rendered page
    pub fn page(&self, html: String) -> Result<Response, ApiError> {
        let mut response = Html(html).into_response();
        self.attach_cookie(&mut response)?;
        Ok(response)
    }

    fn attach_cookie(&self, response: &mut Response) -> Result<(), ApiError> {
        if self.is_new {
            response
                .headers_mut()
                .insert(header::SET_COOKIE, session_cookie(&self.id)?);
        }
        Ok(())
    }
}
