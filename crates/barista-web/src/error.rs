//! Error types for the dashboard.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use barista_tools::RecipeError;

/// Errors surfaced by dashboard handlers.
///
/// Every variant renders as a JSON error body; none of them crash a
/// request, and none of them are fatal to the server.
#[derive(Debug, Error)]
pub enum WebError {
    /// Brewer cloud failure.
    #[error("brewer error: {0}")]
    Fellow(#[from] barista_fellow::FellowError),

    /// Local store failure.
    #[error("store error: {0}")]
    Store(#[from] barista_store::StoreError),

    /// Recipe engine failure.
    #[error("recipe error: {0}")]
    Recipe(#[from] RecipeError),

    /// The request needs a logged-in brewer session.
    #[error("not connected to a brewer")]
    NotLoggedIn,

    /// AI generation without an API key anywhere in the config chain.
    #[error("no OpenAI API key configured")]
    MissingApiKey,
}

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            WebError::NotLoggedIn => StatusCode::UNAUTHORIZED,
            WebError::MissingApiKey => StatusCode::BAD_REQUEST,
            WebError::Fellow(barista_fellow::FellowError::Auth(_)) => StatusCode::UNAUTHORIZED,
            WebError::Fellow(_) | WebError::Recipe(_) => StatusCode::BAD_GATEWAY,
            WebError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(error = %self, status = %status, "request failed");
        (status, Json(json!({ "ok": false, "error": self.to_string() }))).into_response()
    }
}
