//! Brew studio dashboard.
//!
//! A multi-page web UI over the brewer cloud client and the local stores:
//! login, dashboard, profile manager, AI generation, brew-link import,
//! backups, settings. No LLM sits between the user and the device here —
//! the one LLM touchpoint is the one-off recipe generation page.

mod error;
mod routes;

pub use error::WebError;
pub use routes::{AppState, create_router};
