//! HTTP client for the Fellow brewer cloud API.
//!
//! This crate provides a typed client for the cloud service behind a
//! Fellow Aiden-class pour-over brewer:
//!
//! - **Authentication**: email/password login with a cached session token
//! - **Profiles**: CRUD for brew profiles stored on the account
//! - **Device**: display name, device config (cached or refreshed), setting
//!   adjustment
//! - **Brew links**: parsing shared profile links and generating share links

mod brewlink;
mod client;
mod error;
mod types;

pub use brewlink::{extract_share_slug, share_url};
pub use client::{DEFAULT_BASE_URL, FellowClient};
pub use error::{FellowError, ProfileValidationError};
pub use types::{CoffeeProfile, Session, StoredProfile, SERVER_FIELDS};
