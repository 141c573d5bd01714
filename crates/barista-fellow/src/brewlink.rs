//! Shared brew-link handling.
//!
//! Brew links are shareable URLs encoding a profile, e.g.
//! `https://fellow.co/p/a1b2c3`. The slug after `/p/` addresses a shared
//! profile record in the cloud.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::FellowError;

/// Hostname used when generating share links.
const SHARE_HOST: &str = "https://fellow.co";

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|/p/)([A-Za-z0-9]{4,16})/?(?:\?|#|$)").expect("valid slug regex")
    })
}

/// Extract the share slug from a brew link.
///
/// Accepts full URLs (`https://fellow.co/p/a1b2c3`), bare paths
/// (`/p/a1b2c3`), and raw slugs (`a1b2c3`).
pub fn extract_share_slug(link: &str) -> Result<String, FellowError> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return Err(FellowError::InvalidBrewLink("empty link".to_string()));
    }

    match slug_pattern().captures(trimmed) {
        Some(caps) => Ok(caps[1].to_string()),
        None => Err(FellowError::InvalidBrewLink(format!(
            "no share slug in '{}'",
            trimmed
        ))),
    }
}

/// Build the public share URL for a slug.
pub fn share_url(slug: &str) -> String {
    format!("{}/p/{}", SHARE_HOST, slug)
}
