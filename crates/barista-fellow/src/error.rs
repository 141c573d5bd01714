//! Error types for the brewer cloud client.

use thiserror::Error;

/// Errors that can occur when interacting with the brewer cloud API.
#[derive(Debug, Error)]
pub enum FellowError {
    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Profile not found.
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// The device's profile storage is full (14 slots).
    #[error("profile limit reached: the brewer holds at most 14 profiles")]
    ProfileLimit,

    /// A profile failed local validation before being sent.
    #[error(transparent)]
    InvalidProfile(#[from] ProfileValidationError),

    /// A brew link could not be parsed.
    #[error("invalid brew link: {0}")]
    InvalidBrewLink(String),

    /// API error from the cloud service.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// A profile field that is out of range or off-step.
#[derive(Debug, Error)]
pub enum ProfileValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("ratio must be between 14 and 20 in 0.5 steps, got {0}")]
    Ratio(f64),

    #[error("bloom ratio must be between 1 and 3 in 0.5 steps, got {0}")]
    BloomRatio(f64),

    #[error("bloom duration must be between 1 and 120 seconds, got {0}")]
    BloomDuration(u32),

    #[error("bloom temperature must be between 50 and 99 celsius, got {0}")]
    BloomTemperature(f64),

    #[error("{mode} pulse count must be between 1 and 10, got {count}")]
    PulseCount { mode: &'static str, count: u32 },

    #[error("{mode} pulse interval must be between 5 and 60 seconds, got {seconds}")]
    PulseInterval { mode: &'static str, seconds: u32 },

    #[error("{mode} pulse temperature must be between 50 and 99 celsius, got {temp}")]
    PulseTemperature { mode: &'static str, temp: f64 },

    #[error("{mode} needs one temperature per pulse: {count} pulses but {temps} temperatures")]
    PulseTemperatureCount {
        mode: &'static str,
        count: u32,
        temps: usize,
    },
}
