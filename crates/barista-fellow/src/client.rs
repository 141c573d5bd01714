//! Brewer cloud API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::brewlink::{extract_share_slug, share_url};
use crate::error::FellowError;
use crate::types::{CoffeeProfile, Session, StoredProfile};

/// Production endpoint for the brewer cloud service.
pub const DEFAULT_BASE_URL: &str = "https://api.fellowproducts.com/v1";

/// Error body shape returned by the cloud service.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Response from generating a share link.
#[derive(Debug, Deserialize)]
struct ShareResponse {
    link: String,
}

/// Device metadata returned by `/devices`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Device {
    display_name: Option<String>,
}

/// Client for the Fellow brewer cloud API.
///
/// Holds an authenticated session behind a lock so one client can be shared
/// across tasks. The device config is cached after the first fetch and only
/// re-fetched when asked for a remote refresh.
pub struct FellowClient {
    http: Client,
    base_url: String,
    session: Arc<RwLock<Option<Session>>>,
    device_config: Arc<RwLock<Option<Value>>>,
}

impl FellowClient {
    /// Create a client for the production endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client for the given endpoint (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: Arc::new(RwLock::new(None)),
            device_config: Arc::new(RwLock::new(None)),
        }
    }

    /// Authenticate with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), FellowError> {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            email: &'a str,
            password: &'a str,
        }

        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest {
                email: email.trim(),
                password: password.trim(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FellowError::Auth(format!(
                "login failed ({}): {}",
                status, text
            )));
        }

        let session: Session = response.json().await?;
        debug!(user_id = %session.user_id, "authenticated with brewer cloud");

        *self.session.write().await = Some(session);
        Ok(())
    }

    /// Whether this client holds a session.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    async fn access_token(&self) -> Result<String, FellowError> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or_else(|| FellowError::Auth("not authenticated".to_string()))
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, FellowError> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.base_url, path);
        Ok(self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", token)))
    }

    /// Map a non-success response to a `FellowError`.
    async fn api_error(response: reqwest::Response) -> FellowError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or(text);

        match status {
            StatusCode::UNAUTHORIZED => FellowError::Auth(message),
            StatusCode::CONFLICT if message.to_lowercase().contains("limit") => {
                FellowError::ProfileLimit
            }
            _ => FellowError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, FellowError> {
        let response = self.request(Method::GET, path).await?.send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json().await?)
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    /// List all profiles on the account.
    pub async fn get_profiles(&self) -> Result<Vec<StoredProfile>, FellowError> {
        self.get_json("/profiles").await
    }

    /// Find a profile by exact title.
    pub async fn get_profile_by_title(
        &self,
        title: &str,
    ) -> Result<Option<StoredProfile>, FellowError> {
        let profiles = self.get_profiles().await?;
        Ok(profiles.into_iter().find(|p| p.profile.title == title))
    }

    /// Create a profile. Validates locally before sending.
    pub async fn create_profile(
        &self,
        profile: &CoffeeProfile,
    ) -> Result<StoredProfile, FellowError> {
        profile.validate()?;

        let response = self
            .request(Method::POST, "/profiles")
            .await?
            .json(profile)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let created: StoredProfile = response.json().await?;
        debug!(id = %created.id, title = %created.profile.title, "created profile");
        Ok(created)
    }

    /// Create a profile from a loosely-typed JSON value.
    ///
    /// Used when the profile came from an LLM extraction or a backup:
    /// deserializes into the typed profile first so validation still runs.
    pub async fn create_profile_from_value(
        &self,
        value: &Value,
    ) -> Result<StoredProfile, FellowError> {
        let profile: CoffeeProfile = serde_json::from_value(value.clone())?;
        self.create_profile(&profile).await
    }

    /// Update an existing profile by id.
    pub async fn update_profile(
        &self,
        id: &str,
        profile: &CoffeeProfile,
    ) -> Result<StoredProfile, FellowError> {
        profile.validate()?;

        let response = self
            .request(Method::PATCH, &format!("/profiles/{}", id))
            .await?
            .json(profile)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FellowError::ProfileNotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Delete a profile by id.
    pub async fn delete_profile_by_id(&self, id: &str) -> Result<(), FellowError> {
        let response = self
            .request(Method::DELETE, &format!("/profiles/{}", id))
            .await?
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FellowError::ProfileNotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        debug!(id, "deleted profile");
        Ok(())
    }

    /// Generate a public share link for a profile.
    pub async fn generate_share_link(&self, profile_id: &str) -> Result<String, FellowError> {
        let response = self
            .request(Method::POST, &format!("/profiles/{}/share", profile_id))
            .await?
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FellowError::ProfileNotFound(profile_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let share: ShareResponse = response.json().await?;
        // The service may return either a slug or a full URL.
        if share.link.starts_with("http") {
            Ok(share.link)
        } else {
            Ok(share_url(&share.link))
        }
    }

    /// Fetch the profile encoded by a shared brew link.
    ///
    /// Shared profiles are public, so this works without a session.
    pub async fn parse_brewlink(&self, link: &str) -> Result<CoffeeProfile, FellowError> {
        let slug = extract_share_slug(link)?;
        let url = format!("{}/shared/{}", self.base_url, slug);

        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FellowError::InvalidBrewLink(format!(
                "no shared profile for '{}'",
                slug
            )));
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(response.json().await?)
    }

    // ------------------------------------------------------------------
    // Device
    // ------------------------------------------------------------------

    /// Get the brewer's display name.
    pub async fn get_display_name(&self) -> Result<String, FellowError> {
        let devices: Vec<Device> = self.get_json("/devices").await?;
        Ok(devices
            .into_iter()
            .next()
            .and_then(|d| d.display_name)
            .unwrap_or_default())
    }

    /// Get the device config.
    ///
    /// With `remote` set, always re-fetches from the cloud and refreshes the
    /// cache; otherwise a cached config is served when one exists.
    pub async fn get_device_config(&self, remote: bool) -> Result<Value, FellowError> {
        if !remote
            && let Some(cached) = self.device_config.read().await.clone()
        {
            debug!("serving cached device config");
            return Ok(cached);
        }

        let config: Value = self.get_json("/device/config").await?;
        *self.device_config.write().await = Some(config.clone());
        Ok(config)
    }

    /// Adjust one device setting to a new value.
    pub async fn adjust_setting(&self, setting: &str, value: &Value) -> Result<(), FellowError> {
        let body = serde_json::json!({ setting: value });
        let response = self
            .request(Method::PATCH, "/device/config")
            .await?
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        // The cached config is now stale.
        *self.device_config.write().await = None;
        debug!(setting, "adjusted device setting");
        Ok(())
    }
}

impl Default for FellowClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FellowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FellowClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
