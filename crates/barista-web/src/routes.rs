//! Web routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use barista_fellow::{CoffeeProfile, FellowClient, StoredProfile};
use barista_openai::OpenAiClient;
use barista_store::{BackupStore, Config, prepare_restore};
use barista_tools::RecipeEngine;

use crate::error::WebError;

/// The brewer stores at most this many profiles.
const DEVICE_PROFILE_LIMIT: usize = 14;
/// Threshold for the "nearly full" warning badge.
const NEARLY_FULL_THRESHOLD: usize = 12;
/// How many backups the backups page lists.
const BACKUPS_SHOWN: usize = 20;

/// Shared state for the dashboard.
pub struct AppState {
    config: Config,
    backups: BackupStore,
    fellow_base_url: String,
    openai_base_url: String,
    /// Logged-in brewer client; `None` until a login succeeds.
    fellow: RwLock<Option<Arc<FellowClient>>>,
    /// LLM client for the generate page, built lazily from config.
    openai: RwLock<Option<Arc<OpenAiClient>>>,
}

impl AppState {
    pub fn new(config: Config, backups: BackupStore) -> Self {
        Self::with_endpoints(
            config,
            backups,
            barista_fellow::DEFAULT_BASE_URL,
            barista_openai::DEFAULT_BASE_URL,
        )
    }

    /// State with explicit upstream endpoints (used by tests).
    pub fn with_endpoints(
        config: Config,
        backups: BackupStore,
        fellow_base_url: impl Into<String>,
        openai_base_url: impl Into<String>,
    ) -> Self {
        Self {
            config,
            backups,
            fellow_base_url: fellow_base_url.into(),
            openai_base_url: openai_base_url.into(),
            fellow: RwLock::new(None),
            openai: RwLock::new(None),
        }
    }

    /// Attempt a login with credentials resolved from config.
    ///
    /// Called once at startup; a failure just leaves the login page up.
    pub async fn try_auto_login(&self) -> bool {
        let (Some(email), Some(password)) = (
            self.config.fellow_email().await,
            self.config.fellow_password().await,
        ) else {
            return false;
        };

        match self.connect(&email, &password).await {
            Ok(()) => {
                info!("auto-connected with saved credentials");
                true
            }
            Err(e) => {
                warn!(error = %e, "auto-login failed");
                false
            }
        }
    }

    async fn connect(&self, email: &str, password: &str) -> Result<(), WebError> {
        let client = Arc::new(FellowClient::with_base_url(&self.fellow_base_url));
        client.login(email, password).await?;
        *self.fellow.write().await = Some(client);
        Ok(())
    }

    async fn fellow(&self) -> Result<Arc<FellowClient>, WebError> {
        self.fellow
            .read()
            .await
            .clone()
            .ok_or(WebError::NotLoggedIn)
    }

    async fn logged_in(&self) -> bool {
        self.fellow.read().await.is_some()
    }

    /// Recipe engine over the configured (or freshly provided) API key.
    async fn recipe_engine(&self, api_key: Option<String>) -> Result<RecipeEngine, WebError> {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            let client = Arc::new(OpenAiClient::with_base_url(
                key.trim(),
                &self.openai_base_url,
            ));
            *self.openai.write().await = Some(Arc::clone(&client));
            return Ok(RecipeEngine::new(client));
        }

        if let Some(client) = self.openai.read().await.clone() {
            return Ok(RecipeEngine::new(client));
        }

        let key = self
            .config
            .openai_api_key()
            .await
            .ok_or(WebError::MissingApiKey)?;
        let client = Arc::new(OpenAiClient::with_base_url(key, &self.openai_base_url));
        *self.openai.write().await = Some(Arc::clone(&client));
        Ok(RecipeEngine::new(client))
    }
}

/// Create the dashboard router.
///
/// If `static_dir` is provided, its files are served under `/static`.
pub fn create_router(state: Arc<AppState>, static_dir: Option<&str>) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/dashboard", get(dashboard_page))
        .route("/profiles", get(profiles_page))
        .route("/generate", get(generate_page))
        .route("/brewlinks", get(brewlinks_page))
        .route("/backups", get(backups_page))
        .route("/settings", get(settings_page))
        .route("/health", get(health))
        .route("/api/login", post(api_login))
        .route("/api/logout", post(api_logout))
        .route("/api/profiles", post(api_save_profile))
        .route("/api/profiles/{id}/delete", post(api_delete_profile))
        .route("/api/profiles/{id}/share", post(api_share_profile))
        .route("/api/generate", post(api_generate))
        .route("/api/brewlinks/import", post(api_import_brewlink))
        .route("/api/backups/{index}/restore", post(api_restore_backup))
        .route("/api/device-config", get(api_device_config))
        .with_state(state);

    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.logged_in().await {
        Redirect::to("/dashboard").into_response()
    } else {
        Html(login_html(&state).await).into_response()
    }
}

async fn dashboard_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let client = match state.fellow().await {
        Ok(client) => client,
        Err(_) => return Redirect::to("/").into_response(),
    };

    let device_name = match client.get_display_name().await {
        Ok(name) if !name.is_empty() => name,
        Ok(_) => "Unknown Brewer Name".to_string(),
        Err(e) => {
            warn!(error = %e, "failed to fetch display name");
            "Unavailable".to_string()
        }
    };

    let profiles = match client.get_profiles().await {
        Ok(profiles) => profiles,
        Err(e) => {
            warn!(error = %e, "failed to fetch profiles for dashboard");
            Vec::new()
        }
    };

    let backup_count = state.backups.count().await;
    let body = dashboard_html(&device_name, &profiles, backup_count);
    Html(layout("Dashboard", "dashboard", &body)).into_response()
}

async fn profiles_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let client = match state.fellow().await {
        Ok(client) => client,
        Err(_) => return Redirect::to("/").into_response(),
    };

    let profiles = match client.get_profiles().await {
        Ok(profiles) => profiles,
        Err(e) => {
            warn!(error = %e, "failed to fetch profiles");
            Vec::new()
        }
    };

    Html(layout("Profile Manager", "profiles", &profiles_html(&profiles))).into_response()
}

async fn generate_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let has_key = state.config.openai_api_key().await.is_some()
        || state.openai.read().await.is_some();
    Html(layout("AI Barista", "generate", &generate_html(has_key)))
}

async fn brewlinks_page() -> impl IntoResponse {
    Html(layout("Brew Links", "brewlinks", BREWLINKS_BODY))
}

async fn backups_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let entries = match state.backups.load().await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "could not load profile backups");
            Vec::new()
        }
    };
    Html(layout("Backups", "backups", &backups_html(&entries)))
}

async fn settings_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sources = state.config.sources().await;
    Html(layout("Settings", "settings", &settings_html(&sources)))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "logged_in": state.logged_in().await,
        "backups": state.backups.count().await,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn api_login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, WebError> {
    state.connect(&request.email, &request.password).await?;

    // Remember the email (non-sensitive) for the next login.
    let saved = state.config.fellow_email().await;
    if saved.as_deref() != Some(request.email.as_str())
        && let Err(e) = state.config.save_email(&request.email).await
    {
        warn!(error = %e, "could not save email to config file");
    }

    info!("connected to brewer");
    Ok(Json(json!({ "ok": true })))
}

async fn api_logout(State(state): State<Arc<AppState>>) -> Json<Value> {
    *state.fellow.write().await = None;
    Json(json!({ "ok": true }))
}

#[derive(Debug, Deserialize)]
struct SaveProfileRequest {
    profile: Value,
}

/// Create or update a profile. Updates match on title, as the dashboard
/// editor works title-first.
async fn api_save_profile(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveProfileRequest>,
) -> Result<Json<Value>, WebError> {
    let client = state.fellow().await?;

    let mut raw = request.profile;
    if let Some(map) = raw.as_object_mut() {
        // The editor may round-trip fields the API does not accept back.
        map.remove("description");
        map.insert("profileType".to_string(), json!(0));
    }

    let profile: CoffeeProfile =
        serde_json::from_value(raw).map_err(barista_fellow::FellowError::Json)?;

    let existing = client.get_profile_by_title(&profile.title).await?;
    let saved = match existing {
        Some(existing) => client.update_profile(&existing.id, &profile).await?,
        None => client.create_profile(&profile).await?,
    };

    Ok(Json(json!({ "ok": true, "profile": saved })))
}

/// Delete a profile, backing it up first. A failed backup is logged and
/// surfaced but does not block the delete.
async fn api_delete_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, WebError> {
    let client = state.fellow().await?;

    let mut backed_up = false;
    match client.get_profiles().await {
        Ok(profiles) => {
            if let Some(profile) = profiles.into_iter().find(|p| p.id == id) {
                let raw = serde_json::to_value(&profile)
                    .map_err(barista_fellow::FellowError::Json)?;
                match state.backups.save_backup(&raw).await {
                    Ok(()) => backed_up = true,
                    Err(e) => warn!(error = %e, id = %id, "could not back up profile before delete"),
                }
            }
        }
        Err(e) => warn!(error = %e, id = %id, "could not fetch profile for backup"),
    }

    client.delete_profile_by_id(&id).await?;
    info!(id = %id, backed_up, "deleted profile");
    Ok(Json(json!({ "ok": true, "backed_up": backed_up })))
}

async fn api_share_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, WebError> {
    let client = state.fellow().await?;
    let link = client.generate_share_link(&id).await?;
    Ok(Json(json!({ "ok": true, "link": link })))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    description: String,
    #[serde(default)]
    api_key: Option<String>,
}

async fn api_generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<Value>, WebError> {
    let engine = state.recipe_engine(request.api_key).await?;
    let generated = engine.generate_profile(&request.description).await?;

    Ok(Json(json!({
        "ok": true,
        "profile": generated.profile,
        "explanation": generated.explanation,
    })))
}

#[derive(Debug, Deserialize)]
struct ImportRequest {
    link: String,
}

async fn api_import_brewlink(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<Value>, WebError> {
    let client = state.fellow().await?;
    let profile = client.parse_brewlink(&request.link).await?;
    Ok(Json(json!({ "ok": true, "profile": profile })))
}

async fn api_restore_backup(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<Value>, WebError> {
    let client = state.fellow().await?;
    let entry = state.backups.get(index).await?;

    let payload = prepare_restore(&entry, Utc::now());
    let restored = client.create_profile_from_value(&payload).await?;

    info!(index, title = %restored.profile.title, "restored profile from backup");
    Ok(Json(json!({ "ok": true, "profile": restored })))
}

async fn api_device_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, WebError> {
    let client = state.fellow().await?;
    let config = client.get_device_config(true).await?;
    Ok(Json(config))
}

// ---------------------------------------------------------------------------
// HTML rendering
// ---------------------------------------------------------------------------

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
body { font-family: -apple-system, 'Segoe UI', sans-serif; margin: 0; background: #faf7f2; color: #2b2b2b; }
nav { background: #3e2723; padding: 0.6rem 1rem; }
nav a { color: #d7ccc8; margin-right: 1rem; text-decoration: none; }
nav a.active { color: #fff; font-weight: 600; }
main { max-width: 960px; margin: 1.5rem auto; padding: 0 1rem; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #e0d7d0; }
textarea { width: 100%; font-family: monospace; }
button { background: #6d4c41; color: #fff; border: none; padding: 0.4rem 0.9rem; border-radius: 4px; cursor: pointer; }
button:hover { background: #5d4037; }
.badge { padding: 0.15rem 0.5rem; border-radius: 999px; font-size: 0.85rem; }
.badge.ok { background: #c8e6c9; }
.badge.warn { background: #fff9c4; }
.badge.full { background: #ffcdd2; }
.note { color: #6d6d6d; font-size: 0.9rem; }
pre { background: #f1ece6; padding: 0.8rem; overflow-x: auto; }
#status { margin: 0.8rem 0; color: #4e342e; }
"#;

fn layout(title: &str, active: &str, body: &str) -> String {
    let nav_link = |href: &str, key: &str, label: &str| {
        let class = if key == active { " class=\"active\"" } else { "" };
        format!("<a href=\"{}\"{}>{}</a>", href, class, label)
    };

    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{} — Brew Studio</title>
<style>{}</style>
</head>
<body>
<nav>
{}{}{}{}{}{}
<a href="#" onclick="fetch('/api/logout',{{method:'POST'}}).then(()=>location='/')">Logout</a>
</nav>
<main>
<div id="status"></div>
{}
</main>
</body>
</html>"##,
        escape_html(title),
        STYLE,
        nav_link("/dashboard", "dashboard", "Dashboard"),
        nav_link("/profiles", "profiles", "Profile Manager"),
        nav_link("/generate", "generate", "AI Barista"),
        nav_link("/brewlinks", "brewlinks", "Brew Links"),
        nav_link("/backups", "backups", "Backups"),
        nav_link("/settings", "settings", "Settings"),
        body
    )
}

async fn login_html(state: &AppState) -> String {
    let saved_email = state.config.fellow_email().await.unwrap_or_default();
    let sources: String = state
        .config
        .sources()
        .await
        .iter()
        .map(|s| format!("<li>{}: {}</li>", s.name, s.source))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Brew Studio</title><style>{}</style></head>
<body>
<main>
<h1>Brew Studio</h1>
<p>Connect to your brewer.</p>
<div id="status"></div>
<form onsubmit="login(event)">
<p><label>Email<br><input id="email" type="email" value="{}" required></label></p>
<p><label>Password<br><input id="password" type="password" required></label></p>
<button type="submit">Connect to Brewer</button>
</form>
<h3>Configuration sources</h3>
<ul class="note">{}</ul>
<script>
async function login(e) {{
  e.preventDefault();
  const r = await fetch('/api/login', {{
    method: 'POST',
    headers: {{'content-type': 'application/json'}},
    body: JSON.stringify({{email: email.value, password: password.value}})
  }});
  const b = await r.json();
  if (b.ok) location = '/dashboard';
  else document.getElementById('status').textContent = b.error || 'Connection failed.';
}}
</script>
</main>
</body>
</html>"#,
        STYLE,
        escape_html(&saved_email),
        sources
    )
}

fn profile_badge(count: usize) -> String {
    if count >= DEVICE_PROFILE_LIMIT {
        format!(
            r#"<span class="badge full">{}/{} profiles (full)</span>"#,
            count, DEVICE_PROFILE_LIMIT
        )
    } else if count >= NEARLY_FULL_THRESHOLD {
        format!(
            r#"<span class="badge warn">{}/{} profiles (nearly full)</span>"#,
            count, DEVICE_PROFILE_LIMIT
        )
    } else {
        format!(
            r#"<span class="badge ok">{}/{} profiles</span>"#,
            count, DEVICE_PROFILE_LIMIT
        )
    }
}

fn dashboard_html(device_name: &str, profiles: &[StoredProfile], backup_count: usize) -> String {
    let mut recent: Vec<&StoredProfile> = profiles.iter().collect();
    recent.sort_by_key(|p| std::cmp::Reverse(p.last_used_time.unwrap_or(0)));
    let recent_list: String = recent
        .iter()
        .take(3)
        .map(|p| format!("<li>{}</li>", escape_html(&p.profile.title)))
        .collect();

    format!(
        r#"<h1>Dashboard</h1>
<h3>Brewer</h3>
<p><strong>Name:</strong> {}</p>
<h3>Profiles</h3>
<p>{}</p>
<p>{} profile backups available</p>
<h3>Recently used</h3>
<ul>{}</ul>"#,
        escape_html(device_name),
        profile_badge(profiles.len()),
        backup_count,
        recent_list
    )
}

fn profiles_html(profiles: &[StoredProfile]) -> String {
    let rows: String = profiles
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                r#"<tr>
<td>{}</td><td class="note">{}</td>
<td><button onclick="loadProfile({})">Edit</button>
<button onclick="shareProfile('{}')">Share</button>
<button onclick="deleteProfile('{}', '{}')">Delete</button></td>
</tr>"#,
                escape_html(&p.profile.title),
                escape_html(&p.id),
                i,
                escape_html(&p.id),
                escape_html(&p.id),
                escape_html(&p.profile.title),
            )
        })
        .collect();

    let profiles_json =
        serde_json::to_string(profiles).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"<h1>Profile Manager</h1>
<p>{}</p>
<table>
<tr><th>Title</th><th>Id</th><th>Actions</th></tr>
{}
</table>
<h3>Editor</h3>
<p class="note">Edit the profile JSON and save. Saving matches on title: an existing title is updated, a new one is created.</p>
<textarea id="editor" rows="18"></textarea><br>
<button onclick="saveProfile()">Save to Brewer</button>
<script>
const PROFILES = {};
function loadProfile(i) {{
  document.getElementById('editor').value = JSON.stringify(PROFILES[i], null, 2);
}}
async function saveProfile() {{
  let profile;
  try {{ profile = JSON.parse(document.getElementById('editor').value); }}
  catch (e) {{ status.textContent = 'Editor does not contain valid JSON: ' + e; return; }}
  const r = await fetch('/api/profiles', {{
    method: 'POST',
    headers: {{'content-type': 'application/json'}},
    body: JSON.stringify({{profile}})
  }});
  const b = await r.json();
  status.textContent = b.ok ? 'Profile saved.' : (b.error || 'Save failed.');
  if (b.ok) setTimeout(() => location.reload(), 600);
}}
async function deleteProfile(id, title) {{
  if (!confirm('Really delete "' + title + '"? A backup is taken first.')) return;
  const r = await fetch('/api/profiles/' + id + '/delete', {{method: 'POST'}});
  const b = await r.json();
  status.textContent = b.ok ? 'Profile deleted.' : (b.error || 'Delete failed.');
  if (b.ok) setTimeout(() => location.reload(), 600);
}}
async function shareProfile(id) {{
  const r = await fetch('/api/profiles/' + id + '/share', {{method: 'POST'}});
  const b = await r.json();
  status.textContent = b.ok ? ('Share link: ' + b.link) : (b.error || 'Share failed.');
}}
</script>"#,
        profile_badge(profiles.len()),
        rows,
        profiles_json
    )
}

fn generate_html(has_key: bool) -> String {
    let key_note = if has_key {
        r#"<p class="note">Using the configured OpenAI API key.</p>"#.to_string()
    } else {
        r#"<p><label>OpenAI API Key<br><input id="api_key" type="password" placeholder="sk-..."></label></p>"#
            .to_string()
    };

    format!(
        r#"<h1>AI Barista</h1>
<p>Describe a coffee; the barista drafts a profile you can edit and save.</p>
{}
<p><textarea id="description" rows="5" placeholder="Light roasted blend of washed (Sidama, Ethiopia) and gesha (Santa Barbara, Honduras) coffees"></textarea></p>
<button onclick="generate()">Generate AI Profile</button>
<h3>Explanation</h3>
<pre id="explanation"></pre>
<h3>Generated profile</h3>
<textarea id="editor" rows="18"></textarea><br>
<button onclick="saveProfile()">Save to Brewer</button>
<script>
async function generate() {{
  status.textContent = 'The barista is thinking…';
  const body = {{description: description.value}};
  const key = document.getElementById('api_key');
  if (key && key.value) body.api_key = key.value;
  const r = await fetch('/api/generate', {{
    method: 'POST',
    headers: {{'content-type': 'application/json'}},
    body: JSON.stringify(body)
  }});
  const b = await r.json();
  if (!b.ok) {{ status.textContent = b.error || 'Generation failed.'; return; }}
  status.textContent = 'Profile generated.';
  document.getElementById('explanation').textContent = b.explanation;
  document.getElementById('editor').value = JSON.stringify(b.profile, null, 2);
}}
async function saveProfile() {{
  let profile;
  try {{ profile = JSON.parse(document.getElementById('editor').value); }}
  catch (e) {{ status.textContent = 'Editor does not contain valid JSON: ' + e; return; }}
  const r = await fetch('/api/profiles', {{
    method: 'POST',
    headers: {{'content-type': 'application/json'}},
    body: JSON.stringify({{profile}})
  }});
  const b = await r.json();
  status.textContent = b.ok ? 'Profile saved.' : (b.error || 'Save failed.');
}}
</script>"#,
        key_note
    )
}

const BREWLINKS_BODY: &str = r#"<h1>Brew Links</h1>
<p>Import a profile from a shared brew link.</p>
<p><input id="link" size="50" placeholder="https://fellow.co/p/abc123"></p>
<button onclick="importLink()">Import Profile</button>
<h3>Imported profile</h3>
<textarea id="editor" rows="18"></textarea><br>
<button onclick="saveProfile()">Save to Brewer</button>
<script>
async function importLink() {
  const r = await fetch('/api/brewlinks/import', {
    method: 'POST',
    headers: {'content-type': 'application/json'},
    body: JSON.stringify({link: link.value})
  });
  const b = await r.json();
  if (!b.ok) { status.textContent = b.error || 'Import failed.'; return; }
  status.textContent = 'Profile imported.';
  document.getElementById('editor').value = JSON.stringify(b.profile, null, 2);
}
async function saveProfile() {
  let profile;
  try { profile = JSON.parse(document.getElementById('editor').value); }
  catch (e) { status.textContent = 'Editor does not contain valid JSON: ' + e; return; }
  const r = await fetch('/api/profiles', {
    method: 'POST',
    headers: {'content-type': 'application/json'},
    body: JSON.stringify({profile})
  });
  const b = await r.json();
  status.textContent = b.ok ? 'Profile saved.' : (b.error || 'Save failed.');
}
</script>"#;

fn backups_html(entries: &[barista_store::BackupEntry]) -> String {
    if entries.is_empty() {
        return r#"<h1>Profile Backups</h1>
<p>No profile backups available yet.</p>
<p class="note">Backups are taken automatically when you delete profiles.</p>"#
            .to_string();
    }

    let rows: String = entries
        .iter()
        .enumerate()
        .rev()
        .take(BACKUPS_SHOWN)
        .map(|(i, entry)| {
            let title = entry
                .profile
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or("Unknown");
            format!(
                r#"<tr>
<td>{}</td>
<td class="note">{}</td>
<td><button onclick="restoreBackup({})">Restore</button></td>
</tr>"#,
                escape_html(title),
                entry.backed_up_at.format("%Y-%m-%d %H:%M"),
                i
            )
        })
        .collect();

    format!(
        r#"<h1>Profile Backups</h1>
<p>{} backups available; showing the most recent {}.</p>
<table>
<tr><th>Profile</th><th>Backed up</th><th></th></tr>
{}
</table>
<p class="note">Restoring creates a new profile with server fields stripped and a timestamp suffix on the title.</p>
<script>
async function restoreBackup(i) {{
  const r = await fetch('/api/backups/' + i + '/restore', {{method: 'POST'}});
  const b = await r.json();
  status.textContent = b.ok
    ? ('Restored as "' + b.profile.title + '".')
    : (b.error || 'Restore failed.');
}}
</script>"#,
        entries.len(),
        entries.len().min(BACKUPS_SHOWN),
        rows
    )
}

fn settings_html(sources: &[barista_store::ConfigSource]) -> String {
    let source_list: String = sources
        .iter()
        .map(|s| format!("<li>{}: {}</li>", s.name, s.source))
        .collect();

    format!(
        r#"<h1>Settings</h1>
<h3>Configuration sources</h3>
<ul>{}</ul>
<h3>Environment</h3>
<p class="note">For Docker deployment, set these variables:</p>
<pre>FELLOW_EMAIL=your@email.com
FELLOW_PASSWORD=yourpassword
OPENAI_API_KEY=sk-your-openai-api-key</pre>
<h3>Device configuration</h3>
<button onclick="showConfig()">Show Device Config</button>
<pre id="config"></pre>
<script>
async function showConfig() {{
  const r = await fetch('/api/device-config');
  const b = await r.json();
  document.getElementById('config').textContent = JSON.stringify(b, null, 2);
}}
</script>"#,
        source_list
    )
}
