//! Dashboard server.

use std::sync::Arc;

use miette::{IntoDiagnostic, Result};
use tracing::info;

use barista_store::{BackupStore, Config};
use barista_web::{AppState, create_router};

pub async fn run(port: u16, static_dir: Option<&str>) -> Result<()> {
    let state = Arc::new(AppState::new(Config::new(), BackupStore::new()));

    // Connect up front when credentials resolve from the environment or the
    // local files; otherwise the login page handles it.
    state.try_auto_login().await;

    let router = create_router(state, static_dir);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .into_diagnostic()?;
    info!(addr = %addr, "dashboard listening");

    axum::serve(listener, router).await.into_diagnostic()?;
    Ok(())
}
