//! compass HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 8080)
//! - `COMPASS_CATALOG` — YAML catalog file (default: builtin catalog)
//! - `LLM_API_KEY`, `LLM_BASE_URL`, `LLM_MODEL`, `LLM_TIMEOUT_SECS` — generation backend
//! - `COMPASS_SESSION_IDLE_SECS`, `COMPASS_SWEEP_SECS` — idle session expiry
//! - `RUST_LOG` — Tracing filter (default: "info,compass=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use compass::catalog::Catalog;
use compass::collaborators::{HttpRefiner, HttpResponder};
use compass::config::Config;
use compass::server::{app_router, AppState};
use compass::{Router, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (also captures `log` records from the library)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,compass=debug".into()),
        )
        .init();

    let config = Config::from_env();

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_yaml_file(path)
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => Catalog::builtin().context("parsing builtin catalog")?,
    };
    let catalog = compass::catalog::init(catalog)?;

    if config.llm.api_key.is_empty() {
        tracing::warn!("LLM_API_KEY not set; chat replies will use the fallback message");
    }
    let responder = HttpResponder::new(config.llm.clone())?;
    let refiner = HttpRefiner::new(config.llm.clone())?;

    let sessions = Arc::new(SessionStore::new(
        catalog.clone(),
        Router::new(Arc::new(responder)),
    ));
    let state = AppState::new(sessions.clone(), Arc::new(refiner));

    let max_idle =
        chrono::Duration::from_std(config.session_idle).context("session idle window")?;
    let sweeper = tokio::spawn({
        let sessions = sessions.clone();
        let period = config.sweep_interval;
        async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                sessions.sweep(max_idle);
            }
        }
    });
    let app = app_router(state);

    let bind_addr = config.bind_addr();
    tracing::info!("compass server starting on {}", bind_addr);
    tracing::info!(
        "Catalog: {} intents, {} modules, baseline {:?}",
        catalog.intents().len(),
        catalog.module_count(),
        catalog.baseline()
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sessions.clone()))
        .await
        .context("server failed")?;

    sweeper.abort();

    tracing::info!("compass server stopped");
    Ok(())
}

/// Wait for Ctrl-C, then close every session so in-flight responder calls
/// are dropped instead of holding graceful shutdown open.
async fn shutdown_signal(sessions: Arc<SessionStore>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested; closing {} session(s)", sessions.len());
    sessions.close_all();
}
