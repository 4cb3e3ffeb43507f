//! Axum route handlers for the compass HTTP server.
//!
//! # Routes
//!
//! - `GET    /health`                              — liveness check
//! - `GET    /catalog`                             — baseline, modules and intents
//! - `GET    /intents?persona=<org_type>`          — intents, optionally persona-filtered
//! - `POST   /compose`                             — stateless composition preview
//! - `POST   /refine`                              — refine free text
//! - `POST   /sessions`                            — open a session
//! - `GET    /sessions/:id`                        — session snapshot
//! - `DELETE /sessions/:id`                        — close a session
//! - `PUT    /sessions/:id/context`                — replace the organization profile
//! - `POST   /sessions/:id/refine-mission`         — refine the stored mission
//! - `POST   /sessions/:id/intents/:intent/toggle` — toggle an intent
//! - `POST   /sessions/:id/chat`                   — route a chat message

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::catalog::{Catalog, StrategicIntent};
use crate::collaborators::{refine_or_none, Refiner};
use crate::composition::{resolve, Composition, SelectionState};
use crate::context::OrgContext;
use crate::routing::ChatMessage;
use crate::session::{Session, SessionError, SessionSnapshot, SessionStore};

type ApiError = (StatusCode, Json<Value>);

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionStore>,
    pub refiner: Arc<dyn Refiner>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionStore>, refiner: Arc<dyn Refiner>) -> Self {
        Self {
            catalog: sessions.catalog().clone(),
            sessions,
            refiner,
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/catalog", get(catalog_handler))
        .route("/intents", get(intents_handler))
        .route("/compose", post(compose_handler))
        .route("/refine", post(refine_handler))
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/:id",
            get(get_session_handler).delete(close_session_handler),
        )
        .route("/sessions/:id/context", put(update_context_handler))
        .route("/sessions/:id/refine-mission", post(refine_mission_handler))
        .route(
            "/sessions/:id/intents/:intent/toggle",
            post(toggle_intent_handler),
        )
        .route("/sessions/:id/chat", post(chat_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

fn session_error(err: SessionError) -> ApiError {
    let status = match err {
        SessionError::EmptyMessage => StatusCode::BAD_REQUEST,
        SessionError::Busy => StatusCode::CONFLICT,
        SessionError::Closed | SessionError::Cancelled => StatusCode::GONE,
    };
    api_error(status, err.to_string())
}

fn find_session(state: &AppState, id: &Uuid) -> Result<Arc<Session>, ApiError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Unknown session '{}'", id)))
}

// ---------------------------------------------------------------------------
// Catalog & composition
// ---------------------------------------------------------------------------

/// GET /health — liveness check.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "compass",
    }))
}

/// GET /catalog — the full reference tables.
async fn catalog_handler(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.catalog.as_ref().clone())
}

#[derive(Debug, Deserialize)]
struct IntentQuery {
    persona: Option<String>,
}

/// GET /intents — all intents, or those aligned with `persona`.
async fn intents_handler(
    State(state): State<AppState>,
    Query(query): Query<IntentQuery>,
) -> Json<Vec<StrategicIntent>> {
    let intents = match query.persona.as_deref().filter(|p| !p.is_empty()) {
        Some(persona) => state.catalog.intents_for(persona).into_iter().cloned().collect(),
        None => state.catalog.intents().to_vec(),
    };
    Json(intents)
}

#[derive(Debug, Deserialize)]
struct ComposeRequest {
    #[serde(default)]
    intents: Vec<String>,
}

/// POST /compose — preview the module set for a selection.
async fn compose_handler(
    State(state): State<AppState>,
    Json(request): Json<ComposeRequest>,
) -> Json<Composition> {
    let selection: SelectionState = request.intents.into_iter().collect();
    Json(resolve(&state.catalog, &selection))
}

#[derive(Debug, Deserialize)]
struct RefineRequest {
    text: String,
    #[serde(default)]
    instruction: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefineResponse {
    refined: Option<String>,
}

/// POST /refine — `refined` is `null` when no refinement is available.
async fn refine_handler(
    State(state): State<AppState>,
    Json(request): Json<RefineRequest>,
) -> Result<Json<RefineResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'text'"));
    }
    let instruction = request
        .instruction
        .unwrap_or_else(|| "Improve clarity and concision.".to_string());
    let refined = refine_or_none(state.refiner.as_ref(), &request.text, &instruction).await;
    Ok(Json(RefineResponse { refined }))
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// POST /sessions — optional `OrgContext` body.
///
/// An absent or blank body opens a session with an empty profile; a body
/// that is present but not a valid profile is a 400.
async fn create_session_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let context = if body.iter().all(u8::is_ascii_whitespace) {
        OrgContext::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Invalid organization profile: {}", e),
            )
        })?
    };
    let session = state.sessions.create(context);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": session.id() })),
    ))
}

/// GET /sessions/:id
async fn get_session_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    Ok(Json(find_session(&state, &id)?.snapshot()))
}

/// DELETE /sessions/:id — closes the session and drops in-flight work.
async fn close_session_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Unknown session '{}'", id)))
}

/// PUT /sessions/:id/context
async fn update_context_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(context): Json<OrgContext>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = find_session(&state, &id)?;
    session.set_context(context);
    Ok(Json(session.snapshot()))
}

/// POST /sessions/:id/refine-mission
async fn refine_mission_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RefineResponse>, ApiError> {
    let session = find_session(&state, &id)?;
    let refined = session.refine_mission(state.refiner.as_ref()).await;
    Ok(Json(RefineResponse { refined }))
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    intent: String,
    selected: bool,
    composition: Composition,
}

/// POST /sessions/:id/intents/:intent/toggle
async fn toggle_intent_handler(
    State(state): State<AppState>,
    Path((id, intent)): Path<(Uuid, String)>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let session = find_session(&state, &id)?;
    let selected = session.toggle_intent(&intent);
    Ok(Json(ToggleResponse {
        intent,
        selected,
        composition: session.composition(),
    }))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

/// POST /sessions/:id/chat — returns the agent message.
async fn chat_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    let session = find_session(&state, &id)?;
    let message = session
        .submit(&request.message)
        .await
        .map_err(session_error)?;
    Ok(Json(message))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
