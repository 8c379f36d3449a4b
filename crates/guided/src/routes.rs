//! API routes for guided.
//!
//! Each route group gets its own Router constructor; server::router merges
//! them. Handlers only call the core's public operations and own the
//! per-session history.

use crate::server::AppState;
use crate::sessions::HistoryEntry;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use guide_core::{
    BudgetLevel, DebugReport, GuideStatus, Recommendation, RecommendationKind,
    RecommendationRequest, Response, SlangTranslation, TranslationDirection,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Chat Routes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub response: Response,
}

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/chat", post(chat))
}

async fn chat(
    State(state): State<AppStateArc>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let session_id = req.session_id.unwrap_or_else(Uuid::new_v4);
    info!("Chat query for session {}", session_id);

    let guide = state.guide.read().await;
    let response = guide.process_query(&req.message, None);
    drop(guide);

    let mut sessions = state.sessions.write().await;
    sessions.append(
        session_id,
        HistoryEntry {
            query: req.message,
            response_text: response.response_text.clone(),
            confidence: response.confidence_score.overall_score,
            timestamp: Local::now(),
        },
    );

    Json(ChatResponse {
        session_id,
        response,
    })
}

// ============================================================================
// Translation Routes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub direction: TranslationDirection,
}

pub fn translate_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/translate", post(translate))
}

async fn translate(
    State(state): State<AppStateArc>,
    Json(req): Json<TranslateRequest>,
) -> Json<SlangTranslation> {
    let guide = state.guide.read().await;
    Json(guide.translate_slang(&req.text, req.direction))
}

// ============================================================================
// Recommendation Routes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub location: Option<String>,
    pub budget: Option<String>,
    pub weather: Option<String>,
    pub crowd: Option<String>,
    pub festival: Option<String>,
}

pub fn recommendation_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/recommendations/:kind", get(recommendations))
}

async fn recommendations(
    State(state): State<AppStateArc>,
    Path(kind): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<Vec<Recommendation>>, (StatusCode, String)> {
    let kind: RecommendationKind = kind
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;

    let budget_level = match params.budget.as_deref() {
        Some(raw) => Some(
            raw.parse::<BudgetLevel>()
                .map_err(|e| (StatusCode::BAD_REQUEST, e))?,
        ),
        None => None,
    };

    let mut request = RecommendationRequest::new(kind, Local::now());
    request.location = params.location;
    request.budget_level = budget_level;
    request.weather_condition = params.weather;
    request.crowd_tolerance = params.crowd;

    let guide = state.guide.read().await;
    let recommendations = match params.festival.as_deref() {
        Some(name) => guide.festival_recommendations(&request, Some(name)),
        None => guide.get_recommendations(&request),
    };
    Ok(Json(recommendations))
}

// ============================================================================
// Debug Routes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DebugRequest {
    pub query: String,
}

pub fn debug_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/debug", post(debug_query))
}

async fn debug_query(
    State(state): State<AppStateArc>,
    Json(req): Json<DebugRequest>,
) -> Json<DebugReport> {
    let guide = state.guide.read().await;
    Json(guide.debug_query_processing(&req.query))
}

// ============================================================================
// Status Routes
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: GuideStatus,
    pub uptime_secs: u64,
    pub active_sessions: usize,
    pub version: String,
}

pub fn status_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/status", get(status))
}

async fn status(State(state): State<AppStateArc>) -> Json<StatusResponse> {
    let guide = state.guide.read().await;
    let sessions = state.sessions.read().await;

    Json(StatusResponse {
        status: guide.status(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: sessions.session_count(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// History Routes
// ============================================================================

pub fn history_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/history/:session_id", get(history))
        .route("/v1/history/:session_id/clear", post(clear_history))
}

async fn history(
    State(state): State<AppStateArc>,
    Path(session_id): Path<Uuid>,
) -> Json<Vec<HistoryEntry>> {
    let sessions = state.sessions.read().await;
    Json(sessions.history(&session_id))
}

async fn clear_history(
    State(state): State<AppStateArc>,
    Path(session_id): Path<Uuid>,
) -> StatusCode {
    let mut sessions = state.sessions.write().await;
    sessions.clear(&session_id);
    StatusCode::NO_CONTENT
}

// ============================================================================
// Reload Routes
// ============================================================================

pub fn reload_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/reload", post(reload))
}

async fn reload(
    State(state): State<AppStateArc>,
) -> Result<Json<GuideStatus>, (StatusCode, String)> {
    let mut guide = state.guide.write().await;
    guide.reload().map_err(|e| {
        error!("Knowledge reload failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    info!("Knowledge base reloaded");
    Ok(Json(guide.status()))
}
