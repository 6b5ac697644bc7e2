//! HTTP surface: health check and the leaderboard endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use leaderboard::{LeaderboardError, LeaderboardStore, ScoreEntry};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LeaderboardStore>,
}

/// Error returned by handlers, rendered as `{"success": false, "error": ...}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<LeaderboardError> for ApiError {
    fn from(e: LeaderboardError) -> Self {
        if e.is_client_error() {
            return ApiError::BadRequest(match e {
                LeaderboardError::InvalidInput(msg) => msg,
                other => other.to_string(),
            });
        }
        error!("Leaderboard submit failed: {}", e);
        ApiError::Internal("Failed to save score".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (
            status,
            Json(serde_json::json!({
                "success": false,
                "error": message,
            })),
        )
            .into_response()
    }
}

/// Build the application router. Static dashboard files are served as the
/// fallback when `static_dir` exists.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/leaderboard", get(api_list_scores).post(api_submit_score))
        .with_state(state);

    let app = Router::new().nest("/api", api_routes);

    let app = match static_dir {
        Some(dir) if dir.exists() => app.fallback_service(ServeDir::new(dir)),
        Some(dir) => {
            warn!("Static directory {} not found, serving API only", dir.display());
            app
        }
        None => app,
    };

    app.layer(cors)
}

/// GET /api/health
async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "leaderboard",
        "version": APP_VERSION,
    }))
}

/// GET /api/leaderboard — entries sorted best first
async fn api_list_scores(State(state): State<AppState>) -> Json<Vec<ScoreEntry>> {
    Json(state.store.list().await)
}

/// POST /api/leaderboard — body `{ "name": string, "score": number }`
async fn api_submit_score(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    state.store.submit_json(&body).await?;
    info!("Score accepted via API");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Score saved",
        })),
    ))
}
