use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use super::AppState;

/// 健康检查端点
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.service.login_state();
    let login = match session {
        Some(session) if session.authenticated => "authenticated",
        Some(_) => "failed",
        None => "anonymous",
    };

    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "stored_files": state.service.store().len(),
        "login": login,
        "login_at": session.map(|s| s.acquired_at.to_rfc3339()),
    }))
}
